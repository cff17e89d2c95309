use stockbook_core::{ProductDraft, ProductEdit};

use crate::cli::commands::{parse_number, subcommand, usage_error};
use crate::cli::context::ShellContext;
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::output::success;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "product add <name> <unit_cost> <unit_price> <opening_stock>\n\
product edit <name> <name|cost|price|stock> <value>\n\
product delete <name>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "product",
        "Add, edit or delete products on the active sheet",
        USAGE,
        cmd_product,
    )]
}

fn cmd_product(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "add" => add_product(context, rest),
        "edit" => edit_product(context, rest),
        "delete" | "rm" => {
            let [name] = rest else {
                return Err(usage_error("product delete <name>"));
            };
            let removed = context.manager.delete_product(name)?;
            success(format!("Product \"{}\" deleted.", removed.name));
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}

fn add_product(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, cost, price, stock] = args else {
        return Err(usage_error(
            "product add <name> <unit_cost> <unit_price> <opening_stock>",
        ));
    };
    let draft = ProductDraft {
        name: name.to_string(),
        unit_cost: parse_number(cost),
        unit_price: parse_number(price),
        opening_stock: parse_number(stock),
    };
    context.manager.add_product(draft)?;
    success(format!("Product \"{}\" added.", name.trim()));
    Ok(())
}

fn edit_product(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, field, value] = args else {
        return Err(usage_error(
            "product edit <name> <name|cost|price|stock> <value>",
        ));
    };
    let edit = match field.to_lowercase().as_str() {
        "name" => ProductEdit::Name(value.to_string()),
        "cost" | "unit_cost" => ProductEdit::UnitCost(parse_number(value)),
        "price" | "unit_price" => ProductEdit::UnitPrice(parse_number(value)),
        "stock" | "opening_stock" => ProductEdit::OpeningStock(parse_number(value)),
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown product field `{other}` (use name, cost, price or stock)"
            )))
        }
    };
    let renamed = matches!(edit, ProductEdit::Name(_));
    let previous = context
        .manager
        .active_sheet()?
        .product(name)
        .map(|product| product.name.clone())
        .unwrap_or_else(|| name.trim().to_string());

    context.manager.edit_product(name, edit)?;
    if renamed {
        success(format!("Renamed \"{previous}\" to \"{}\".", value.trim()));
    } else {
        success(format!("Product \"{previous}\" updated."));
    }
    Ok(())
}
