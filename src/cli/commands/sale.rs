use stockbook_core::SaleDraft;

use crate::cli::commands::{parse_number, subcommand, usage_error};
use crate::cli::context::ShellContext;
use crate::cli::error::CommandResult;
use crate::cli::output::success;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "sale add <item> <qty> [--date YYYY-MM-DD]\nsale delete <id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "sale",
        "Log or delete sales on the active sheet",
        USAGE,
        cmd_sale,
    )]
}

fn cmd_sale(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "add" | "log" => add_sale(context, rest),
        "delete" | "rm" => {
            let [id] = rest else {
                return Err(usage_error("sale delete <id>"));
            };
            context.manager.delete_sale(id)?;
            success("Sale deleted and stock rolled back.");
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}

fn add_sale(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "sale add <item> <qty> [--date YYYY-MM-DD]";
    let (item, qty, date) = match args {
        [item, qty] => (item, qty, None),
        [item, qty, "--date", date] => (item, qty, Some(date.to_string())),
        _ => return Err(usage_error(usage)),
    };
    let draft = SaleDraft {
        date,
        item_name: item.to_string(),
        qty_sold: parse_number(qty),
    };
    let sale = context.manager.add_sale(draft)?;
    success(format!(
        "Sale logged for {} x {}.",
        sale.qty_sold, sale.item_name
    ));
    Ok(())
}
