use chrono::Local;

use crate::cli::commands::{short_id, subcommand, usage_error};
use crate::cli::context::ShellContext;
use crate::cli::error::CommandResult;
use crate::cli::output::{info, plain, section, success};
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use stockbook_core::DateFormatter;

const USAGE: &str = "sheet list\nsheet new [name]\nsheet rename <name>\nsheet delete\nsheet use <name|id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "sheet",
        "List, create, rename, delete or switch stock sheets",
        USAGE,
        cmd_sheet,
    )]
}

fn cmd_sheet(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "list" | "ls" => list_sheets(context),
        "new" | "create" => {
            let name = rest.join(" ");
            let id = context.manager.create_sheet(&name)?;
            let created = context
                .manager
                .book()
                .sheet(&id)
                .map(|sheet| sheet.name.clone())
                .unwrap_or_default();
            success(format!("Created \"{created}\"."));
            Ok(())
        }
        "rename" => {
            context.manager.rename_active_sheet(&rest.join(" "))?;
            success("Stock sheet renamed.");
            Ok(())
        }
        "delete" | "rm" => {
            let removed = context.manager.delete_active_sheet()?;
            success(format!("Deleted \"{}\".", removed.name));
            let active = context.manager.active_sheet()?;
            info(format!("Active sheet is now \"{}\".", active.name));
            Ok(())
        }
        "use" | "switch" => {
            if rest.is_empty() {
                return Err(usage_error("sheet use <name|id>"));
            }
            context.manager.switch_sheet(&rest.join(" "))?;
            let active = context.manager.active_sheet()?;
            success(format!("Switched to \"{}\".", active.name));
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}

fn list_sheets(context: &ShellContext) -> CommandResult {
    let dates = context.dates();
    let active_id = context.manager.book().active_sheet_id.clone();
    let mut table = Table::new(vec![
        TableColumn::left(""),
        TableColumn::left("Sheet"),
        TableColumn::right("Products"),
        TableColumn::right("Sales"),
        TableColumn::left("Created"),
        TableColumn::left("Updated"),
        TableColumn::left("Id"),
    ]);
    for sheet in context.manager.recent_sheets() {
        let marker = if sheet.id == active_id { "*" } else { "" };
        let updated = sheet.updated_at.with_timezone(&Local);
        table.push_row(vec![
            marker.to_string(),
            sheet.name.clone(),
            sheet.products.len().to_string(),
            sheet.sales.len().to_string(),
            dates.format_date(sheet.created_at.with_timezone(&Local).date_naive()),
            format!(
                "{} {}",
                dates.format_date(updated.date_naive()),
                updated.format("%H:%M")
            ),
            short_id(&sheet.id).to_string(),
        ]);
    }
    section("Stock sheets");
    plain(table.render());
    Ok(())
}
