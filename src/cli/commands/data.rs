use std::path::Path;

use chrono::Local;

use stockbook_core::storage::BackupInfo;

use crate::cli::commands::{subcommand, usage_error};
use crate::cli::context::ShellContext;
use crate::cli::error::{CommandError, CommandResult};
use crate::cli::output::{info, plain, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const BACKUP_USAGE: &str = "backup create [note]\nbackup list\nbackup restore <number|id>\nbackup delete <number|id>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "export",
            "Write the whole sheet book to a JSON file",
            "export <path>",
            cmd_export,
        ),
        CommandEntry::new(
            "import",
            "Replace the sheet book with one read from a JSON file",
            "import <path>",
            cmd_import,
        ),
        CommandEntry::new(
            "backup",
            "Create, list, restore or delete backups of the sheet book",
            BACKUP_USAGE,
            cmd_backup,
        ),
    ]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage_error("export <path>"));
    };
    context.manager.export(Path::new(path))?;
    success(format!("Exported sheet book to {path}."));
    Ok(())
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(usage_error("import <path>"));
    };
    let loaded = context.manager.import(Path::new(path))?;
    for note in &loaded.warnings {
        warning(note);
    }
    success(format!(
        "Imported {} sheet(s) from {path}.",
        context.manager.book().sheets.len()
    ));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, BACKUP_USAGE)?;
    match action.as_str() {
        "create" | "new" => {
            let note = rest.join(" ");
            let note = Some(note.as_str()).filter(|text| !text.trim().is_empty());
            let backup = context.manager.backup(note)?;
            success(format!("Backup `{}` created.", backup.id));
            Ok(())
        }
        "list" | "ls" => list_backups(context),
        "restore" => {
            let [key] = rest else {
                return Err(usage_error("backup restore <number|id>"));
            };
            let backups = context.manager.list_backups()?;
            let backup = find_backup(&backups, key)?;
            let loaded = context.manager.restore_backup(backup)?;
            for note in &loaded.warnings {
                warning(note);
            }
            success(format!("Restored backup `{}`.", backup.id));
            Ok(())
        }
        "delete" | "rm" => {
            let [key] = rest else {
                return Err(usage_error("backup delete <number|id>"));
            };
            let backups = context.manager.list_backups()?;
            let backup = find_backup(&backups, key)?;
            context.manager.delete_backup(backup)?;
            success(format!("Deleted backup `{}`.", backup.id));
            Ok(())
        }
        _ => Err(usage_error(BACKUP_USAGE)),
    }
}

fn list_backups(context: &ShellContext) -> CommandResult {
    let backups = context.manager.list_backups()?;
    section("Backups");
    if backups.is_empty() {
        info("No backups yet. Create one with `backup create`.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Created"),
        TableColumn::left("Note"),
        TableColumn::left("Id"),
    ]);
    for (idx, backup) in backups.iter().enumerate() {
        let created = backup
            .created_at
            .map(|at| at.with_timezone(&Local).format("%d %b %Y %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        table.push_row(vec![
            (idx + 1).to_string(),
            created,
            backup.note.clone().unwrap_or_default(),
            backup.id.clone(),
        ]);
    }
    plain(table.render());
    Ok(())
}

/// Resolves a 1-based list position or a backup id.
fn find_backup<'a>(backups: &'a [BackupInfo], key: &str) -> Result<&'a BackupInfo, CommandError> {
    if let Ok(position) = key.parse::<usize>() {
        if let Some(backup) = position.checked_sub(1).and_then(|idx| backups.get(idx)) {
            return Ok(backup);
        }
    }
    backups
        .iter()
        .find(|backup| backup.id == key)
        .ok_or_else(|| CommandError::InvalidArguments(format!("no backup matches `{key}`")))
}
