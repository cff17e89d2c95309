use stockbook_config::Config;

use crate::cli::commands::{subcommand, usage_error};
use crate::cli::context::ShellContext;
use crate::cli::error::CommandResult;
use crate::cli::output::{self, info, plain, section, success};
use crate::cli::registry::CommandEntry;

const USAGE: &str = "config show\nconfig set <key> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = subcommand(args, USAGE)?;
    match action.as_str() {
        "show" => {
            section("Configuration");
            for key in Config::KEYS {
                plain(format!("  {key:<20} {}", context.config.get(key)?));
            }
            info(format!(
                "Config file: {}",
                context.config_manager.config_path().display()
            ));
            info(format!("Sheet book: {}", context.manager.book_path().display()));
            Ok(())
        }
        "set" => {
            let [key, value @ ..] = rest else {
                return Err(usage_error("config set <key> <value>"));
            };
            let key = key.to_lowercase();
            let mut updated = context.config.clone();
            updated.set(&key, &value.join(" "))?;
            context.config_manager.save(&updated)?;
            context.config = updated;

            if key == "ui_color_enabled" {
                output::set_color_enabled(context.config.ui_color_enabled);
            }
            success(format!("Set {key} = {}.", context.config.get(&key)?));
            if matches!(key.as_str(), "data_dir" | "backup_retention") {
                info("Restart the shell to apply storage changes.");
            }
            Ok(())
        }
        _ => Err(usage_error(USAGE)),
    }
}
