//! Shell state and command dispatch.

use std::path::PathBuf;

use strsim::levenshtein;

use stockbook_config::{default_base_dir, Config, ConfigManager};
use stockbook_storage_json::JsonBookStorage;

use super::commands;
use super::error::{CliError, CommandError};
use super::formatters::{MediumDateFormatter, SymbolCurrencyFormatter};
use super::output;
use super::registry::CommandRegistry;
use crate::{BookManager, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: BookManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, default_base_dir())
    }

    /// Builds a shell whose configuration lives under `base`.
    pub fn with_base_dir(mode: CliMode, base: PathBuf) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        output::set_color_enabled(config.ui_color_enabled);

        let storage =
            JsonBookStorage::with_retention(config.resolve_data_dir(), config.backup_retention)?;
        let mut manager = BookManager::new(Box::new(storage), Box::new(SystemClock));
        let loaded = manager.load()?;
        for warning in &loaded.warnings {
            output::warning(warning);
        }
        tracing::debug!(path = %loaded.path.display(), ?mode, "shell ready");

        Ok(ShellContext {
            mode,
            registry,
            manager,
            config_manager,
            config,
            last_command: None,
            running: true,
        })
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn currency(&self) -> SymbolCurrencyFormatter {
        SymbolCurrencyFormatter::new(self.config.currency_symbol.clone())
    }

    pub fn dates(&self) -> MediumDateFormatter {
        MediumDateFormatter
    }

    pub fn prompt(&self) -> String {
        match self.manager.active_sheet() {
            Ok(sheet) => format!("stockbook [{}]> ", sheet.name),
            Err(_) => "stockbook> ".to_string(),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    /// Parses and runs one input line.
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match shell_words::split(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };

        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            other => output::error(other),
        }
    }
}

#[cfg(test)]
pub(crate) fn script_context(base: &std::path::Path) -> ShellContext {
    let config_manager = ConfigManager::with_base_dir(base.to_path_buf()).unwrap();
    let config = Config {
        data_dir: Some(base.join("data")),
        ui_color_enabled: false,
        ..Config::default()
    };
    config_manager.save(&config).unwrap();
    ShellContext::with_base_dir(CliMode::Script, base.to_path_buf()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run(context: &mut ShellContext, lines: &[&str]) {
        for line in lines {
            if let Err(err) = context.process_line(line) {
                context.report_error(err);
            }
        }
    }

    #[test]
    fn commands_mutate_the_active_sheet() {
        let temp = tempdir().unwrap();
        let mut context = script_context(temp.path());
        run(
            &mut context,
            &[
                "product add Bread 100 150 20",
                "sale add Bread 5 --date 2024-01-09",
            ],
        );

        let ledger = context.manager.active_ledger().unwrap();
        assert_eq!(ledger.products[0].stock_available, 15);
        assert_eq!(ledger.totals.total_revenue, 750.0);
    }

    #[test]
    fn rejected_command_leaves_state_alone() {
        let temp = tempdir().unwrap();
        let mut context = script_context(temp.path());
        run(&mut context, &["product add Bread 100 150 2"]);
        let before = context.manager.book().clone();

        let err = context.process_line("sale add Bread 3").unwrap_err();
        assert!(err.to_string().contains("has only 2 in stock"));
        assert_eq!(context.manager.book(), &before);
    }

    #[test]
    fn exit_stops_the_loop() {
        let temp = tempdir().unwrap();
        let mut context = script_context(temp.path());
        assert_eq!(context.process_line("exit").unwrap(), LoopControl::Exit);
        assert!(!context.running);
    }

    #[test]
    fn unknown_commands_continue() {
        let temp = tempdir().unwrap();
        let mut context = script_context(temp.path());
        assert_eq!(
            context.process_line("inventroy").unwrap(),
            LoopControl::Continue
        );
        assert_eq!(context.process_line("   ").unwrap(), LoopControl::Continue);
    }

    #[test]
    fn prompt_names_the_active_sheet() {
        let temp = tempdir().unwrap();
        let mut context = script_context(temp.path());
        assert_eq!(context.prompt(), "stockbook [Main Stock Sheet]> ");
        run(&mut context, &["sheet new \"Weekend Run\""]);
        assert_eq!(context.prompt(), "stockbook [Weekend Run]> ");
    }
}
