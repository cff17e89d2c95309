pub mod commands;
pub mod context;
pub mod error;
pub mod formatters;
pub mod help;
pub mod output;
pub mod registry;
mod shell;
pub mod table;

pub use context::{CliMode, ShellContext};
pub use error::{CliError, CommandError, CommandResult};
pub use shell::{run_cli, SCRIPT_ENV};
