pub mod config;
pub mod data;
pub mod product;
pub mod report;
pub mod sale;
pub mod sheet;
pub mod system;

use crate::cli::error::CommandError;
use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(sheet::definitions())
        .chain(product::definitions())
        .chain(sale::definitions())
        .chain(report::definitions())
        .chain(data::definitions())
        .chain(config::definitions())
    {
        registry.register(entry);
    }
}

/// Splits `args` into a lowercase subcommand and the rest.
pub(crate) fn subcommand<'a>(
    args: &'a [&'a str],
    usage: &str,
) -> Result<(String, &'a [&'a str]), CommandError> {
    match args.split_first() {
        Some((first, rest)) => Ok((first.to_lowercase(), rest)),
        None => Err(usage_error(usage)),
    }
}

pub(crate) fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

/// Parses a numeric argument. Unparsable text becomes NaN so the ledger
/// services reject it with their own message.
pub(crate) fn parse_number(raw: &str) -> f64 {
    raw.trim().replace(',', "").parse::<f64>().unwrap_or(f64::NAN)
}

/// First eight characters of an id, enough to address it in the shell.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_tolerate_grouping_and_reject_text() {
        assert_eq!(parse_number("1,250.50"), 1250.5);
        assert!(parse_number("twelve").is_nan());
    }

    #[test]
    fn every_command_is_registered_once() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        let names: Vec<_> = registry.names().collect();
        for expected in [
            "help", "version", "exit", "sheet", "product", "sale", "dashboard", "inventory",
            "sales", "check", "export", "import", "backup", "config",
        ] {
            assert!(names.contains(&expected), "missing `{expected}`");
        }
        assert_eq!(names.len(), 14);
    }
}
