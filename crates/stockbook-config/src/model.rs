use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{manager::default_base_dir, ConfigError, HOME_ENV};

/// Operator preferences for rendering and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    /// Inventory rows at or below this many units available are flagged.
    #[serde(default = "Config::default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the sheet book. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency_symbol: Self::default_currency_symbol(),
            low_stock_threshold: Self::default_low_stock_threshold(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            backup_retention: Self::default_backup_retention(),
            data_dir: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 6] = [
        "locale",
        "currency_symbol",
        "low_stock_threshold",
        "ui_color_enabled",
        "backup_retention",
        "data_dir",
    ];

    pub fn default_locale() -> String {
        "en-NG".into()
    }

    pub fn default_currency_symbol() -> String {
        "₦".into()
    }

    pub fn default_low_stock_threshold() -> i64 {
        3
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// Directory holding the sheet book: `STOCKBOOK_HOME`, then `data_dir`, then
    /// the platform default.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return PathBuf::from(home);
        }
        if let Some(path) = &self.data_dir {
            return path.clone();
        }
        default_base_dir()
    }

    /// Current value of a setting rendered as text.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency_symbol" => self.currency_symbol.clone(),
            "low_stock_threshold" => self.low_stock_threshold.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "backup_retention" => self.backup_retention.to_string(),
            "data_dir" => self
                .data_dir
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses and applies `value` to the named setting.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "locale" => {
                if value.is_empty() {
                    return Err(invalid("must not be empty"));
                }
                self.locale = value.to_string();
            }
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "low_stock_threshold" => {
                self.low_stock_threshold = value
                    .parse::<i64>()
                    .ok()
                    .filter(|threshold| *threshold >= 0)
                    .ok_or_else(|| invalid("expected a whole number >= 0"))?;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid("expected on or off")),
                };
            }
            "backup_retention" => {
                self.backup_retention = value
                    .parse::<usize>()
                    .ok()
                    .filter(|count| *count >= 1)
                    .ok_or_else(|| invalid("expected a whole number >= 1"))?;
            }
            "data_dir" => {
                self.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"currency_symbol":"$"}"#).unwrap();
        assert_eq!(cfg.currency_symbol, "$");
        assert_eq!(cfg.low_stock_threshold, 3);
        assert_eq!(cfg.backup_retention, 5);
        assert!(cfg.ui_color_enabled);
    }

    #[test]
    fn set_validates_values() {
        let mut cfg = Config::default();
        cfg.set("low_stock_threshold", "10").unwrap();
        assert_eq!(cfg.low_stock_threshold, 10);
        assert!(cfg.set("low_stock_threshold", "-1").is_err());
        assert!(cfg.set("backup_retention", "0").is_err());
        cfg.set("ui_color_enabled", "off").unwrap();
        assert!(!cfg.ui_color_enabled);
        assert!(matches!(
            cfg.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn get_renders_every_key() {
        let cfg = Config::default();
        for key in Config::KEYS {
            assert!(cfg.get(key).is_ok(), "{key} should be readable");
        }
        assert_eq!(cfg.get("currency_symbol").unwrap(), "₦");
    }
}
