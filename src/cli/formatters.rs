use chrono::NaiveDate;
use colored::Colorize;

use stockbook_core::{CurrencyFormatter, DateFormatter};
use stockbook_domain::round_currency;

/// Renders money as `-₦1,234.50`: sign, symbol, grouped digits, two decimals.
#[derive(Debug, Clone)]
pub struct SymbolCurrencyFormatter {
    symbol: String,
}

impl SymbolCurrencyFormatter {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

impl CurrencyFormatter for SymbolCurrencyFormatter {
    fn format_amount(&self, amount: f64) -> String {
        let rounded = round_currency(amount);
        let sign = if rounded < 0.0 { "-" } else { "" };
        let body = format!("{:.2}", rounded.abs());
        let (int_part, fraction) = body.split_once('.').unwrap_or((body.as_str(), "00"));
        format!("{sign}{}{}.{fraction}", self.symbol, group_digits(int_part))
    }
}

/// `05 Jan 2024`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediumDateFormatter;

impl DateFormatter for MediumDateFormatter {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format("%d %b %Y").to_string()
    }
}

pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_digits(&digits))
}

/// Green for a profit, red for a loss, plain at zero.
pub fn color_by_sign(amount: f64, text: String) -> String {
    if amount > 0.0 {
        text.green().to_string()
    } else if amount < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().enumerate() {
        if count != 0 && (digits.len() - count) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
