//! Shared traits and value helpers for stock sheet primitives.

use uuid::Uuid;

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;

    /// Comparison key used for case-insensitive name matching.
    fn name_key(&self) -> String {
        normalize_name(self.name())
    }
}

/// Returns the comparison key for a product or item name: trimmed and lower-cased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Rounds a monetary amount to two decimals.
///
/// A machine-epsilon bias is added first so values such as `1.005`, whose binary
/// representation sits just below the midpoint, still round up. Ties round away
/// from zero.
pub fn round_currency(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}

/// Generates a new opaque identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
