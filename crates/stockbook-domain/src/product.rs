//! Product definitions tracked on a stock sheet.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// A sellable item definition. The name is the product's identity within a sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub unit_cost: f64,
    pub unit_price: f64,
    pub opening_stock: i64,
    #[serde(default)]
    pub stock_out: i64,
}

impl Product {
    pub fn new(name: impl Into<String>, unit_cost: f64, unit_price: f64, opening_stock: i64) -> Self {
        Self {
            name: name.into(),
            unit_cost,
            unit_price,
            opening_stock,
            stock_out: 0,
        }
    }

    /// Opening stock minus cumulative stock-out.
    pub fn stock_available(&self) -> i64 {
        self.opening_stock.saturating_sub(self.stock_out)
    }

    /// Value of the remaining stock at cost.
    pub fn stock_value_cost(&self) -> f64 {
        self.stock_available() as f64 * self.unit_cost
    }

    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name_key() == normalize_name(candidate)
    }
}

impl NamedEntity for Product {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_stock_fields_follow_formulas() {
        let mut product = Product::new("Bread", 100.0, 150.0, 20);
        product.stock_out = 5;
        assert_eq!(product.stock_available(), 15);
        assert_eq!(product.stock_value_cost(), 1500.0);
    }

    #[test]
    fn name_matching_is_case_insensitive() {
        let product = Product::new("Meat Pie", 300.0, 450.0, 10);
        assert!(product.matches_name("  meat pie"));
        assert!(!product.matches_name("meat pies"));
    }

    #[test]
    fn deserializes_camel_case_document() {
        let json = r#"{"name":"Bread","unitCost":100,"unitPrice":150,"openingStock":20,"stockOut":3}"#;
        let product: Product = serde_json::from_str(json).expect("product json");
        assert_eq!(product.unit_cost, 100.0);
        assert_eq!(product.stock_out, 3);
    }
}
