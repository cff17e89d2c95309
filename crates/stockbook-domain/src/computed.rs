//! View-model types produced by the ledger engine. None of these are persisted.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::{common::*, product::Product, sale::Sale, sheet::Sheet};

/// Sentinel emitted by the reconciliation checker when nothing else was reported.
pub const ALL_CLEAR_MESSAGE: &str = "All totals and invariants are valid.";

/// A product with its derived stock fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub name: String,
    pub unit_cost: f64,
    pub unit_price: f64,
    pub opening_stock: i64,
    pub stock_out: i64,
    pub stock_available: i64,
    pub stock_value_cost: f64,
}

impl ProductRow {
    pub fn derive(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            unit_cost: product.unit_cost,
            unit_price: product.unit_price,
            opening_stock: product.opening_stock,
            stock_out: product.stock_out,
            stock_available: product.stock_available(),
            stock_value_cost: product.stock_value_cost(),
        }
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock_available <= threshold
    }
}

impl NamedEntity for ProductRow {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Identifies one of the six aggregate totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalKind {
    ItemsAvailable,
    ItemsSold,
    Revenue,
    ProductionCost,
    GrossProfit,
    StockValueCost,
}

impl TotalKind {
    pub const ALL: [TotalKind; 6] = [
        TotalKind::ItemsAvailable,
        TotalKind::ItemsSold,
        TotalKind::Revenue,
        TotalKind::ProductionCost,
        TotalKind::GrossProfit,
        TotalKind::StockValueCost,
    ];

    /// Key used in the serialized view model and in diagnostic messages.
    pub fn key(self) -> &'static str {
        match self {
            TotalKind::ItemsAvailable => "totalItemsAvailable",
            TotalKind::ItemsSold => "totalItemsSold",
            TotalKind::Revenue => "totalRevenue",
            TotalKind::ProductionCost => "totalProductionCost",
            TotalKind::GrossProfit => "grossProfitTotal",
            TotalKind::StockValueCost => "totalStockValueCost",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TotalKind::ItemsAvailable => "Items Available",
            TotalKind::ItemsSold => "Items Sold",
            TotalKind::Revenue => "Total Revenue",
            TotalKind::ProductionCost => "Production Cost",
            TotalKind::GrossProfit => "Gross Profit",
            TotalKind::StockValueCost => "Stock Value (Cost)",
        }
    }

    pub fn is_currency(self) -> bool {
        !matches!(self, TotalKind::ItemsAvailable | TotalKind::ItemsSold)
    }
}

impl fmt::Display for TotalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Aggregate figures for a sheet.
pub struct Totals {
    pub total_items_available: i64,
    pub total_items_sold: i64,
    pub total_revenue: f64,
    pub total_production_cost: f64,
    pub gross_profit_total: f64,
    pub total_stock_value_cost: f64,
}

impl Totals {
    pub fn get(&self, kind: TotalKind) -> f64 {
        match kind {
            TotalKind::ItemsAvailable => self.total_items_available as f64,
            TotalKind::ItemsSold => self.total_items_sold as f64,
            TotalKind::Revenue => self.total_revenue,
            TotalKind::ProductionCost => self.total_production_cost,
            TotalKind::GrossProfit => self.gross_profit_total,
            TotalKind::StockValueCost => self.total_stock_value_cost,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (TotalKind, f64)> + '_ {
        TotalKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// A detected invariant breach. Rows are 1-based positions in the source arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    SaleMissingItemName { row: usize },
    SaleInvalidQuantity { row: usize },
    SaleInvalidAmounts { row: usize },
    ProductMissingName { row: usize },
    DuplicateProductName { row: usize, name: String, first_row: usize },
    InvalidUnitCost { row: usize, name: String },
    InvalidUnitPrice { row: usize, name: String },
    InvalidOpeningStock { row: usize, name: String },
    InvalidStockOut { row: usize, name: String },
    NegativeStockAvailable { row: usize, name: String },
    StockOutBelowSales { row: usize, name: String, stock_out: i64, sold: i64 },
    OrphanedSale { row: usize, item_name: String },
    NonFiniteTotal { kind: TotalKind },
}

struct ProductLabel<'a> {
    row: usize,
    name: &'a str,
}

impl fmt::Display for ProductLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "Product #{}", self.row)
        } else {
            write!(f, "Product #{} \"{}\"", self.row, self.name)
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SaleMissingItemName { row } => {
                write!(f, "Sale #{row}: item name is required.")
            }
            Violation::SaleInvalidQuantity { row } => {
                write!(f, "Sale #{row}: qty sold must be an integer >= 1.")
            }
            Violation::SaleInvalidAmounts { row } => write!(
                f,
                "Sale #{row}: monetary values must be valid non-negative numbers."
            ),
            Violation::ProductMissingName { row } => {
                write!(f, "Product #{row}: name is required.")
            }
            Violation::DuplicateProductName {
                row,
                name,
                first_row,
            } => write!(
                f,
                "Product #{row}: duplicate product name \"{name}\" (first used by product #{first_row})."
            ),
            Violation::InvalidUnitCost { row, name } => write!(
                f,
                "{}: unit cost must be >= 0.",
                ProductLabel { row: *row, name }
            ),
            Violation::InvalidUnitPrice { row, name } => write!(
                f,
                "{}: unit price must be >= 0.",
                ProductLabel { row: *row, name }
            ),
            Violation::InvalidOpeningStock { row, name } => write!(
                f,
                "{}: opening stock must be an integer >= 0.",
                ProductLabel { row: *row, name }
            ),
            Violation::InvalidStockOut { row, name } => write!(
                f,
                "{}: stock out must be an integer >= 0.",
                ProductLabel { row: *row, name }
            ),
            Violation::NegativeStockAvailable { row, name } => write!(
                f,
                "{}: stock available cannot be negative.",
                ProductLabel { row: *row, name }
            ),
            Violation::StockOutBelowSales {
                row,
                name,
                stock_out,
                sold,
            } => write!(
                f,
                "{}: stock out ({stock_out}) is lower than logged sales ({sold}).",
                ProductLabel { row: *row, name }
            ),
            Violation::OrphanedSale { row, item_name } => write!(
                f,
                "Sale #{row}: \"{item_name}\" does not match any product."
            ),
            Violation::NonFiniteTotal { kind } => {
                write!(f, "Total \"{kind}\" is invalid (NaN or infinite).")
            }
        }
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of the validator: valid iff no violations were collected.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl Validation {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            violations,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Pure projection of a sheet: derived rows, totals and validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedLedger<'a> {
    pub sheet: &'a Sheet,
    pub products: Vec<ProductRow>,
    pub sales: Vec<Sale>,
    pub totals: Totals,
    pub validation: Validation,
}

impl ComputedLedger<'_> {
    /// First derived product row whose name matches `name` case-insensitively.
    pub fn product(&self, name: &str) -> Option<&ProductRow> {
        let key = normalize_name(name);
        self.products.iter().find(|row| row.name_key() == key)
    }

    /// Sales ordered newest first for display. Ties keep insertion order.
    pub fn sales_by_date_desc(&self) -> Vec<&Sale> {
        let mut sales: Vec<&Sale> = self.sales.iter().collect();
        sales.sort_by(|a, b| b.date.cmp(&a.date));
        sales
    }
}

/// Pass/fail diagnostics from the reconciliation checker.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub passed: bool,
    pub messages: Vec<String>,
}

impl ReconciliationReport {
    /// Passes only when the sole message is the all-clear sentinel.
    pub fn from_messages(mut messages: Vec<String>) -> Self {
        if messages.is_empty() {
            messages.push(ALL_CLEAR_MESSAGE.to_string());
        }
        let passed = messages.len() == 1 && messages[0] == ALL_CLEAR_MESSAGE;
        Self { passed, messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_messages_carry_row_context() {
        let named = Violation::InvalidUnitCost {
            row: 2,
            name: "Bread".into(),
        };
        assert_eq!(named.to_string(), "Product #2 \"Bread\": unit cost must be >= 0.");

        let unnamed = Violation::NegativeStockAvailable {
            row: 4,
            name: String::new(),
        };
        assert_eq!(
            unnamed.to_string(),
            "Product #4: stock available cannot be negative."
        );
    }

    #[test]
    fn validation_serializes_messages() {
        let validation = Validation::from_violations(vec![Violation::OrphanedSale {
            row: 1,
            item_name: "Croissant".into(),
        }]);
        assert!(!validation.is_valid);
        let json = serde_json::to_value(&validation).expect("validation json");
        assert_eq!(json["isValid"], false);
        assert_eq!(
            json["violations"][0],
            "Sale #1: \"Croissant\" does not match any product."
        );
    }

    #[test]
    fn report_passes_only_on_lone_sentinel() {
        assert!(ReconciliationReport::from_messages(Vec::new()).passed);
        let noisy = ReconciliationReport::from_messages(vec![
            ALL_CLEAR_MESSAGE.to_string(),
            "note".to_string(),
        ]);
        assert!(!noisy.passed);
    }

    #[test]
    fn totals_entries_follow_declared_order() {
        let totals = Totals {
            total_items_available: 20,
            total_stock_value_cost: 2000.0,
            ..Totals::default()
        };
        let keys: Vec<_> = totals.entries().map(|(kind, _)| kind.key()).collect();
        assert_eq!(keys[0], "totalItemsAvailable");
        assert_eq!(totals.get(TotalKind::StockValueCost), 2000.0);
    }
}
