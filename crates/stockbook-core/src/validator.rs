//! Invariant checks driven by the aggregator's passes.
//!
//! The validator never rejects anything. It records violations in discovery order
//! (sales pass, products pass, cross-reference pass, totals) so operators can see
//! drift in stored data without the engine refusing to compute.

use std::collections::HashMap;

use stockbook_domain::{normalize_name, ProductRow, Sale, Totals, Validation, Violation};

#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
    first_rows: HashMap<String, usize>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a sale's own fields. `row` is 1-based.
    pub fn check_sale(&mut self, row: usize, sale: &Sale) {
        if sale.item_name.trim().is_empty() {
            self.violations.push(Violation::SaleMissingItemName { row });
        }
        if sale.qty_sold < 1 {
            self.violations.push(Violation::SaleInvalidQuantity { row });
        }
        let amounts_finite = sale.revenue.is_finite()
            && sale.production_cost.is_finite()
            && sale.gross_profit.is_finite();
        if !amounts_finite || sale.revenue < 0.0 || sale.production_cost < 0.0 {
            self.violations.push(Violation::SaleInvalidAmounts { row });
        }
    }

    /// Checks a derived product row against the quantity sold under its name.
    ///
    /// The first product seen under a name owns it; later collisions are flagged
    /// and do not take part in sale cross-referencing.
    pub fn check_product(&mut self, row: usize, product: &ProductRow, sold: i64) {
        let key = normalize_name(&product.name);
        if key.is_empty() {
            self.violations.push(Violation::ProductMissingName { row });
        } else if let Some(first_row) = self.first_rows.get(&key) {
            self.violations.push(Violation::DuplicateProductName {
                row,
                name: product.name.clone(),
                first_row: *first_row,
            });
        } else {
            self.first_rows.insert(key, row);
        }

        let name = || product.name.clone();
        if !product.unit_cost.is_finite() || product.unit_cost < 0.0 {
            self.violations
                .push(Violation::InvalidUnitCost { row, name: name() });
        }
        if !product.unit_price.is_finite() || product.unit_price < 0.0 {
            self.violations
                .push(Violation::InvalidUnitPrice { row, name: name() });
        }
        if product.opening_stock < 0 {
            self.violations
                .push(Violation::InvalidOpeningStock { row, name: name() });
        }
        if product.stock_out < 0 {
            self.violations
                .push(Violation::InvalidStockOut { row, name: name() });
        }
        if product.stock_available < 0 {
            self.violations
                .push(Violation::NegativeStockAvailable { row, name: name() });
        }
        if product.stock_out < sold {
            self.violations.push(Violation::StockOutBelowSales {
                row,
                name: name(),
                stock_out: product.stock_out,
                sold,
            });
        }
    }

    /// Flags a sale whose item name matches no product seen by `check_product`.
    pub fn check_sale_reference(&mut self, row: usize, sale: &Sale) {
        if !self.first_rows.contains_key(&normalize_name(&sale.item_name)) {
            self.violations.push(Violation::OrphanedSale {
                row,
                item_name: sale.item_name.clone(),
            });
        }
    }

    pub fn check_totals(&mut self, totals: &Totals) {
        for (kind, value) in totals.entries() {
            if !value.is_finite() {
                self.violations.push(Violation::NonFiniteTotal { kind });
            }
        }
    }

    pub fn finish(self) -> Validation {
        Validation::from_violations(self.violations)
    }
}
