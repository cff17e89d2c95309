//! Builds the computed ledger for a sheet.

use std::collections::HashMap;

use stockbook_domain::{normalize_name, round_currency, ComputedLedger, ProductRow, Sheet, Totals};

use crate::validator::Validator;

/// Joins products and sales into derived rows, totals and validation results.
///
/// The sheet is never mutated. Sums run left to right in insertion order; money
/// totals are rounded once at the end and integer totals saturate at the `i64`
/// bounds.
pub fn compute_ledger(sheet: &Sheet) -> ComputedLedger<'_> {
    let sold = sold_by_name(sheet);
    let mut validator = Validator::new();
    let mut totals = Totals::default();

    let mut sales = Vec::with_capacity(sheet.sales.len());
    for (index, sale) in sheet.sales.iter().enumerate() {
        validator.check_sale(index + 1, sale);
        totals.total_items_sold = totals.total_items_sold.saturating_add(sale.qty_sold);
        totals.total_revenue += sale.revenue;
        totals.total_production_cost += sale.production_cost;
        totals.gross_profit_total += sale.gross_profit;
        sales.push(sale.clone());
    }

    let mut products = Vec::with_capacity(sheet.products.len());
    for (index, product) in sheet.products.iter().enumerate() {
        let row = ProductRow::derive(product);
        let sold_qty = sold.get(&normalize_name(&row.name)).copied().unwrap_or(0);
        validator.check_product(index + 1, &row, sold_qty);
        totals.total_items_available = totals
            .total_items_available
            .saturating_add(row.stock_available);
        totals.total_stock_value_cost += row.stock_value_cost;
        products.push(row);
    }

    for (index, sale) in sheet.sales.iter().enumerate() {
        validator.check_sale_reference(index + 1, sale);
    }

    totals.total_revenue = round_currency(totals.total_revenue);
    totals.total_production_cost = round_currency(totals.total_production_cost);
    totals.gross_profit_total = round_currency(totals.gross_profit_total);
    totals.total_stock_value_cost = round_currency(totals.total_stock_value_cost);
    validator.check_totals(&totals);

    let validation = validator.finish();
    tracing::debug!(
        sheet = %sheet.id,
        products = products.len(),
        sales = sales.len(),
        violations = validation.violations.len(),
        "computed ledger"
    );

    ComputedLedger {
        sheet,
        products,
        sales,
        totals,
        validation,
    }
}

fn sold_by_name(sheet: &Sheet) -> HashMap<String, i64> {
    let mut sold: HashMap<String, i64> = HashMap::new();
    for sale in &sheet.sales {
        let key = normalize_name(&sale.item_name);
        if key.is_empty() {
            continue;
        }
        let entry = sold.entry(key).or_insert(0);
        *entry = entry.saturating_add(sale.qty_sold);
    }
    sold
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use stockbook_domain::{Product, Sale, Violation};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bread_sheet() -> Sheet {
        let mut sheet = Sheet::new("Bakery", Utc::now());
        sheet.products.push(Product::new("Bread", 100.0, 150.0, 20));
        sheet
    }

    #[test]
    fn fresh_product_totals() {
        let sheet = bread_sheet();
        let ledger = compute_ledger(&sheet);
        assert_eq!(ledger.totals.total_items_available, 20);
        assert_eq!(ledger.totals.total_items_sold, 0);
        assert_eq!(ledger.totals.total_stock_value_cost, 2000.0);
        assert!(ledger.validation.is_valid);
    }

    #[test]
    fn recorded_sale_updates_totals() {
        let mut sheet = bread_sheet();
        sheet.products[0].stock_out = 5;
        sheet
            .sales
            .push(Sale::priced(day(2), "Bread", 5, 100.0, 150.0));

        let ledger = compute_ledger(&sheet);
        assert_eq!(ledger.products[0].stock_available, 15);
        assert_eq!(ledger.totals.total_items_available, 15);
        assert_eq!(ledger.totals.total_items_sold, 5);
        assert_eq!(ledger.totals.total_revenue, 750.0);
        assert_eq!(ledger.totals.total_production_cost, 500.0);
        assert_eq!(ledger.totals.gross_profit_total, 250.0);
        assert_eq!(ledger.totals.total_stock_value_cost, 1500.0);
        assert!(ledger.validation.is_valid);
    }

    #[test]
    fn orphaned_sale_is_the_only_violation() {
        let mut sheet = bread_sheet();
        sheet
            .sales
            .push(Sale::priced(day(3), "Croissant", 1, 50.0, 80.0));

        let ledger = compute_ledger(&sheet);
        assert_eq!(
            ledger.validation.violations,
            vec![Violation::OrphanedSale {
                row: 1,
                item_name: "Croissant".into()
            }]
        );
        assert_eq!(ledger.totals.total_revenue, 80.0);
    }

    #[test]
    fn violations_follow_pass_order() {
        let mut sheet = bread_sheet();
        sheet.products.push(Product::new("bread", 1.0, 1.0, 1));
        sheet.products[0].stock_out = 25;
        sheet.sales.push(Sale::priced(day(1), "", 1, 1.0, 1.0));
        sheet.sales.push(Sale::priced(day(1), "Cake", 1, 1.0, 1.0));

        let messages = compute_ledger(&sheet).validation.messages();
        assert_eq!(
            messages,
            vec![
                "Sale #1: item name is required.",
                "Product #1 \"Bread\": stock available cannot be negative.",
                "Product #2: duplicate product name \"bread\" (first used by product #1).",
                "Sale #1: \"\" does not match any product.",
                "Sale #2: \"Cake\" does not match any product.",
            ]
        );
    }

    #[test]
    fn stock_out_below_logged_sales_is_flagged() {
        let mut sheet = bread_sheet();
        sheet.products[0].stock_out = 1;
        sheet.sales.push(Sale::priced(day(1), "Bread", 2, 100.0, 150.0));
        sheet.sales.push(Sale::priced(day(2), "BREAD", 1, 100.0, 150.0));

        let ledger = compute_ledger(&sheet);
        assert_eq!(
            ledger.validation.violations,
            vec![Violation::StockOutBelowSales {
                row: 1,
                name: "Bread".into(),
                stock_out: 1,
                sold: 3,
            }]
        );
    }

    #[test]
    fn money_totals_are_rounded_after_summing() {
        let mut sheet = Sheet::new("Pennies", Utc::now());
        sheet.products.push(Product::new("Bun", 0.1, 0.1, 10));
        for _ in 0..3 {
            let mut sale = Sale::priced(day(1), "Bun", 1, 0.1, 0.1);
            sale.revenue = 0.1;
            sheet.sales.push(sale);
        }
        sheet.products[0].stock_out = 3;
        let ledger = compute_ledger(&sheet);
        assert_eq!(ledger.totals.total_revenue, 0.3);
        assert_eq!(ledger.totals.total_stock_value_cost, 0.7);
    }

    #[test]
    fn extreme_counts_saturate() {
        let mut sheet = Sheet::new("Huge", Utc::now());
        sheet.products.push(Product::new("A", 0.0, 0.0, i64::MAX));
        sheet.products.push(Product::new("B", 0.0, 0.0, i64::MAX));
        let ledger = compute_ledger(&sheet);
        assert_eq!(ledger.totals.total_items_available, i64::MAX);
    }

    #[test]
    fn input_sheet_is_not_mutated() {
        let mut sheet = bread_sheet();
        sheet.sales.push(Sale::priced(day(1), "Bread", 2, 100.0, 150.0));
        let before = sheet.clone();
        let _ = compute_ledger(&sheet);
        assert_eq!(sheet, before);
    }
}
