//! Independent re-verification of a computed ledger.

use std::fmt;

use stockbook_domain::{round_currency, ComputedLedger, ReconciliationReport, Sheet, TotalKind};

use crate::aggregator::compute_ledger;

pub use stockbook_domain::ALL_CLEAR_MESSAGE;

/// Largest absolute difference tolerated between two money totals.
pub const MONEY_TOLERANCE: f64 = 0.01;

const CHECK_ORDER: [TotalKind; 6] = [
    TotalKind::Revenue,
    TotalKind::ProductionCost,
    TotalKind::GrossProfit,
    TotalKind::ItemsSold,
    TotalKind::ItemsAvailable,
    TotalKind::StockValueCost,
];

/// Recomputes the six totals from the ledger's derived rows and compares them
/// with the aggregated totals, then appends negative stock and every validator
/// violation.
pub fn reconcile(ledger: &ComputedLedger<'_>) -> ReconciliationReport {
    let mut messages = Vec::new();

    for kind in CHECK_ORDER {
        if let Some(message) = compare_total(ledger, kind) {
            messages.push(message);
        }
    }

    if ledger.products.iter().any(|row| row.stock_available < 0) {
        messages.push("Negative stock available detected.".to_string());
    }

    messages.extend(ledger.validation.messages());

    let report = ReconciliationReport::from_messages(messages);
    tracing::debug!(
        passed = report.passed,
        messages = report.messages.len(),
        "reconciled ledger"
    );
    report
}

/// Computes the ledger for `sheet` and reconciles it.
pub fn run_system_check(sheet: &Sheet) -> ReconciliationReport {
    reconcile(&compute_ledger(sheet))
}

fn compare_total(ledger: &ComputedLedger<'_>, kind: TotalKind) -> Option<String> {
    let totals = &ledger.totals;
    if kind.is_currency() {
        let expected = round_currency(sum_finite(money_column(ledger, kind)));
        let actual = totals.get(kind);
        let agrees = (expected - actual).abs() <= MONEY_TOLERANCE;
        (!agrees).then(|| mismatch(kind, expected, actual))
    } else {
        let (expected, actual) = match kind {
            TotalKind::ItemsSold => (
                sum_counts(ledger.sales.iter().map(|sale| sale.qty_sold)),
                totals.total_items_sold,
            ),
            _ => (
                sum_counts(ledger.products.iter().map(|row| row.stock_available)),
                totals.total_items_available,
            ),
        };
        (expected != actual).then(|| mismatch(kind, expected, actual))
    }
}

fn money_column<'a>(
    ledger: &'a ComputedLedger<'_>,
    kind: TotalKind,
) -> Box<dyn Iterator<Item = f64> + 'a> {
    match kind {
        TotalKind::Revenue => Box::new(ledger.sales.iter().map(|sale| sale.revenue)),
        TotalKind::ProductionCost => {
            Box::new(ledger.sales.iter().map(|sale| sale.production_cost))
        }
        TotalKind::GrossProfit => Box::new(ledger.sales.iter().map(|sale| sale.gross_profit)),
        _ => Box::new(ledger.products.iter().map(|row| row.stock_value_cost)),
    }
}

fn sum_finite(values: impl Iterator<Item = f64>) -> f64 {
    values
        .filter(|value| value.is_finite())
        .fold(0.0, |sum, value| sum + value)
}

fn sum_counts(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0i64, i64::saturating_add)
}

fn mismatch(kind: TotalKind, expected: impl fmt::Display, actual: impl fmt::Display) -> String {
    format!("{kind} mismatch. Expected {expected}, got {actual}.")
}
