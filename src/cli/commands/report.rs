use colored::Colorize;

use stockbook_core::{CurrencyFormatter, DateFormatter};
use stockbook_domain::{TotalKind, Totals};

use crate::cli::commands::short_id;
use crate::cli::context::ShellContext;
use crate::cli::error::CommandResult;
use crate::cli::formatters::{color_by_sign, format_count};
use crate::cli::output::{error, info, plain, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "dashboard",
            "Show the active sheet's totals",
            "dashboard",
            cmd_dashboard,
        ),
        CommandEntry::new(
            "inventory",
            "List products with derived stock levels",
            "inventory",
            cmd_inventory,
        ),
        CommandEntry::new("sales", "List sales, newest first", "sales", cmd_sales),
        CommandEntry::new(
            "check",
            "Recompute totals and report invariant breaches",
            "check",
            cmd_check,
        ),
    ]
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let ledger = context.manager.active_ledger()?;

    section(format!("Dashboard: {}", ledger.sheet.name));
    for kind in TotalKind::ALL {
        let rendered = render_total(&ledger.totals, kind, &currency);
        plain(format!("  {:<20} {rendered}", kind.label()));
    }

    if !ledger.validation.is_valid {
        warning(format!(
            "{} data issue(s) found. Run `check` for details.",
            ledger.validation.violations.len()
        ));
    }
    Ok(())
}

/// Counts are read as integers; only money totals go through the currency formatter.
fn render_total(totals: &Totals, kind: TotalKind, currency: &dyn CurrencyFormatter) -> String {
    match kind {
        TotalKind::ItemsAvailable => format_count(totals.total_items_available),
        TotalKind::ItemsSold => format_count(totals.total_items_sold),
        TotalKind::GrossProfit => {
            let profit = totals.gross_profit_total;
            color_by_sign(profit, currency.format_amount(profit))
        }
        money => currency.format_amount(totals.get(money)),
    }
}

fn cmd_inventory(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let threshold = context.config.low_stock_threshold;
    let ledger = context.manager.active_ledger()?;

    section(format!("Inventory: {}", ledger.sheet.name));
    if ledger.products.is_empty() {
        info("No products yet. Add one with `product add`.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Product"),
        TableColumn::right("Unit Cost"),
        TableColumn::right("Unit Price"),
        TableColumn::right("Opening"),
        TableColumn::right("Stock Out"),
        TableColumn::right("Available"),
        TableColumn::right("Stock Value"),
        TableColumn::left(""),
    ]);
    for row in &ledger.products {
        let flag = if row.is_low_stock(threshold) {
            "LOW".yellow().to_string()
        } else {
            String::new()
        };
        table.push_row(vec![
            row.name.clone(),
            currency.format_amount(row.unit_cost),
            currency.format_amount(row.unit_price),
            format_count(row.opening_stock),
            format_count(row.stock_out),
            format_count(row.stock_available),
            currency.format_amount(row.stock_value_cost),
            flag,
        ]);
    }
    plain(table.render());
    Ok(())
}

fn cmd_sales(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let currency = context.currency();
    let dates = context.dates();
    let ledger = context.manager.active_ledger()?;

    section(format!("Sales: {}", ledger.sheet.name));
    if ledger.sales.is_empty() {
        info("No sales logged yet.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::left("Item"),
        TableColumn::right("Qty"),
        TableColumn::right("Revenue"),
        TableColumn::right("Cost"),
        TableColumn::right("Gross Profit"),
        TableColumn::left("Id"),
    ]);
    for sale in ledger.sales_by_date_desc() {
        table.push_row(vec![
            dates.format_date(sale.date),
            sale.item_name.clone(),
            format_count(sale.qty_sold),
            currency.format_amount(sale.revenue),
            currency.format_amount(sale.production_cost),
            color_by_sign(sale.gross_profit, currency.format_amount(sale.gross_profit)),
            short_id(&sale.id).to_string(),
        ]);
    }
    plain(table.render());
    Ok(())
}

fn cmd_check(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let report = context.manager.system_check()?;
    if report.passed {
        success("PASS");
    } else {
        error("FAIL");
    }
    for message in &report.messages {
        plain(format!("  {message}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::formatters::SymbolCurrencyFormatter;

    #[test]
    fn counts_render_without_float_rounding() {
        let currency = SymbolCurrencyFormatter::new("₦".to_string());
        let totals = Totals {
            total_items_available: 9_007_199_254_740_993,
            total_items_sold: -3,
            total_revenue: 750.0,
            ..Totals::default()
        };
        assert_eq!(
            render_total(&totals, TotalKind::ItemsAvailable, &currency),
            "9,007,199,254,740,993"
        );
        assert_eq!(render_total(&totals, TotalKind::ItemsSold, &currency), "-3");
        assert_eq!(
            render_total(&totals, TotalKind::Revenue, &currency),
            currency.format_amount(750.0)
        );
    }
}
