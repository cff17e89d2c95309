mod common;

use std::fs;

use chrono::NaiveDate;
use common::{setup_test_env, FixedClock};
use stockbook::BookManager;
use stockbook_core::{Clock, CoreError, ProductDraft, ProductEdit, SaleDraft};
use stockbook_domain::ALL_CLEAR_MESSAGE;
use stockbook_storage_json::JsonBookStorage;

fn draft(name: &str, cost: f64, price: f64, stock: f64) -> ProductDraft {
    ProductDraft {
        name: name.into(),
        unit_cost: cost,
        unit_price: price,
        opening_stock: stock,
    }
}

fn sale(item: &str, qty: f64, date: Option<&str>) -> SaleDraft {
    SaleDraft {
        date: date.map(str::to_string),
        item_name: item.into(),
        qty_sold: qty,
    }
}

#[test]
fn bread_day_survives_a_reload() {
    let (mut manager, _, base) = setup_test_env();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();
    manager.add_sale(sale("Bread", 5.0, Some("2024-01-09"))).unwrap();

    let storage = JsonBookStorage::new(base.join("data")).unwrap();
    let mut reloaded = BookManager::new(Box::new(storage), Box::new(FixedClock));
    reloaded.load().unwrap();

    let ledger = reloaded.active_ledger().unwrap();
    assert_eq!(ledger.products[0].stock_available, 15);
    assert_eq!(ledger.totals.total_revenue, 750.0);
    assert_eq!(ledger.totals.gross_profit_total, 250.0);
    assert_eq!(ledger.totals.total_stock_value_cost, 1500.0);
    let report = reloaded.system_check().unwrap();
    assert!(report.passed);
    assert_eq!(report.messages, vec![ALL_CLEAR_MESSAGE.to_string()]);
}

#[test]
fn sale_without_date_uses_clock_today() {
    let (mut manager, _, _) = setup_test_env();
    manager.add_product(draft("Puff Puff", 20.0, 50.0, 40.0)).unwrap();
    let logged = manager.add_sale(sale("puff puff", 4.0, None)).unwrap();
    assert_eq!(logged.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    assert_eq!(logged.item_name, "Puff Puff");
}

#[test]
fn delete_product_with_sales_is_refused() {
    let (mut manager, _, _) = setup_test_env();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();
    let logged = manager.add_sale(sale("Bread", 2.0, None)).unwrap();

    let err = manager.delete_product("Bread").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Delete related sales first before deleting this product."
    );

    manager.delete_sale(&logged.id).unwrap();
    let removed = manager.delete_product("bread").unwrap();
    assert_eq!(removed.name, "Bread");
    assert!(manager.active_sheet().unwrap().products.is_empty());
}

#[test]
fn opening_stock_cannot_drop_below_stock_out() {
    let (mut manager, _, _) = setup_test_env();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();
    manager.add_sale(sale("Bread", 8.0, None)).unwrap();

    let err = manager
        .edit_product("Bread", ProductEdit::OpeningStock(5.0))
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref message)
        if message == "Opening stock cannot be lower than stock out."));
    assert_eq!(manager.active_sheet().unwrap().products[0].opening_stock, 20);
}

#[test]
fn deleting_last_sheet_reseeds_the_book() {
    let (mut manager, _, _) = setup_test_env();
    let removed = manager.delete_active_sheet().unwrap();
    assert_eq!(removed.name, "Main Stock Sheet");

    let book = manager.book();
    assert_eq!(book.sheets.len(), 1);
    assert_eq!(book.sheets[0].name, "Main Stock Sheet");
    assert_ne!(book.sheets[0].id, removed.id);
    assert_eq!(book.active_sheet_id, book.sheets[0].id);
}

#[test]
fn export_then_import_restores_everything() {
    let (mut manager, _, base) = setup_test_env();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();
    manager.create_sheet("Weekend").unwrap();
    manager.add_product(draft("Meat Pie", 250.0, 400.0, 12.0)).unwrap();
    let exported = manager.book().clone();
    let path = base.join("export.json");
    manager.export(&path).unwrap();

    manager.delete_active_sheet().unwrap();
    manager.delete_active_sheet().unwrap();
    assert_eq!(manager.book().sheets.len(), 1);

    let loaded = manager.import(&path).unwrap();
    assert!(loaded.warnings.is_empty());
    assert_eq!(manager.book().sheets.len(), 2);
    assert_eq!(manager.book().active_sheet_id, exported.active_sheet_id);
    assert_eq!(
        manager.active_sheet().unwrap().products,
        exported.active().unwrap().products
    );
    // Import is persisted immediately.
    let stored = fs::read_to_string(manager.book_path()).unwrap();
    assert!(stored.contains("Meat Pie"));
}

#[test]
fn backups_restore_an_earlier_book() {
    let (mut manager, _, _) = setup_test_env();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();
    let checkpoint = manager.backup(Some("before pies")).unwrap();
    assert_eq!(checkpoint.note.as_deref(), Some("before-pies"));

    manager.add_product(draft("Meat Pie", 250.0, 400.0, 12.0)).unwrap();
    assert_eq!(manager.active_sheet().unwrap().products.len(), 2);

    manager.restore_backup(&checkpoint).unwrap();
    let names: Vec<_> = manager
        .active_sheet()
        .unwrap()
        .products
        .iter()
        .map(|product| product.name.clone())
        .collect();
    assert_eq!(names, vec!["Bread".to_string()]);
}

#[test]
fn sheet_timestamps_follow_the_manager_clock() {
    let (mut manager, _, _) = setup_test_env();
    manager.create_sheet("Weekend").unwrap();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();

    for sheet in &manager.book().sheets {
        assert_eq!(sheet.created_at, FixedClock.now());
        assert_eq!(sheet.updated_at, FixedClock.now());
    }
    let recent: Vec<_> = manager
        .recent_sheets()
        .into_iter()
        .map(|sheet| sheet.name.as_str())
        .collect();
    assert_eq!(recent, vec!["Weekend", "Main Stock Sheet"]);
}

#[test]
fn deleted_backups_cannot_be_restored() {
    let (mut manager, _, _) = setup_test_env();
    manager.add_product(draft("Bread", 100.0, 150.0, 20.0)).unwrap();
    let checkpoint = manager.backup(Some("scratch")).unwrap();

    manager.delete_backup(&checkpoint).unwrap();
    assert!(manager.list_backups().unwrap().is_empty());
    assert!(manager.restore_backup(&checkpoint).is_err());
    assert_eq!(manager.active_sheet().unwrap().products.len(), 1);
}

#[test]
fn config_round_trips_through_manager() {
    let (_, config_manager, _) = setup_test_env();
    let mut config = config_manager.load().unwrap();
    config.set("currency_symbol", "$").unwrap();
    config.set("low_stock_threshold", "5").unwrap();
    config_manager.save(&config).unwrap();

    let reloaded = config_manager.load().unwrap();
    assert_eq!(reloaded.currency_symbol, "$");
    assert_eq!(reloaded.low_stock_threshold, 5);
}
