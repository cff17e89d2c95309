use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stockbook_core::{compute_ledger, run_system_check};
use stockbook_domain::{Product, Sale, Sheet};
use stockbook_storage_json::save_book_to_path;
use tempfile::tempdir;

fn build_sample_sheet(product_count: usize, sale_count: usize) -> Sheet {
    let mut sheet = Sheet::new("Benchmark", Utc::now());
    for idx in 0..product_count {
        let unit_cost = 50.0 + (idx % 40) as f64;
        sheet.products.push(Product::new(
            format!("Item {idx}"),
            unit_cost,
            unit_cost * 1.4,
            1_000_000,
        ));
    }

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for idx in 0..sale_count {
        let product = &mut sheet.products[idx % product_count];
        let qty = 1 + (idx % 7) as i64;
        product.stock_out += qty;
        let sale = Sale::priced(
            start + Duration::days((idx % 365) as i64),
            product.name.clone(),
            qty,
            product.unit_cost,
            product.unit_price,
        );
        sheet.sales.push(sale);
    }
    sheet
}

fn bench_aggregation(c: &mut Criterion) {
    let sheet = build_sample_sheet(200, black_box(10_000));

    c.bench_function("compute_ledger_10k_sales", |b| {
        b.iter(|| {
            let ledger = compute_ledger(&sheet);
            black_box(ledger.totals);
        })
    });

    c.bench_function("system_check_10k_sales", |b| {
        b.iter(|| {
            let report = run_system_check(&sheet);
            black_box(report);
        })
    });
}

fn bench_book_save(c: &mut Criterion) {
    let mut book = stockbook_domain::SheetBook::new(Utc::now());
    book.sheets[0] = build_sample_sheet(200, black_box(10_000));
    book.active_sheet_id = book.sheets[0].id.clone();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bakeryApp.json");

    c.bench_function("book_save_10k_sales", |b| {
        b.iter(|| {
            save_book_to_path(&book, &path).expect("save book");
        })
    });
}

criterion_group!(benches, bench_aggregation, bench_book_save);
criterion_main!(benches);
