//! Coerces loosely-typed JSON records into well-typed domain values.
//!
//! Every function here is total: malformed input becomes normalized data that the
//! validator will later flag, never an error. Records that are not JSON objects are
//! dropped from their containing collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use stockbook_domain::{fallback_sheet_name, new_id, Product, Sale, Sheet, SheetBook};

use crate::time::Clock;

/// Normalizes a whole persisted document into a book with a valid active sheet.
pub fn normalize_book(value: &Value, clock: &dyn Clock) -> SheetBook {
    let Some(object) = value.as_object() else {
        tracing::debug!("sheet book document is not an object; using default book");
        return SheetBook::new(clock.now());
    };

    let sheets: Vec<Sheet> = object
        .get("sheets")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .enumerate()
                .filter_map(|(index, sheet)| normalize_sheet(sheet, index, clock))
                .collect()
        })
        .unwrap_or_default();

    if sheets.is_empty() {
        tracing::debug!("sheet book document has no usable sheets; using default book");
        return SheetBook::new(clock.now());
    }

    let requested = object
        .get("activeSheetId")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let active_sheet_id = if sheets.iter().any(|sheet| sheet.id == requested) {
        requested.to_string()
    } else {
        sheets[0].id.clone()
    };

    tracing::debug!(sheets = sheets.len(), "normalized sheet book");
    SheetBook {
        active_sheet_id,
        sheets,
    }
}

/// Normalizes the sheet found at 0-based `index` of the stored sheet array.
pub fn normalize_sheet(value: &Value, index: usize, clock: &dyn Clock) -> Option<Sheet> {
    let object = value.as_object()?;
    let now = clock.now();

    let name = match text_field(object, "name") {
        name if name.is_empty() => fallback_sheet_name(index + 1),
        name => name,
    };

    Some(Sheet {
        id: id_field(object, "id"),
        name,
        created_at: timestamp_field(object, "createdAtISO").unwrap_or(now),
        updated_at: timestamp_field(object, "updatedAtISO").unwrap_or(now),
        products: array_field(object, "products")
            .iter()
            .filter_map(normalize_product)
            .collect(),
        sales: array_field(object, "sales")
            .iter()
            .filter_map(|sale| normalize_sale(sale, clock))
            .collect(),
    })
}

pub fn normalize_product(value: &Value) -> Option<Product> {
    let object = value.as_object()?;
    Some(Product {
        name: text_field(object, "name"),
        unit_cost: to_number_or_zero(field(object, "unitCost")),
        unit_price: to_number_or_zero(field(object, "unitPrice")),
        opening_stock: to_integer_or_zero(field(object, "openingStock")),
        stock_out: to_integer_or_zero(field(object, "stockOut")),
    })
}

pub fn normalize_sale(value: &Value, clock: &dyn Clock) -> Option<Sale> {
    let object = value.as_object()?;
    Some(Sale {
        id: id_field(object, "id"),
        date: field(object, "dateISO")
            .as_str()
            .and_then(parse_iso_date)
            .unwrap_or_else(|| clock.today()),
        item_name: text_field(object, "itemName"),
        qty_sold: to_integer_or_zero(field(object, "qtySold")),
        revenue: to_number_or_zero(field(object, "revenue")),
        production_cost: to_number_or_zero(field(object, "productionCost")),
        gross_profit: to_number_or_zero(field(object, "grossProfit")),
    })
}

/// Numeric coercion that maps every non-finite result to zero.
pub fn to_number_or_zero(value: &Value) -> f64 {
    let number = coerce_number(value);
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

/// Integer coercion: non-finite values become zero, fractions truncate toward zero.
pub fn to_integer_or_zero(value: &Value) -> i64 {
    let number = coerce_number(value);
    if number.is_finite() {
        number.trunc() as i64
    } else {
        0
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Mirrors the loose `Number(value)` conversion browsers apply to stored JSON.
fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => parse_numeric_text(text),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [Value::Null] => 0.0,
            [Value::Bool(_)] | [Value::Object(_)] => f64::NAN,
            [single] => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a Value {
    object.get(key).unwrap_or(&Value::Null)
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    field(object, key)
        .as_str()
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn id_field(object: &Map<String, Value>, key: &str) -> String {
    match field(object, key).as_str() {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => new_id(),
    }
}

fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    field(object, key)
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn timestamp_field(object: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let text = field(object, key).as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    parse_iso_date(text)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::parse_from_rfc3339("2024-05-06T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc)
        }
    }

    #[test]
    fn numeric_fields_follow_loose_coercion() {
        assert_eq!(to_number_or_zero(&json!(" 12.5 ")), 12.5);
        assert_eq!(to_number_or_zero(&json!("")), 0.0);
        assert_eq!(to_number_or_zero(&json!("abc")), 0.0);
        assert_eq!(to_number_or_zero(&json!(true)), 1.0);
        assert_eq!(to_number_or_zero(&json!(null)), 0.0);
        assert_eq!(to_number_or_zero(&json!(["7"])), 7.0);
        assert_eq!(to_number_or_zero(&json!([1, 2])), 0.0);
        assert_eq!(to_number_or_zero(&json!({"a": 1})), 0.0);
        assert_eq!(to_number_or_zero(&json!("Infinity")), 0.0);
    }

    #[test]
    fn integer_fields_truncate_toward_zero() {
        assert_eq!(to_integer_or_zero(&json!(4.9)), 4);
        assert_eq!(to_integer_or_zero(&json!(-4.9)), -4);
        assert_eq!(to_integer_or_zero(&json!("3.7")), 3);
        assert_eq!(to_integer_or_zero(&json!("NaN")), 0);
    }

    #[test]
    fn product_defaults_missing_fields() {
        let product = normalize_product(&json!({"name": "  Bread  ", "unitCost": "x"}))
            .expect("object normalizes");
        assert_eq!(product.name, "Bread");
        assert_eq!(product.unit_cost, 0.0);
        assert_eq!(product.opening_stock, 0);
        assert_eq!(product.stock_out, 0);
    }

    #[test]
    fn non_string_names_become_empty() {
        let product = normalize_product(&json!({"name": 42})).unwrap();
        assert_eq!(product.name, "");
        assert!(normalize_product(&json!("Bread")).is_none());
    }

    #[test]
    fn sale_regenerates_id_and_defaults_date() {
        let sale = normalize_sale(
            &json!({"id": "  ", "dateISO": "2024-02-30", "itemName": "Bread", "qtySold": 2.6}),
            &FixedClock,
        )
        .expect("object normalizes");
        assert!(!sale.id.trim().is_empty());
        assert_eq!(sale.date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        assert_eq!(sale.qty_sold, 2);
    }

    #[test]
    fn iso_dates_must_be_strict() {
        assert!(parse_iso_date("2024-01-09").is_some());
        assert!(parse_iso_date("2024-1-9").is_none());
        assert!(parse_iso_date("20240-01-09").is_none());
        assert!(parse_iso_date("2024-13-01").is_none());
    }

    #[test]
    fn book_falls_back_to_first_sheet() {
        let raw = json!({
            "activeSheetId": "nope",
            "sheets": [
                null,
                {"id": "b", "name": "", "products": [{"name": "Bread"}, 5], "sales": "bad"},
                {"id": "c", "name": "Second"}
            ]
        });
        let book = normalize_book(&raw, &FixedClock);
        assert_eq!(book.sheets.len(), 2);
        assert_eq!(book.active_sheet_id, "b");
        assert_eq!(book.sheets[0].name, "Stock Sheet 2");
        assert_eq!(book.sheets[0].products.len(), 1);
        assert!(book.sheets[0].sales.is_empty());
        assert_eq!(book.sheets[0].created_at, FixedClock.now());
    }

    #[test]
    fn garbage_document_yields_default_book() {
        let book = normalize_book(&json!([1, 2, 3]), &FixedClock);
        assert_eq!(book.sheets.len(), 1);
        assert!(book.active().is_some());

        let empty = normalize_book(&json!({"sheets": []}), &FixedClock);
        assert_eq!(empty.sheets.len(), 1);
    }

    #[test]
    fn keeps_valid_active_sheet_and_timestamps() {
        let raw = json!({
            "activeSheetId": "c",
            "sheets": [
                {"id": "b", "name": "First", "createdAtISO": "2023-01-01T08:30:00.000Z"},
                {"id": "c", "name": "Second"}
            ]
        });
        let book = normalize_book(&raw, &FixedClock);
        assert_eq!(book.active_sheet_id, "c");
        assert_eq!(
            book.sheets[0].created_at.to_rfc3339(),
            "2023-01-01T08:30:00+00:00"
        );
    }
}
