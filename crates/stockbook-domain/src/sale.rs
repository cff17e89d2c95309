//! Sale transactions recorded against products by name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    #[serde(rename = "dateISO")]
    pub date: NaiveDate,
    pub item_name: String,
    pub qty_sold: i64,
    pub revenue: f64,
    pub production_cost: f64,
    pub gross_profit: f64,
}

impl Sale {
    /// Builds a sale priced from the product's unit cost and unit price.
    pub fn priced(
        date: NaiveDate,
        item_name: impl Into<String>,
        qty_sold: i64,
        unit_cost: f64,
        unit_price: f64,
    ) -> Self {
        let revenue = round_currency(qty_sold as f64 * unit_price);
        let production_cost = round_currency(qty_sold as f64 * unit_cost);
        Self {
            id: new_id(),
            date,
            item_name: item_name.into(),
            qty_sold,
            revenue,
            production_cost,
            gross_profit: round_currency(revenue - production_cost),
        }
    }

    pub fn references(&self, product_name: &str) -> bool {
        normalize_name(&self.item_name) == normalize_name(product_name)
    }
}
