//! Stock sheets and the book that tracks which sheet is active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{common::*, product::Product, sale::Sale};

/// Name given to the sheet seeded into an empty book.
pub const DEFAULT_SHEET_NAME: &str = "Main Stock Sheet";

/// Fallback display name for the sheet at 1-based `position`.
pub fn fallback_sheet_name(position: usize) -> String {
    format!("Stock Sheet {position}")
}

/// One independent ledger: a named collection of products and sales.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdAtISO")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAtISO")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            products: Vec::new(),
            sales: Vec::new(),
        }
    }

    /// Marks the sheet as modified at `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Position of the first product whose name matches `name` case-insensitively.
    pub fn product_index(&self, name: &str) -> Option<usize> {
        self.products
            .iter()
            .position(|product| product.matches_name(name))
    }

    pub fn product(&self, name: &str) -> Option<&Product> {
        self.product_index(name).map(|index| &self.products[index])
    }

    pub fn product_mut(&mut self, name: &str) -> Option<&mut Product> {
        self.products
            .iter_mut()
            .find(|product| product.matches_name(name))
    }

    pub fn sale_index(&self, id: &str) -> Option<usize> {
        self.sales.iter().position(|sale| sale.id == id)
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|sale| sale.id == id)
    }

    pub fn has_sales_for(&self, product_name: &str) -> bool {
        self.sales.iter().any(|sale| sale.references(product_name))
    }
}

impl NamedEntity for Sheet {
    fn name(&self) -> &str {
        &self.name
    }
}

/// The full application context: every sheet plus the active-sheet pointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetBook {
    pub active_sheet_id: String,
    pub sheets: Vec<Sheet>,
}

impl SheetBook {
    /// A book holding a single default sheet created at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        let sheet = Sheet::new(DEFAULT_SHEET_NAME, now);
        Self {
            active_sheet_id: sheet.id.clone(),
            sheets: vec![sheet],
        }
    }

    pub fn active(&self) -> Option<&Sheet> {
        self.sheet(&self.active_sheet_id)
    }

    pub fn active_mut(&mut self) -> Option<&mut Sheet> {
        let id = self.active_sheet_id.clone();
        self.sheets.iter_mut().find(|sheet| sheet.id == id)
    }

    pub fn sheet(&self, id: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sheet(id).is_some()
    }

    /// Restores the book invariant: at least one sheet, and the active id names one.
    /// A reseeded sheet is stamped with `now`. Returns `true` when the book changed.
    pub fn ensure_active(&mut self, now: DateTime<Utc>) -> bool {
        if self.sheets.is_empty() {
            let replacement = Sheet::new(DEFAULT_SHEET_NAME, now);
            self.active_sheet_id = replacement.id.clone();
            self.sheets.push(replacement);
            return true;
        }
        self.repoint_active()
    }

    /// Points a dangling active id at the first sheet. Returns `true` when it moved.
    pub fn repoint_active(&mut self) -> bool {
        match self.sheets.first() {
            Some(first) if !self.contains(&self.active_sheet_id) => {
                self.active_sheet_id = first.id.clone();
                true
            }
            _ => false,
        }
    }
}
