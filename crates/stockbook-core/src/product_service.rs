use stockbook_domain::{normalize_name, round_currency, Product, Sheet};

use crate::{Clock, CoreError, CoreResult};

/// Raw input for a new product, as typed by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub unit_cost: f64,
    pub unit_price: f64,
    pub opening_stock: f64,
}

/// A single-field change to an existing product.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductEdit {
    Name(String),
    UnitCost(f64),
    UnitPrice(f64),
    OpeningStock(f64),
}

pub struct ProductService;

impl ProductService {
    pub fn add(sheet: &mut Sheet, draft: ProductDraft, clock: &dyn Clock) -> CoreResult<()> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CoreError::rejected("Product name is required."));
        }
        if sheet.product_index(name).is_some() {
            return Err(CoreError::rejected(
                "Product names must be unique within a sheet.",
            ));
        }
        if !is_non_negative(draft.unit_cost) || !is_non_negative(draft.unit_price) {
            return Err(CoreError::rejected(
                "Unit cost and unit price must be numbers >= 0.",
            ));
        }
        let opening_stock = whole_number(draft.opening_stock)
            .filter(|stock| *stock >= 0)
            .ok_or_else(|| CoreError::rejected("Opening stock must be an integer >= 0."))?;

        sheet.products.push(Product::new(
            name,
            round_currency(draft.unit_cost),
            round_currency(draft.unit_price),
            opening_stock,
        ));
        sheet.touch(clock.now());
        tracing::info!(sheet = %sheet.id, product = %name, "added product");
        Ok(())
    }

    /// Applies one field edit to the product at `index`. Renames cascade to every
    /// sale recorded under the old name.
    pub fn edit(
        sheet: &mut Sheet,
        index: usize,
        edit: ProductEdit,
        clock: &dyn Clock,
    ) -> CoreResult<()> {
        if index >= sheet.products.len() {
            return Err(CoreError::ProductNotFound(format!("#{}", index + 1)));
        }

        match edit {
            ProductEdit::Name(next) => Self::rename(sheet, index, next.trim())?,
            ProductEdit::UnitCost(value) => {
                let value = non_negative(value)?;
                sheet.products[index].unit_cost = round_currency(value);
            }
            ProductEdit::UnitPrice(value) => {
                let value = non_negative(value)?;
                sheet.products[index].unit_price = round_currency(value);
            }
            ProductEdit::OpeningStock(value) => {
                let value = non_negative(value)?;
                let stock = whole_number(value)
                    .ok_or_else(|| CoreError::rejected("Opening stock must be an integer value."))?;
                let product = &mut sheet.products[index];
                if stock < product.stock_out {
                    return Err(CoreError::rejected(
                        "Opening stock cannot be lower than stock out.",
                    ));
                }
                product.opening_stock = stock;
            }
        }

        sheet.touch(clock.now());
        tracing::info!(
            sheet = %sheet.id,
            product = %sheet.products[index].name,
            "edited product"
        );
        Ok(())
    }

    /// Deletes the product at `index`. Refused while any sale references it.
    pub fn remove(sheet: &mut Sheet, index: usize, clock: &dyn Clock) -> CoreResult<Product> {
        let product = sheet
            .products
            .get(index)
            .ok_or_else(|| CoreError::ProductNotFound(format!("#{}", index + 1)))?;
        if sheet.has_sales_for(&product.name) {
            return Err(CoreError::rejected(
                "Delete related sales first before deleting this product.",
            ));
        }
        let removed = sheet.products.remove(index);
        sheet.touch(clock.now());
        tracing::info!(sheet = %sheet.id, product = %removed.name, "deleted product");
        Ok(removed)
    }

    /// Position of the product named `name`, ignoring case and padding.
    pub fn index_of(sheet: &Sheet, name: &str) -> CoreResult<usize> {
        sheet
            .product_index(name)
            .ok_or_else(|| CoreError::ProductNotFound(name.trim().to_string()))
    }

    fn rename(sheet: &mut Sheet, index: usize, next: &str) -> CoreResult<()> {
        if next.is_empty() {
            return Err(CoreError::rejected("Product name cannot be empty."));
        }
        let next_key = normalize_name(next);
        let collides = sheet
            .products
            .iter()
            .enumerate()
            .any(|(i, product)| i != index && normalize_name(&product.name) == next_key);
        if collides {
            return Err(CoreError::rejected("Duplicate product name is not allowed."));
        }

        let old_key = normalize_name(&sheet.products[index].name);
        sheet.products[index].name = next.to_string();
        if old_key != next_key {
            for sale in &mut sheet.sales {
                if normalize_name(&sale.item_name) == old_key {
                    sale.item_name = next.to_string();
                }
            }
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn non_negative(value: f64) -> CoreResult<f64> {
    if is_non_negative(value) {
        Ok(value)
    } else {
        Err(CoreError::rejected(
            "Values must be valid numbers and cannot be negative.",
        ))
    }
}

/// Returns `value` as an integer when it is finite and has no fractional part.
fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}
