use stockbook_domain::{Sale, Sheet};

use crate::{aggregator::compute_ledger, normalizer::parse_iso_date, Clock, CoreError, CoreResult};

/// Raw input for a new sale. A missing or blank date means today.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub date: Option<String>,
    pub item_name: String,
    pub qty_sold: f64,
}

pub struct SaleService;

impl SaleService {
    /// Records a sale against an existing product and moves its stock out.
    ///
    /// Stock availability is read from a freshly computed ledger so the check sees
    /// exactly what the inventory view shows. Returns the new sale id.
    pub fn add(sheet: &mut Sheet, draft: SaleDraft, clock: &dyn Clock) -> CoreResult<String> {
        let date = match draft.date.as_deref().map(str::trim) {
            None | Some("") => clock.today(),
            Some(text) => parse_iso_date(text)
                .ok_or_else(|| CoreError::rejected("Please choose a valid sale date."))?,
        };

        let item_name = draft.item_name.trim();
        if item_name.is_empty() {
            return Err(CoreError::rejected("Please select an item."));
        }

        let qty_sold = whole_quantity(draft.qty_sold)
            .ok_or_else(|| CoreError::rejected("Quantity sold must be an integer >= 1."))?;

        {
            let ledger = compute_ledger(sheet);
            let row = ledger
                .product(item_name)
                .ok_or_else(|| CoreError::rejected("Selected product no longer exists."))?;
            if qty_sold > row.stock_available {
                let err = CoreError::InsufficientStock {
                    product: row.name.clone(),
                    available: row.stock_available,
                };
                tracing::warn!(reason = %err, "mutation rejected");
                return Err(err);
            }
        }

        let product = sheet
            .product_mut(item_name)
            .ok_or_else(|| CoreError::ProductNotFound(item_name.to_string()))?;
        let sale = Sale::priced(
            date,
            product.name.clone(),
            qty_sold,
            product.unit_cost,
            product.unit_price,
        );
        product.stock_out = product.stock_out.saturating_add(qty_sold);

        let id = sale.id.clone();
        tracing::info!(
            sheet = %sheet.id,
            product = %sale.item_name,
            qty = qty_sold,
            "logged sale"
        );
        sheet.sales.push(sale);
        sheet.touch(clock.now());
        Ok(id)
    }

    /// Deletes a sale and rolls its quantity back into the product's stock.
    pub fn remove(sheet: &mut Sheet, sale_id: &str, clock: &dyn Clock) -> CoreResult<Sale> {
        let index = sheet
            .sale_index(sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
        let (item_name, qty_sold) = {
            let sale = &sheet.sales[index];
            (sale.item_name.clone(), sale.qty_sold)
        };

        let product = sheet.product_mut(&item_name).ok_or_else(|| {
            CoreError::rejected("Sale cannot be deleted because the related product is missing.")
        })?;
        let rolled_back = product.stock_out.saturating_sub(qty_sold);
        if rolled_back < 0 {
            return Err(CoreError::rejected(
                "Sale cannot be deleted due to invalid stock rollback.",
            ));
        }
        product.stock_out = rolled_back;

        let removed = sheet.sales.remove(index);
        sheet.touch(clock.now());
        tracing::info!(sheet = %sheet.id, sale = %removed.id, "deleted sale");
        Ok(removed)
    }
}

fn whole_quantity(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value >= 1.0).then_some(value as i64)
}
