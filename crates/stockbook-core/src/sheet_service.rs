use stockbook_domain::{fallback_sheet_name, Sheet, SheetBook};

use crate::{Clock, CoreError, CoreResult};

/// Sheet lifecycle operations on a [`SheetBook`].
pub struct SheetService;

impl SheetService {
    /// Inserts a new sheet at the front of the book and makes it active.
    ///
    /// A blank name falls back to `Stock Sheet {n}` where `n` counts the new sheet.
    pub fn create(book: &mut SheetBook, name: &str, clock: &dyn Clock) -> String {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            fallback_sheet_name(book.sheets.len() + 1)
        } else {
            trimmed.to_string()
        };
        let sheet = Sheet::new(name, clock.now());
        let id = sheet.id.clone();
        tracing::info!(sheet = %id, name = %sheet.name, "created stock sheet");
        book.sheets.insert(0, sheet);
        book.active_sheet_id = id.clone();
        id
    }

    pub fn rename_active(book: &mut SheetBook, name: &str, clock: &dyn Clock) -> CoreResult<()> {
        let next = name.trim();
        if next.is_empty() {
            return Err(CoreError::rejected("Stock sheet name cannot be empty."));
        }
        let sheet = Self::active_mut(book)?;
        sheet.name = next.to_string();
        sheet.touch(clock.now());
        tracing::info!(sheet = %sheet.id, name = %sheet.name, "renamed stock sheet");
        Ok(())
    }

    /// Removes the active sheet and activates the first remaining one, seeding a
    /// fresh default sheet if the book became empty.
    pub fn delete_active(book: &mut SheetBook, clock: &dyn Clock) -> CoreResult<Sheet> {
        book.repoint_active();
        let position = book
            .sheets
            .iter()
            .position(|sheet| sheet.id == book.active_sheet_id)
            .ok_or(CoreError::NoActiveSheet)?;
        let removed = book.sheets.remove(position);
        book.ensure_active(clock.now());
        book.active_sheet_id = book.sheets[0].id.clone();
        tracing::info!(sheet = %removed.id, name = %removed.name, "deleted stock sheet");
        Ok(removed)
    }

    pub fn switch(book: &mut SheetBook, id: &str) -> CoreResult<()> {
        if !book.contains(id) {
            return Err(CoreError::SheetNotFound(id.to_string()));
        }
        book.active_sheet_id = id.to_string();
        tracing::debug!(sheet = %id, "switched active sheet");
        Ok(())
    }

    pub fn active(book: &SheetBook) -> CoreResult<&Sheet> {
        book.active().ok_or(CoreError::NoActiveSheet)
    }

    /// Active sheet for mutation. Repairs the book first if the pointer dangles.
    pub fn active_mut(book: &mut SheetBook) -> CoreResult<&mut Sheet> {
        book.repoint_active();
        book.active_mut().ok_or(CoreError::NoActiveSheet)
    }

    /// Sheets ordered by last modification, newest first.
    pub fn list_recent(book: &SheetBook) -> Vec<&Sheet> {
        let mut sheets: Vec<&Sheet> = book.sheets.iter().collect();
        sheets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sheets
    }

    /// Resolves a sheet by exact id, falling back to a case-insensitive name match.
    pub fn resolve<'a>(book: &'a SheetBook, key: &str) -> CoreResult<&'a Sheet> {
        let key = key.trim();
        book.sheet(key)
            .or_else(|| {
                book.sheets
                    .iter()
                    .find(|sheet| sheet.name.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| CoreError::SheetNotFound(key.to_string()))
    }
}
