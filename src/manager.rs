//! Owns the mutable sheet book and its load/save lifecycle.

use std::path::{Path, PathBuf};

use stockbook_core::{
    compute_ledger, reconcile,
    storage::{BackupInfo, BookStorage, LoadReport},
    Clock, CoreError, CoreResult, ProductDraft, ProductEdit, ProductService, SaleDraft,
    SaleService, SheetService,
};
use stockbook_domain::{ComputedLedger, Product, ReconciliationReport, Sale, Sheet, SheetBook};

/// Outcome of loading the book from storage.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub path: PathBuf,
}

/// Facade over a [`SheetBook`] plus the storage it persists to.
///
/// Every mutation runs against a clone of the book. The clone is saved and only
/// then becomes the current book, so a rejected change or a failed write leaves
/// the in-memory state untouched.
pub struct BookManager {
    book: SheetBook,
    storage: Box<dyn BookStorage>,
    clock: Box<dyn Clock>,
}

impl BookManager {
    pub fn new(storage: Box<dyn BookStorage>, clock: Box<dyn Clock>) -> Self {
        Self {
            book: SheetBook::new(clock.now()),
            storage,
            clock,
        }
    }

    pub fn book(&self) -> &SheetBook {
        &self.book
    }

    pub fn book_path(&self) -> PathBuf {
        self.storage.book_path()
    }

    /// Replaces the current book with the stored one.
    pub fn load(&mut self) -> CoreResult<LoadMetadata> {
        let report = self.storage.load_book(self.clock.as_ref())?;
        Ok(self.apply_load(report))
    }

    pub fn active_sheet(&self) -> CoreResult<&Sheet> {
        SheetService::active(&self.book)
    }

    pub fn active_ledger(&self) -> CoreResult<ComputedLedger<'_>> {
        Ok(compute_ledger(self.active_sheet()?))
    }

    pub fn system_check(&self) -> CoreResult<ReconciliationReport> {
        Ok(reconcile(&self.active_ledger()?))
    }

    pub fn recent_sheets(&self) -> Vec<&Sheet> {
        SheetService::list_recent(&self.book)
    }

    /// Applies `change` to a working copy of the book, persists it, then commits it.
    pub fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut SheetBook, &dyn Clock) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let mut working = self.book.clone();
        let outcome = change(&mut working, self.clock.as_ref())?;
        working.ensure_active(self.clock.now());
        self.storage.save_book(&working)?;
        self.book = working;
        Ok(outcome)
    }

    /// Like [`BookManager::mutate`], scoped to the active sheet.
    pub fn mutate_active<T>(
        &mut self,
        change: impl FnOnce(&mut Sheet, &dyn Clock) -> CoreResult<T>,
    ) -> CoreResult<T> {
        self.mutate(|book, clock| change(SheetService::active_mut(book)?, clock))
    }

    pub fn create_sheet(&mut self, name: &str) -> CoreResult<String> {
        self.mutate(|book, clock| Ok(SheetService::create(book, name, clock)))
    }

    pub fn rename_active_sheet(&mut self, name: &str) -> CoreResult<()> {
        self.mutate(|book, clock| SheetService::rename_active(book, name, clock))
    }

    pub fn delete_active_sheet(&mut self) -> CoreResult<Sheet> {
        self.mutate(|book, clock| SheetService::delete_active(book, clock))
    }

    /// Activates the sheet named or identified by `key`.
    pub fn switch_sheet(&mut self, key: &str) -> CoreResult<String> {
        let id = SheetService::resolve(&self.book, key)?.id.clone();
        self.mutate(|book, _| SheetService::switch(book, &id))?;
        Ok(id)
    }

    pub fn add_product(&mut self, draft: ProductDraft) -> CoreResult<()> {
        self.mutate_active(|sheet, clock| ProductService::add(sheet, draft, clock))
    }

    pub fn edit_product(&mut self, name: &str, edit: ProductEdit) -> CoreResult<()> {
        self.mutate_active(|sheet, clock| {
            let index = ProductService::index_of(sheet, name)?;
            ProductService::edit(sheet, index, edit, clock)
        })
    }

    pub fn delete_product(&mut self, name: &str) -> CoreResult<Product> {
        self.mutate_active(|sheet, clock| {
            let index = ProductService::index_of(sheet, name)?;
            ProductService::remove(sheet, index, clock)
        })
    }

    pub fn add_sale(&mut self, draft: SaleDraft) -> CoreResult<Sale> {
        self.mutate_active(|sheet, clock| {
            let id = SaleService::add(sheet, draft, clock)?;
            sheet
                .sale(&id)
                .cloned()
                .ok_or(CoreError::SaleNotFound(id))
        })
    }

    /// Deletes the sale whose id equals `key` or, failing that, starts with it.
    pub fn delete_sale(&mut self, key: &str) -> CoreResult<Sale> {
        let id = self.resolve_sale_id(key)?;
        self.mutate_active(|sheet, clock| SaleService::remove(sheet, &id, clock))
    }

    pub fn backup(&self, note: Option<&str>) -> CoreResult<BackupInfo> {
        self.storage.backup_book(note)
    }

    pub fn list_backups(&self) -> CoreResult<Vec<BackupInfo>> {
        self.storage.list_backups()
    }

    pub fn restore_backup(&mut self, backup: &BackupInfo) -> CoreResult<LoadMetadata> {
        let report = self.storage.restore_backup(backup, self.clock.as_ref())?;
        Ok(self.apply_load(report))
    }

    pub fn delete_backup(&self, backup: &BackupInfo) -> CoreResult<()> {
        self.storage.delete_backup(backup)
    }

    pub fn export(&self, path: &Path) -> CoreResult<()> {
        self.storage.save_book_to_path(&self.book, path)
    }

    /// Replaces the whole book with the one read from `path` and persists it.
    pub fn import(&mut self, path: &Path) -> CoreResult<LoadMetadata> {
        let report = self.storage.load_book_from_path(path, self.clock.as_ref())?;
        let mut book = report.book;
        book.ensure_active(self.clock.now());
        self.storage.save_book(&book)?;
        self.book = book;
        tracing::info!(path = %path.display(), "imported sheet book");
        Ok(LoadMetadata {
            warnings: report.warnings,
            path: report.path,
        })
    }

    fn resolve_sale_id(&self, key: &str) -> CoreResult<String> {
        let key = key.trim();
        let sheet = self.active_sheet()?;
        if sheet.sale(key).is_some() {
            return Ok(key.to_string());
        }
        let mut matches = sheet
            .sales
            .iter()
            .filter(|sale| !key.is_empty() && sale.id.starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(sale), None) => Ok(sale.id.clone()),
            (Some(_), Some(_)) => Err(CoreError::Validation(format!(
                "Sale id `{key}` is ambiguous; type more characters."
            ))),
            _ => Err(CoreError::SaleNotFound(key.to_string())),
        }
    }

    fn apply_load(&mut self, report: LoadReport) -> LoadMetadata {
        let LoadReport {
            mut book,
            warnings,
            path,
        } = report;
        book.ensure_active(self.clock.now());
        self.book = book;
        tracing::info!(path = %path.display(), sheets = self.book.sheets.len(), "loaded sheet book");
        LoadMetadata { warnings, path }
    }
}
