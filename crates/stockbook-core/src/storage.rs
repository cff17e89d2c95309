use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use stockbook_domain::SheetBook;

use crate::{Clock, CoreError};

/// Describes a persisted backup of the sheet book.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub path: PathBuf,
}

/// A loaded book plus anything the backend had to repair or recover along the way.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub book: SheetBook,
    pub warnings: Vec<String>,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing the sheet book and backups.
///
/// Loading is tolerant: a missing or unreadable document yields a default book and
/// a warning rather than an error. Errors are reserved for I/O failures on write.
pub trait BookStorage: Send + Sync {
    fn load_book(&self, clock: &dyn Clock) -> Result<LoadReport, CoreError>;
    fn save_book(&self, book: &SheetBook) -> Result<PathBuf, CoreError>;
    fn book_path(&self) -> PathBuf;
    fn save_book_to_path(&self, book: &SheetBook, path: &Path) -> Result<(), CoreError>;
    fn load_book_from_path(&self, path: &Path, clock: &dyn Clock) -> Result<LoadReport, CoreError>;
    fn backup_book(&self, note: Option<&str>) -> Result<BackupInfo, CoreError>;
    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &BackupInfo, clock: &dyn Clock) -> Result<LoadReport, CoreError>;
    fn delete_backup(&self, backup: &BackupInfo) -> Result<(), CoreError>;
}
