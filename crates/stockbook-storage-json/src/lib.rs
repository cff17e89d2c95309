use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use stockbook_core::{
    normalizer::normalize_book,
    storage::{BackupInfo, BookStorage, LoadReport},
    Clock, CoreError,
};
use stockbook_domain::SheetBook;

/// File name of the persisted sheet book inside the data directory.
pub const BOOK_FILE_NAME: &str = "bakeryApp.json";
const BOOK_STEM: &str = "bakeryApp";
const BACKUP_DIR_NAME: &str = "backups";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const CORRUPT_NOTE: &str = "corrupt";
pub const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for the sheet book and its backups.
#[derive(Debug, Clone)]
pub struct JsonBookStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonBookStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(data_dir: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let backups_dir = data_dir.join(BACKUP_DIR_NAME);
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    fn read_document(&self, path: &Path, clock: &dyn Clock) -> Result<LoadReport, CoreError> {
        let mut warnings = Vec::new();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no stored sheet book; starting fresh");
                return Ok(LoadReport {
                    book: SheetBook::new(clock.now()),
                    warnings,
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let book = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => normalize_book(&value, clock),
            Err(err) => {
                let backup = self.copy_to_backup(path, Some(CORRUPT_NOTE))?;
                let warning = format!(
                    "Stored data could not be parsed ({err}); a copy was kept at {} and a new book was started.",
                    backup.path.display()
                );
                tracing::warn!(path = %path.display(), error = %err, "recovered from corrupt sheet book");
                warnings.push(warning);
                SheetBook::new(clock.now())
            }
        };

        Ok(LoadReport {
            book,
            warnings,
            path: path.to_path_buf(),
        })
    }

    fn backup_file_name(&self, note: Option<&str>) -> String {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{BOOK_STEM}_{timestamp}");
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        format!("{stem}.{BACKUP_EXTENSION}")
    }

    fn copy_to_backup(&self, source: &Path, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        fs::create_dir_all(&self.backups_dir)?;
        let file_name = self.backup_file_name(note);
        let path = self.backups_dir.join(&file_name);
        fs::copy(source, &path)?;
        self.prune_backups()?;
        Ok(backup_info(file_name, path))
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        let entries = self.list_backups()?;
        for entry in entries.into_iter().skip(self.retention) {
            tracing::debug!(backup = %entry.id, "pruning old backup");
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl BookStorage for JsonBookStorage {
    fn load_book(&self, clock: &dyn Clock) -> Result<LoadReport, CoreError> {
        self.read_document(&self.book_path(), clock)
    }

    /// Writes the book atomically, keeping a backup of the file it replaces.
    fn save_book(&self, book: &SheetBook) -> Result<PathBuf, CoreError> {
        let path = self.book_path();
        if path.exists() {
            self.copy_to_backup(&path, None)?;
        }
        save_book_to_path(book, &path)?;
        tracing::info!(path = %path.display(), sheets = book.sheets.len(), "saved sheet book");
        Ok(path)
    }

    fn book_path(&self) -> PathBuf {
        self.data_dir.join(BOOK_FILE_NAME)
    }

    fn save_book_to_path(&self, book: &SheetBook, path: &Path) -> Result<(), CoreError> {
        save_book_to_path(book, path)
    }

    /// Reads a book from an arbitrary file. Unlike the managed document, an
    /// unparsable file here is an error.
    fn load_book_from_path(&self, path: &Path, clock: &dyn Clock) -> Result<LoadReport, CoreError> {
        let raw = fs::read_to_string(path)?;
        let value: Value =
            serde_json::from_str(&raw).map_err(|err| CoreError::Serde(err.to_string()))?;
        Ok(LoadReport {
            book: normalize_book(&value, clock),
            warnings: Vec::new(),
            path: path.to_path_buf(),
        })
    }

    fn backup_book(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        let path = self.book_path();
        if !path.exists() {
            return Err(CoreError::Storage(
                "nothing to back up yet; save the book first".into(),
            ));
        }
        let info = self.copy_to_backup(&path, note)?;
        tracing::info!(backup = %info.id, "created backup");
        Ok(info)
    }

    /// Backups sorted newest first.
    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(backup_info(file_name.to_string(), path.clone()));
            }
        }
        entries.sort_by(|a, b| {
            Reverse(a.created_at)
                .cmp(&Reverse(b.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    fn restore_backup(&self, backup: &BackupInfo, clock: &dyn Clock) -> Result<LoadReport, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let target = self.book_path();
        let staged = fs::read(&backup.path)?;
        if target.exists() {
            self.copy_to_backup(&target, Some("before-restore"))?;
        }
        let tmp = tmp_path(&target);
        write_atomic(&tmp, &staged)?;
        fs::rename(&tmp, &target)?;
        tracing::info!(backup = %backup.id, "restored backup");
        self.read_document(&target, clock)
    }

    fn delete_backup(&self, backup: &BackupInfo) -> Result<(), CoreError> {
        match fs::remove_file(&backup.path) {
            Ok(()) => {
                tracing::info!(backup = %backup.id, "deleted backup");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

/// Saves a book to an arbitrary path on disk.
pub fn save_book_to_path(book: &SheetBook, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, serialize_book(book)?.as_bytes())?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn backup_info(file_name: String, path: PathBuf) -> BackupInfo {
    let (created_at, note) = parse_backup_name(&file_name);
    BackupInfo {
        id: file_name,
        created_at,
        note,
        path,
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Splits `bakeryApp_YYYYMMDD_HHMMSSmmm[_note].json` into its timestamp and note.
fn parse_backup_name(name: &str) -> (Option<DateTime<Utc>>, Option<String>) {
    let Some(stem) = name.strip_suffix(&format!(".{BACKUP_EXTENSION}")) else {
        return (None, None);
    };
    let mut segments = stem.splitn(4, '_');
    let _prefix = segments.next();
    let date = segments.next().unwrap_or_default();
    let time = segments.next().unwrap_or_default();
    let note = segments.next().map(str::to_string);

    if !is_digits(date, 8) || !is_digits(time, 9) {
        return (None, note);
    }
    let created_at = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S%3f")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    (created_at, note)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

fn serialize_book(book: &SheetBook) -> Result<String, CoreError> {
    serde_json::to_string_pretty(book).map_err(|err| CoreError::Serde(err.to_string()))
}
