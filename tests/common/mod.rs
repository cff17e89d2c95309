#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use stockbook::BookManager;
use stockbook_config::ConfigManager;
use stockbook_core::Clock;
use stockbook_storage_json::JsonBookStorage;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Clock pinned to 2024-01-10 08:00 UTC.
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-10T08:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }
}

/// Creates a unique directory that outlives the calling test.
pub fn test_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated manager (loaded) and config manager backed by a unique directory.
pub fn setup_test_env() -> (BookManager, ConfigManager, PathBuf) {
    let base = test_dir();
    let storage =
        JsonBookStorage::with_retention(base.join("data"), 3).expect("create json storage backend");
    let mut manager = BookManager::new(Box::new(storage), Box::new(FixedClock));
    manager.load().expect("load empty book");
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (manager, config_manager, base)
}
