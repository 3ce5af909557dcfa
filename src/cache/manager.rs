//! Durable storage for the horoscope cache
//!
//! Persists the whole [`CacheStore`] as a single JSON snapshot on disk. The
//! snapshot is written after every mutation and reloaded before each
//! synchronization pass, keeping the in-memory and durable copies coherent at
//! whole-store granularity. An unreadable or missing file degrades to an
//! empty, fully-slotted store rather than an error.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::{info, warn};

use crate::store::CacheStore;

/// File name of the snapshot inside the data directory
const SNAPSHOT_FILE: &str = "horoscopes.json";

/// Manages reading and writing the cache store snapshot on disk
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Path of the snapshot file
    path: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using an XDG-compliant data directory
    ///
    /// Uses `~/.local/share/horocache/` on Linux, or the equivalent path on
    /// other platforms. Returns `None` if the data directory cannot be
    /// determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "horocache")?;
        let path = project_dirs.data_dir().join(SNAPSHOT_FILE);
        Some(Self { path })
    }

    /// Creates a new CacheManager with a custom snapshot path
    ///
    /// Useful for testing or when a specific data location is needed.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Ensures the parent directory of the snapshot exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(dir) => fs::create_dir_all(dir),
            None => Ok(()),
        }
    }

    /// Loads the snapshot from disk
    ///
    /// Returns an empty, fully-slotted store if the file is missing or
    /// cannot be parsed; persistence failures never propagate.
    pub fn load(&self) -> CacheStore {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, starting empty");
                return CacheStore::with_shape();
            }
        };
        match serde_json::from_str(&content) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unparsable, starting empty");
                CacheStore::with_shape()
            }
        }
    }

    /// Writes the snapshot to disk
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation, serialization, or writing fails
    pub fn write(&self, store: &CacheStore) -> std::io::Result<()> {
        self.ensure_dir()?;

        let json = serde_json::to_string_pretty(store)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        info!(path = %self.path.display(), "writing snapshot");
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RelativeDay, Sign, Source, Style};
    use crate::store::DayEntry;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_manager() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let manager = CacheManager::with_path(temp_dir.path().join(SNAPSHOT_FILE));
        (manager, temp_dir)
    }

    #[test]
    fn test_load_missing_file_returns_shaped_store() {
        let (manager, _temp_dir) = create_test_manager();
        let store = manager.load();
        assert!(store.is_fully_populated());
        assert!(store.is_unfetched());
    }

    #[test]
    fn test_write_then_load_round_trips() {
        let (manager, _temp_dir) = create_test_manager();

        let mut store = CacheStore::with_shape();
        let mut entry = DayEntry::empty();
        entry.date = NaiveDate::from_ymd_opt(2024, 7, 16);
        entry
            .signs
            .insert(Sign::Aries, "A bold start to the day.".to_string());
        store.put_day(Source::AstrologyCom, Style::Daily, RelativeDay::Today, entry);

        manager.write(&store).expect("Write should succeed");
        let loaded = manager.load();

        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_corrupt_file_returns_shaped_store() {
        let (manager, temp_dir) = create_test_manager();
        std::fs::write(temp_dir.path().join(SNAPSHOT_FILE), "{ not json").unwrap();

        let store = manager.load();
        assert!(store.is_fully_populated());
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir
            .path()
            .join("nested")
            .join("data")
            .join(SNAPSHOT_FILE);
        let manager = CacheManager::with_path(nested.clone());

        manager
            .write(&CacheStore::with_shape())
            .expect("Write should succeed");

        assert!(nested.exists(), "Snapshot file should exist");
    }

    #[test]
    fn test_overwrite_existing_snapshot() {
        let (manager, _temp_dir) = create_test_manager();

        let first = CacheStore::with_shape();
        manager.write(&first).expect("First write should succeed");

        let mut second = CacheStore::with_shape();
        let mut entry = DayEntry::empty();
        entry.signs.insert(Sign::Leo, "Latest data.".to_string());
        second.put_day(
            Source::HoroscopeCom,
            Style::DailyLove,
            RelativeDay::Tomorrow,
            entry,
        );
        manager.write(&second).expect("Second write should succeed");

        assert_eq!(manager.load(), second);
    }
}
