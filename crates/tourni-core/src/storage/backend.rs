use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Session file name in the data directory
pub const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable")]
    Unavailable,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String-keyed durable storage.
///
/// Values are opaque strings; encoding decisions belong to `PersistedStore`.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    /// Remove several keys as one unit.
    fn remove_items(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        for key in keys {
            self.remove_item(key)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError>;
}

// ============================================================================
// File-backed storage
// ============================================================================

/// Storage backed by a single JSON object file.
///
/// The file is read once on open and rewritten after every mutation.
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// A missing file is an empty store. A corrupt file is logged and also
    /// treated as empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session storage, starting empty");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "Session storage opened");
        Self { path, entries }
    }

    /// Open `session.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn remove_items(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        let before = self.entries.len();
        for key in keys {
            self.entries.remove(*key);
        }
        if self.entries.len() != before {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ============================================================================
// In-memory storage
// ============================================================================

/// In-process storage. `unavailable()` builds one that rejects every call,
/// which is how disabled or full storage looks to callers.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    available: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            entries: BTreeMap::new(),
            available: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.check()?;
        self.entries.clear();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::in_dir(dir.path());
        storage.set_item("jwt", "abc.def.ghi").unwrap();

        let reopened = FileStorage::in_dir(dir.path());
        assert_eq!(reopened.get_item("jwt").unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_file_storage_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join(SESSION_FILE);
        let mut storage = FileStorage::open(&path);
        storage.set_item("username", "bob").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_file_storage_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SESSION_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let mut storage = FileStorage::open(&path);
        assert_eq!(storage.get_item("jwt").unwrap(), None);

        // Next write replaces the corrupt file
        storage.set_item("jwt", "T1").unwrap();
        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get_item("jwt").unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn test_file_storage_remove_items_keeps_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::in_dir(dir.path());
        storage.set_item("jwt", "T1").unwrap();
        storage.set_item("role", "[\"ADMIN\"]").unwrap();
        storage.set_item("theme", "dark").unwrap();

        storage.remove_items(&["jwt", "role"]).unwrap();

        let reopened = FileStorage::in_dir(dir.path());
        assert_eq!(reopened.get_item("jwt").unwrap(), None);
        assert_eq!(reopened.get_item("role").unwrap(), None);
        assert_eq!(reopened.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::in_dir(dir.path());
        storage.set_item("jwt", "T1").unwrap();
        storage.clear().unwrap();
        assert!(!storage.path().exists());
        assert_eq!(storage.get_item("jwt").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_unavailable_rejects_everything() {
        let mut storage = MemoryStorage::unavailable();
        assert!(matches!(storage.get_item("jwt"), Err(StorageError::Unavailable)));
        assert!(storage.set_item("jwt", "T1").is_err());
        assert!(storage.remove_item("jwt").is_err());
        assert!(storage.clear().is_err());
    }
}
