//! Key-value persistence for cart state.
//!
//! The store mirrors browser local storage: string keys, string values,
//! synchronous access, and every write replaces the previous value.
//!
//! - [`MemoryStore`] keeps entries in process memory (tests, ephemeral runs)
//! - [`FileStore`] keeps entries in one JSON object file on the local device

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;

/// Errors raised by a [`PersistenceStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The entries could not be encoded for writing.
    #[error("Failed to encode store file {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A lock guarding the entries was poisoned by a panicking writer.
    #[error("Store lock poisoned")]
    Poisoned,
}

/// String-keyed, string-valued durable storage.
pub trait PersistenceStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file.
///
/// Entries are loaded once on open and the whole map is rewritten on every
/// change. Writes go to a sibling temp file first and are renamed over the
/// target so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// File name used inside the data directory.
    pub const FILE_NAME: &'static str = "local-storage.json";

    /// Suffix given to a backing file that could not be parsed.
    pub const CORRUPT_SUFFIX: &'static str = "corrupt";

    /// Open the store file inside `data_dir`, creating the directory if needed.
    ///
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is moved aside to `local-storage.json.corrupt` and the store
    /// starts empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created or the file
    /// cannot be read.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let path = data_dir.join(Self::FILE_NAME);

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                Self::quarantine(&path, &e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened file store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Move an unparseable backing file out of the way.
    fn quarantine(path: &Path, error: &serde_json::Error) {
        let aside = path.with_extension(format!("json.{}", Self::CORRUPT_SUFFIX));
        match fs::rename(path, &aside) {
            Ok(()) => tracing::warn!(
                path = %path.display(),
                moved_to = %aside.display(),
                error = %error,
                "Corrupt store file moved aside, starting empty"
            ),
            Err(rename_error) => tracing::warn!(
                path = %path.display(),
                error = %error,
                rename_error = %rename_error,
                "Corrupt store file could not be moved aside, starting empty"
            ),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Encode {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.set("cart", "[]").unwrap();
            store.set("total", "0").unwrap();
            store.remove("total").unwrap();
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get("total").unwrap(), None);
    }

    #[test]
    fn test_file_store_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let store = FileStore::open(&nested).unwrap();
        store.set("k", "v").unwrap();

        assert!(nested.join(FileStore::FILE_NAME).exists());
    }

    #[test]
    fn test_file_store_moves_corrupt_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FileStore::FILE_NAME);
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!path.exists());
        let aside = dir.path().join("local-storage.json.corrupt");
        assert_eq!(fs::read_to_string(aside).unwrap(), "{not json");

        store.set("k", "v").unwrap();
        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_non_string_values_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FileStore::FILE_NAME),
            r#"{"bespoke_baby.cart.total": 5}"#,
        )
        .unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("bespoke_baby.cart.total").unwrap(), None);
    }

    #[test]
    fn test_file_store_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FileStore::FILE_NAME), "").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }
}
