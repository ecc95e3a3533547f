//! Persisted key-value store.
//!
//! A thin JSON layer over a durable string-keyed medium. Reads never fail:
//! a missing, corrupt or unreachable value yields the caller's default.
//! Writes never fail either: the caller keeps its in-memory value and the
//! failed write is logged.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Storage keys owned by this application.
pub mod keys {
    pub const HAZARD_MARKERS: &str = "accidentMarkers";
    pub const SAFE_PLACE_MARKERS: &str = "safePlaceMarkers";
    pub const SAVED_ROUTES: &str = "savedRoutes";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse stored data for '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A durable string-to-string medium, the local-storage analogue.
pub trait StorageBackend {
    /// # Errors
    ///
    /// Returns `StoreError` when the medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError` when the medium cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError` when the medium cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process medium. Clones share the same map, so a second store opened
/// on a clone sees everything the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.items
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage lock poisoned".to_string()))
    }

    /// Write a raw string, bypassing serialization. Used to seed corrupt or
    /// legacy data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the lock is poisoned.
    pub fn insert_raw(&self, key: &str, raw: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), raw.to_string());
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// One JSON object file holding every key. Each write rewrites the file
/// through a temporary sibling and a rename, so a crash mid-write leaves the
/// previous contents intact.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Deserialize {
            key: self.path.display().to_string(),
            source,
        })
    }

    fn write_all(&self, items: &HashMap<String, String>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(items).map_err(|source| StoreError::Serialize {
            key: self.path.display().to_string(),
            source,
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        let mut file = File::create(&tmp_path).map_err(|e| self.io_err(e))?;
        file.write_all(&data).map_err(|e| self.io_err(e))?;
        file.sync_all().map_err(|e| self.io_err(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Medium that refuses every operation, as when storage is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl StorageBackend for UnavailableBackend {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }
}

pub struct KvStore {
    backend: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore").finish_non_exhaustive()
    }
}

impl KvStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Parsed value under `key`, or `default` when absent, corrupt or the
    /// medium is unreachable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.read_raw(key) else {
            return default;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(source) => {
                let e = StoreError::Deserialize {
                    key: key.to_string(),
                    source,
                };
                tracing::warn!(key, error = %e, "stored value is corrupt; using default");
                default
            }
        }
    }

    /// Stored JSON array under `key`, decoded record by record. Records that
    /// fail to decode are dropped one at a time so their siblings survive;
    /// a value that is not an array at all yields an empty list.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let records: Vec<serde_json::Value> = self.get(key, Vec::new());
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(value) => Some(value),
                Err(source) => {
                    let e = StoreError::Deserialize {
                        key: key.to_string(),
                        source,
                    };
                    tracing::warn!(key, index, error = %e, "dropping corrupt stored record");
                    None
                }
            })
            .collect()
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed; using default");
                None
            }
        }
    }

    /// Serialize and write `value`. Returns whether the write reached the
    /// medium; failures are logged, never raised.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(source) => {
                let e = StoreError::Serialize {
                    key: key.to_string(),
                    source,
                };
                tracing::warn!(key, error = %e, "value not persisted");
                return false;
            }
        };

        match self.backend.set_item(key, &raw) {
            Ok(()) => {
                tracing::debug!(key, bytes = raw.len(), "persisted value");
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "value not persisted");
                false
            }
        }
    }

    /// Drop `key` from the medium. Failures are logged.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to remove stored value");
                false
            }
        }
    }
}

/// An in-memory value mirrored to one store key. The in-memory copy is the
/// source of truth for the session; it changes even when the write fails.
#[derive(Debug, Clone)]
pub struct Persisted<T> {
    key: &'static str,
    value: T,
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    pub fn load(store: &KvStore, key: &'static str, default: T) -> Self {
        Self {
            key,
            value: store.get(key, default),
        }
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Mutate, then persist the whole value.
    pub fn update<R>(&mut self, store: &mut KvStore, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.value);
        store.set(self.key, &self.value);
        out
    }
}

impl<T: Serialize + DeserializeOwned> Persisted<Vec<T>> {
    /// Like [`Persisted::load`] for collections, keeping every record that
    /// still decodes.
    pub fn load_list(store: &KvStore, key: &'static str) -> Self {
        Self {
            key,
            value: store.get_list(key),
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
