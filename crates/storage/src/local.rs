use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use thiserror::Error;

/// Key names for the no-LMS fallback, matching the records existing
/// standalone deployments already wrote.
pub mod keys {
    pub const PROGRESS: &str = "nao_progress";
    pub const LOCATION: &str = "nao_location";
    pub const STATUS: &str = "nao_status";
    pub const SUSPEND_DATA: &str = "nao_suspend_data";
}

/// Errors surfaced by local stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Browser-localStorage-shaped store: plain string keys to plain string
/// values. The disconnected persistence path writes here.
pub trait LocalStore: Send + Sync {
    /// Read a key, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

//
// ─── MEMORY STORE ──────────────────────────────────────────────────────────────
//

/// In-memory store for tests and throwaway runs.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

//
// ─── FILE STORE ────────────────────────────────────────────────────────────────
//

/// Write-through store backed by a single JSON object file.
///
/// Loaded once on open; a missing or malformed file starts empty. Every
/// write rewrites the whole file, which is fine at four small keys.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl FileStore {
    /// Open (or create on first write) the store at `path`, creating
    /// parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if parent directories cannot be created
    /// or an existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let entries = Self::load(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn load(path: &Path) -> Result<Map<String, Value>, StorageError> {
        if !path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(path)?;
        // Malformed content is treated as absent data, as everywhere else
        // in the persistence layer.
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn flush(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(&Value::Object(entries.clone()))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        guard.insert(key.to_string(), Value::String(value.to_string()));
        self.flush(&guard)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        if guard.remove(key).is_some() {
            return self.flush(&guard);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::PROGRESS).unwrap(), None);
        store.set(keys::PROGRESS, "{\"completedUnits\":[1]}").unwrap();
        assert_eq!(
            store.get(keys::PROGRESS).unwrap().as_deref(),
            Some("{\"completedUnits\":[1]}")
        );
        store.remove(keys::PROGRESS).unwrap();
        assert_eq!(store.get(keys::PROGRESS).unwrap(), None);
    }

    #[test]
    fn removing_an_absent_key_is_fine() {
        let store = MemoryStore::new();
        store.remove("nope").unwrap();
    }
}
