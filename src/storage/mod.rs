//! Persistent key-value store for preferences.
//!
//! Values are stored as JSON strings under string keys. The backend is
//! pluggable so preferences don't care whether they live in SQLite, a JSON
//! file or memory.

mod json_file;
mod memory;
mod sqlite;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::config;
use crate::user_config::StorageBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Error type for storage operations
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Database(rusqlite::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Database(e) => write!(f, "Database error: {}", e),
            StorageError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

/// Raw string storage. Each key is written independently; there are no
/// transactions across keys.
pub trait KeyValueBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON view over a backend.
///
/// Reads never fail: a missing or unparsable value yields the caller's
/// default. Writes never fail either; errors are logged and the caller's
/// in-memory value stays authoritative.
pub struct Store {
    backend: Box<dyn KeyValueBackend>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(backend: Box<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// In-memory store, nothing survives the process
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Open the configured backend in `data_dir`, falling back to memory if
    /// it can't be opened.
    pub fn open(kind: StorageBackend, data_dir: &Path) -> Self {
        let opened: Result<Box<dyn KeyValueBackend>, StorageError> = match kind {
            StorageBackend::Sqlite => std::fs::create_dir_all(data_dir)
                .map_err(StorageError::from)
                .and_then(|_| SqliteBackend::open(&data_dir.join(config::STORE_DB)))
                .map(|b| Box::new(b) as Box<dyn KeyValueBackend>),
            StorageBackend::Json => std::fs::create_dir_all(data_dir)
                .map_err(StorageError::from)
                .and_then(|_| JsonFileBackend::open(&data_dir.join(config::STORE_JSON)))
                .map(|b| Box::new(b) as Box<dyn KeyValueBackend>),
            StorageBackend::Memory => Ok(Box::new(MemoryBackend::new())),
        };

        match opened {
            Ok(backend) => Self::new(backend),
            Err(e) => {
                log::error!(
                    "Failed to open {:?} store in {:?}, preferences won't persist: {}",
                    kind,
                    data_dir,
                    e
                );
                Self::in_memory()
            }
        }
    }

    /// Read and decode `key`, or return `default` when absent or corrupt
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                log::warn!("Failed to read '{}': {}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Ignoring corrupt value for '{}': {}", key, e);
                default
            }
        }
    }

    /// Encode and write `value` under `key`, overwriting any previous value
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| self.backend.write(key, &raw));

        if let Err(e) = result {
            log::warn!("Failed to persist '{}': {}", key, e);
        }
    }

    /// Delete `key`
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            log::warn!("Failed to remove '{}': {}", key, e);
        }
    }
}
