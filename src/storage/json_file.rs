use super::{KeyValueBackend, StorageError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value storage kept in a single JSON object file.
///
/// The whole file is rewritten on every change.
pub struct JsonFileBackend {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl JsonFileBackend {
    /// Open the file at `path`, starting empty if it doesn't exist.
    /// An unreadable document is treated as empty and replaced on next write.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("Discarding unreadable store {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        log::info!("Preference store opened at {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            entries: RefCell::new(entries),
        })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(&*self.entries.borrow())?;
        fs::write(&self.path, contents)?;
        log::debug!("Preference store saved to {:?}", self.path);
        Ok(())
    }
}

impl KeyValueBackend for JsonFileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.entries.borrow_mut().remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
