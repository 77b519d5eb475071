//! Durable key-value storage for client-side snapshots.
//!
//! The cart synchronizer and product cache persist whole snapshots as JSON
//! strings under well-known keys. Persistence is best-effort: the
//! [`load_json`], [`save_json`] and [`remove`] helpers log failures and
//! degrade instead of propagating them.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Key of the cart snapshot.
pub const CART_KEY: &str = "medusa_cart";

/// Key of the full product map.
pub const PRODUCTS_KEY: &str = "productsCache";

/// Errors raised by a [`DurableStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read '{key}': {message}")]
    Read { key: String, message: String },

    #[error("failed to write '{key}': {message}")]
    Write { key: String, message: String },

    #[error("failed to parse '{key}': {message}")]
    Parse { key: String, message: String },
}

/// A synchronous string key-value store that survives restarts.
///
/// Object-safe so one process can mix file-backed and in-memory stores.
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Read` if the backing medium fails.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Write` if the backing medium fails.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Write` if the backing medium fails.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: DurableStore + ?Sized> DurableStore for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// A store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl DurableStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Write to a uniquely named sibling and rename so readers never see a
        // torn value and concurrent writers never share a temp file
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(value.as_bytes()).map_err(write_err)?;
        tmp.persist(self.path_for(key))
            .map_err(|e| write_err(e.error))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Process-local store, used in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(|e| StorageError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        items.remove(key);
        Ok(())
    }
}

// =============================================================================
// Best-effort helpers
// =============================================================================

/// Read and decode a JSON value.
///
/// # Errors
///
/// Returns `StorageError::Read` or `StorageError::Parse`.
pub fn try_load_json<T: DeserializeOwned>(
    store: &dyn DurableStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    store
        .get_item(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|e| StorageError::Parse {
                key: key.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

/// Read and decode a JSON value, logging and returning `None` on failure.
pub fn load_json<T: DeserializeOwned>(store: &dyn DurableStore, key: &str) -> Option<T> {
    try_load_json(store, key).unwrap_or_else(|e| {
        warn!(error = %e, key, "Ignoring unreadable durable snapshot");
        None
    })
}

/// Encode and write a JSON value, logging on failure.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn DurableStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(|e| StorageError::Parse {
            key: key.to_string(),
            message: e.to_string(),
        })
        .and_then(|raw| store.set_item(key, &raw));

    if let Err(e) = result {
        warn!(error = %e, key, "Failed to persist durable snapshot");
    }
}

/// Remove a key, logging on failure.
pub fn remove(store: &dyn DurableStore, key: &str) {
    if let Err(e) = store.remove_item(key) {
        warn!(error = %e, key, "Failed to remove durable snapshot");
    }
}
