//! Durable key-value backends for the preference store.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the async `getItem` / `setItem` / `removeItem` surface of mobile
//! key-value storage. Items are independent: writing one never touches
//! another, which is what keeps committed keys intact across a crash.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::error::StorageError;
use crate::util::{bytes_to_hex, lock};

#[async_trait::async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key succeeds.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage. Clones share the same items, so a clone handed to
/// a fresh store after dropping the old one behaves like a restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw item as persisted, bypassing the failure switch.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory storage switched off".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(lock(&self.items).get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        lock(&self.items).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        lock(&self.items).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// One file per item under a directory.
///
/// File names are the hex-encoded key, so any key is a valid name. Writes go
/// to a temp file first and are renamed into place; a crash mid-write leaves
/// the previous value untouched.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.item", bytes_to_hex(key.as_bytes())))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io { key: key.to_string(), source }
}

#[async_trait::async_trait]
impl KeyValueStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.item_path(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let path = self.item_path(key);
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, value)
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.item_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
