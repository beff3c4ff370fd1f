//! Preference store: in-memory cache with write-behind persistence.
//!
//! DESIGN
//! ======
//! Reads and writes hit the cache synchronously. Every mutation is queued to
//! a single background writer, which applies them in submission order (so
//! the last write per key wins on disk too) and retries transient failures.
//!
//! DURABLE LAYOUT
//! ==============
//! Each key is its own item, `"{namespace}:{key}"`, holding JSON. The item
//! named exactly `namespace` is a manifest listing persisted keys, so
//! hydration can find them through a plain get/set/remove backend. Values are
//! written before the manifest. A crash in between loses at most that one
//! write; entries for other keys are never rewritten.
//!
//! If the manifest cannot be read, edits to it are held back and merged on
//! the next successful read (at the latest on `flush`). A manifest that
//! fails to decode is left alone and reported once at `error`.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures are logged and dropped after retries. The cached value
//! stays authoritative for the rest of the process lifetime.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::storage::KeyValueStorage;
use crate::config::PrefWriteConfig;
use crate::error::{ErrorCode, StorageError};
use crate::util::lock;

/// One cache mutation, as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefChange {
    pub key: String,
    /// New value, or `None` when the key was removed.
    pub value: Option<Value>,
}

#[derive(Debug)]
enum WriteOp {
    Put { key: String, raw: String },
    Remove { key: String },
    Flush(oneshot::Sender<()>),
}

#[derive(Default)]
struct CacheState {
    values: HashMap<String, Value>,
    /// Keys set or removed in memory this session; hydration must not
    /// override them.
    touched: HashSet<String>,
    hydrated: bool,
}

/// Shared handle to one persisted preference slice.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<PrefInner>,
}

struct PrefInner {
    namespace: String,
    storage: Arc<dyn KeyValueStorage>,
    cache: Mutex<CacheState>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<PrefChange>>>,
    writes: mpsc::UnboundedSender<WriteOp>,
}

impl PreferenceStore {
    /// Build a store over `storage` and spawn its writer task.
    ///
    /// The writer exits once every handle to the store is dropped and the
    /// queue has drained.
    pub fn start(
        storage: Arc<dyn KeyValueStorage>,
        namespace: impl Into<String>,
        config: PrefWriteConfig,
    ) -> (Self, JoinHandle<()>) {
        let namespace = namespace.into();
        let (tx, rx) = mpsc::unbounded_channel();
        // Every write gets at least one attempt.
        let config = PrefWriteConfig { retries: config.retries.max(1), ..config };
        let writer = Writer {
            storage: storage.clone(),
            namespace: namespace.clone(),
            config,
            manifest: None,
            pending: BTreeMap::new(),
            corrupt_reported: false,
        };
        let task = tokio::spawn(writer.run(rx));

        info!(
            %namespace,
            retries = config.retries,
            retry_base_ms = config.retry_base_ms,
            "preference writer configured"
        );

        let inner = PrefInner {
            namespace,
            storage,
            cache: Mutex::new(CacheState::default()),
            listeners: Mutex::new(Vec::new()),
            writes: tx,
        };
        (Self { inner: Arc::new(inner) }, task)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Cached value for `key`. Absent until set this session or hydrated.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        lock(&self.inner.cache).values.get(key).cloned()
    }

    /// Cached string value; `None` if absent or not a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Cached value decoded into `T`; `None` if absent or of another shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.get(key)?).ok()
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        lock(&self.inner.cache).hydrated
    }

    /// Update the cache now and schedule the durable write.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let raw = value.to_string();
        {
            let mut cache = lock(&self.inner.cache);
            cache.values.insert(key.to_string(), value.clone());
            cache.touched.insert(key.to_string());
        }
        self.notify(PrefChange { key: key.to_string(), value: Some(value) });
        self.enqueue(WriteOp::Put { key: key.to_string(), raw });
    }

    /// Serialize `value` and [`Self::set`] it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Encode` if `value` cannot be represented as JSON;
    /// nothing is cached in that case.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value =
            serde_json::to_value(value).map_err(|source| StorageError::Encode { key: key.to_string(), source })?;
        self.set(key, value);
        Ok(())
    }

    /// Drop `key` from the cache now and schedule the durable removal.
    pub fn remove(&self, key: &str) {
        let existed = {
            let mut cache = lock(&self.inner.cache);
            cache.touched.insert(key.to_string());
            cache.values.remove(key).is_some()
        };
        if existed {
            self.notify(PrefChange { key: key.to_string(), value: None });
        }
        self.enqueue(WriteOp::Remove { key: key.to_string() });
    }

    /// Register for every future cache mutation.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<PrefChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.listeners).push(tx);
        rx
    }

    /// Hydrate the cache from durable storage. Runs once; later calls return
    /// immediately.
    ///
    /// Keys already set or removed this session keep their in-memory state.
    /// Individual entries that fail to decode are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the manifest or an item cannot be read,
    /// or `StorageError::Decode` if the manifest is corrupt. The cache stays
    /// usable either way.
    pub async fn load_all(&self) -> Result<(), StorageError> {
        if self.is_hydrated() {
            debug!(namespace = %self.inner.namespace, "preferences already hydrated");
            return Ok(());
        }

        let keys = read_manifest(self.inner.storage.as_ref(), &self.inner.namespace)
            .await
            .inspect_err(|e| warn!(error = %e, code = e.error_code(), "preference manifest read failed"))?;

        let mut loaded = Vec::with_capacity(keys.len());
        for key in keys {
            let item = item_key(&self.inner.namespace, &key);
            let Some(raw) = self
                .inner
                .storage
                .get_item(&item)
                .await
                .inspect_err(|e| warn!(error = %e, %key, "preference read failed"))?
            else {
                continue;
            };
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => loaded.push((key, value)),
                Err(e) => warn!(error = %e, %key, "skipping undecodable preference"),
            }
        }

        let mut changes = Vec::new();
        {
            let mut cache = lock(&self.inner.cache);
            for (key, value) in loaded {
                // EDGE: a write made during hydration is newer than disk.
                if cache.touched.contains(&key) {
                    continue;
                }
                cache.values.insert(key.clone(), value.clone());
                changes.push(PrefChange { key, value: Some(value) });
            }
            cache.hydrated = true;
        }

        info!(namespace = %self.inner.namespace, keys = changes.len(), "preferences hydrated");
        for change in changes {
            self.notify(change);
        }
        Ok(())
    }

    /// Wait until every write queued so far has been attempted.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.enqueue(WriteOp::Flush(tx));
        if rx.await.is_err() {
            warn!("preference writer gone before flush completed");
        }
    }

    fn enqueue(&self, op: WriteOp) {
        if let Err(e) = self.inner.writes.send(op) {
            warn!(op = ?e.0, "preference writer closed; write stays in memory only");
        }
    }

    fn notify(&self, change: PrefChange) {
        lock(&self.inner.listeners).retain(|tx| tx.send(change.clone()).is_ok());
    }
}

fn item_key(namespace: &str, key: &str) -> String {
    format!("{namespace}:{key}")
}

async fn read_manifest(storage: &dyn KeyValueStorage, namespace: &str) -> Result<BTreeSet<String>, StorageError> {
    match storage.get_item(namespace).await? {
        Some(raw) => {
            serde_json::from_str(&raw).map_err(|source| StorageError::Decode { key: namespace.to_string(), source })
        }
        None => Ok(BTreeSet::new()),
    }
}

// =============================================================================
// WRITER
// =============================================================================

struct Writer {
    storage: Arc<dyn KeyValueStorage>,
    namespace: String,
    config: PrefWriteConfig,
    /// Durable key list as last read or written; `None` until known.
    manifest: Option<BTreeSet<String>>,
    /// Manifest edits made while the manifest was unreadable, keyed by
    /// preference key (`true` = present). Merged on the next good read.
    pending: BTreeMap<String, bool>,
    corrupt_reported: bool,
}

impl Writer {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
        let mut manifest_dirty = false;
        while let Some(op) = rx.recv().await {
            match op {
                WriteOp::Put { key, raw } => {
                    let item = item_key(&self.namespace, &key);
                    // Value first, manifest second.
                    if self.with_retry(&key, || self.storage.set_item(&item, &raw)).await {
                        manifest_dirty |= self.manifest_update(key, true).await;
                    }
                }
                WriteOp::Remove { key } => {
                    let item = item_key(&self.namespace, &key);
                    manifest_dirty |= self.manifest_update(key.clone(), false).await;
                    if manifest_dirty {
                        manifest_dirty = !self.write_manifest().await;
                    }
                    if !self.with_retry(&key, || self.storage.remove_item(&item)).await {
                        debug!(%key, "preference item left in storage after removal");
                    }
                }
                WriteOp::Flush(done) => {
                    if !self.pending.is_empty() {
                        manifest_dirty |= self.load_manifest().await.unwrap_or(false);
                    }
                    if manifest_dirty {
                        manifest_dirty = !self.write_manifest().await;
                    }
                    if done.send(()).is_err() {
                        debug!("flush waiter dropped");
                    }
                    continue;
                }
            }
            if manifest_dirty {
                manifest_dirty = !self.write_manifest().await;
            }
        }
        debug!(namespace = %self.namespace, "preference writer exiting");
    }

    /// Record `key` as present or absent in the manifest. Returns whether the
    /// manifest now differs from storage.
    async fn manifest_update(&mut self, key: String, present: bool) -> bool {
        let Some(merged) = self.load_manifest().await else {
            self.pending.insert(key, present);
            return false;
        };
        let Some(keys) = self.manifest.as_mut() else {
            return merged;
        };
        let changed = if present { keys.insert(key) } else { keys.remove(&key) };
        merged || changed
    }

    /// Make sure the manifest is in memory, reading it with retries if not.
    ///
    /// Returns `None` while it cannot be read, otherwise whether deferred
    /// edits were merged into it.
    async fn load_manifest(&mut self) -> Option<bool> {
        if self.manifest.is_some() {
            return Some(false);
        }
        let retries = self.config.retries.max(1);
        for attempt in 1..=retries {
            match read_manifest(self.storage.as_ref(), &self.namespace).await {
                Ok(mut keys) => {
                    let merged = !self.pending.is_empty();
                    for (key, present) in std::mem::take(&mut self.pending) {
                        if present {
                            keys.insert(key);
                        } else {
                            keys.remove(&key);
                        }
                    }
                    self.manifest = Some(keys);
                    return Some(merged);
                }
                Err(e) if e.retryable() && attempt < retries => {
                    warn!(error = %e, attempt, total = retries, "preference manifest read failed; retrying");
                    tokio::time::sleep(Duration::from_millis((attempt as u64) * self.config.retry_base_ms)).await;
                }
                Err(e @ StorageError::Decode { .. }) => {
                    // EDGE: never overwrite a manifest we could not read.
                    if !self.corrupt_reported {
                        error!(
                            error = %e,
                            namespace = %self.namespace,
                            "preference manifest is corrupt; new keys will not persist until it is repaired"
                        );
                        self.corrupt_reported = true;
                    }
                    return None;
                }
                Err(e) => {
                    warn!(error = %e, code = e.error_code(), "preference manifest unreadable; deferring manifest update");
                    return None;
                }
            }
        }
        None
    }

    /// Returns `true` once the manifest is durable.
    async fn write_manifest(&self) -> bool {
        let Some(keys) = &self.manifest else {
            return true;
        };
        let raw = match serde_json::to_string(keys) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "preference manifest encode failed");
                return false;
            }
        };
        self.with_retry(&self.namespace, || self.storage.set_item(&self.namespace, &raw))
            .await
    }

    async fn with_retry<F, Fut>(&self, key: &str, mut op: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), StorageError>>,
    {
        for attempt in 1..=self.config.retries {
            match op().await {
                Ok(()) => return true,
                Err(e) if attempt < self.config.retries => {
                    warn!(
                        error = %e,
                        key,
                        attempt,
                        total = self.config.retries,
                        "preference write failed; retrying"
                    );
                    tokio::time::sleep(Duration::from_millis((attempt as u64) * self.config.retry_base_ms)).await;
                }
                Err(e) => {
                    warn!(error = %e, key, code = e.error_code(), "preference write failed after retries; dropping");
                    return false;
                }
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
