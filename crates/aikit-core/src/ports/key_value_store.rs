//! Key-value store port.
//!
//! The embedding platform persists small strings (the last-loaded model
//! path, the external-sync flag) in whatever store it has. Implementations
//! handle all storage details internally; core only sees key → string.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

/// Well-known keys shared with the embedding application.
pub mod keys {
    /// Path of the last successfully loaded model.
    pub const LAST_MODEL_PATH: &str = "last_model_path";

    /// Reconciliation flag read by external surfaces (widgets); set to
    /// `"true"` whenever externally-visible state changes.
    pub const NEEDS_NATIVE_SYNC: &str = "needs_native_sync";
}

/// Failure in the backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Port for plain key → string persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key. Absent keys are not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Raise the external-sync flag, warning instead of failing.
///
/// The flag is advisory: a store failure here must not fail the operation
/// that changed state.
pub async fn mark_external_change(store: &dyn KeyValueStore) {
    if let Err(e) = store.set(keys::NEEDS_NATIVE_SYNC, "true").await {
        tracing::warn!(error = %e, "failed to raise external-sync flag");
    }
}

/// In-memory key-value store.
///
/// Default store for tests and for embedders that do not wire a platform
/// store; contents do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("k", "v1").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        // Removing an absent key is fine.
        store.remove("k").await.unwrap();
    }

    #[tokio::test]
    async fn sync_flag_is_raised() {
        let store = MemoryKeyValueStore::new();
        mark_external_change(&store).await;
        assert_eq!(
            store.get(keys::NEEDS_NATIVE_SYNC).await.unwrap().as_deref(),
            Some("true")
        );
    }
}
