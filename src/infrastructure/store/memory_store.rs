//! In-memory blob store.
//!
//! Ephemeral `BlobStorePort` backend with the same capacity contract as the
//! disk store; used for tests and environments without a persistent home.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::trace;

use crate::domain::errors::StoreError;
use crate::domain::ports::BlobStorePort;

/// Capacity-bounded in-memory key/value store.
pub struct MemoryBlobStore {
    entries: RwLock<HashMap<String, Bytes>>,
    capacity: usize,
}

impl MemoryBlobStore {
    /// Creates a store with the given byte budget.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Returns the total bytes currently stored.
    pub async fn used_bytes(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().map(Bytes::len).sum()
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStorePort for MemoryBlobStore {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let used: usize = entries.values().map(Bytes::len).sum();
        let replaced = entries.get(key).map_or(0, Bytes::len);

        if used - replaced + value.len() > self.capacity {
            trace!(key, size = value.len(), used, "Memory store write rejected");
            return Err(StoreError::CapacityExceeded);
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryBlobStore::new(1024);

        store.put("a", Bytes::from_static(b"one")).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Bytes::from_static(b"one"));
        assert!(store.get("b").await.is_none());
    }

    #[tokio::test]
    async fn test_rejects_over_budget_writes() {
        let store = MemoryBlobStore::new(10);

        store.put("a", Bytes::from(vec![0u8; 8])).await.unwrap();
        let err = store.put("b", Bytes::from(vec![0u8; 8])).await.unwrap_err();

        assert!(err.is_capacity());
        assert!(store.get("b").await.is_none());
    }

    #[tokio::test]
    async fn test_replacement_accounts_for_old_size() {
        let store = MemoryBlobStore::new(10);

        store.put("a", Bytes::from(vec![0u8; 8])).await.unwrap();
        // Replacing the same key frees its old bytes first.
        store.put("a", Bytes::from(vec![1u8; 10])).await.unwrap();

        assert_eq!(store.used_bytes().await, 10);
    }

    #[tokio::test]
    async fn test_keys_with_prefix_filters() {
        let store = MemoryBlobStore::new(1024);
        store.put("img/a", Bytes::from_static(b"1")).await.unwrap();
        store.put("img/b", Bytes::from_static(b"2")).await.unwrap();
        store.put("cart/x", Bytes::from_static(b"3")).await.unwrap();

        let mut keys = store.keys_with_prefix("img/").await;
        keys.sort();
        assert_eq!(keys, vec!["img/a", "img/b"]);
    }
}
