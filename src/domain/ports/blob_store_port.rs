//! Persistent key/value store port definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::StoreError;

/// Port for a string-keyed, capacity-constrained byte store.
///
/// The store outlives the process and may have several consumers; the image
/// pipeline owns eviction policy only for keys under its own namespace and
/// must never touch anyone else's.
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<Bytes>;

    /// Writes `value` under `key`.
    ///
    /// # Errors
    /// Returns `StoreError::CapacityExceeded` when the write would exceed the
    /// store's budget, or `StoreError::Io` on other failures.
    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Removes the entry under `key`. Missing keys are not an error.
    async fn remove(&self, key: &str);

    /// Lists every stored key starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}
