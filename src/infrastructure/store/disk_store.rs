//! Disk-backed blob store for persistence across sessions.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::errors::StoreError;
use crate::domain::ports::BlobStorePort;

/// Default storage budget in bytes (4 MiB).
pub const DEFAULT_STORE_CAPACITY: u64 = 4 * 1024 * 1024;

/// Persistent key/value store holding one file per key.
///
/// Keys are hex-encoded into filenames so any key round-trips through
/// `keys_with_prefix`. Writes that would exceed the byte budget are rejected
/// with `CapacityExceeded`; the store never evicts on its own.
///
/// Capacity accounting is a read-check-update sequence spanning filesystem
/// awaits, so `put` and `remove` hold one mutex for their whole duration.
/// Concurrent same-key writers serialize here and land on consistent
/// counters; reads stay lock-free.
pub struct DiskBlobStore {
    dir: PathBuf,
    capacity: u64,
    usage: Mutex<Usage>,
}

#[derive(Debug, Clone, Copy)]
struct Usage {
    bytes: u64,
    entries: usize,
}

const FILE_EXT: &str = "bin";

impl DiskBlobStore {
    /// Creates a store in the specified directory, indexing existing entries.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created or read.
    pub async fn new(dir: PathBuf, capacity: u64) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Io(format!("failed to create store dir: {e}")))?;

        let mut usage = Usage {
            bytes: 0,
            entries: 0,
        };

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::Io(format!("failed to read store dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == FILE_EXT)
                && let Ok(meta) = entry.metadata().await
            {
                usage.bytes += meta.len();
                usage.entries += 1;
            }
        }

        debug!(
            dir = %dir.display(),
            entries = usage.entries,
            bytes = usage.bytes,
            "Opened disk store"
        );

        Ok(Self {
            dir,
            capacity,
            usage: Mutex::new(usage),
        })
    }

    /// Creates a store in the platform cache directory with the default budget.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn default_location() -> Result<Self, StoreError> {
        Self::new(default_store_dir(), DEFAULT_STORE_CAPACITY).await
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{FILE_EXT}", hex::encode(key)))
    }

    fn key_from_path(path: &std::path::Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Returns the total bytes currently stored.
    pub async fn used_bytes(&self) -> u64 {
        self.usage.lock().await.bytes
    }

    /// Returns the number of stored entries.
    pub async fn len(&self) -> usize {
        self.usage.lock().await.entries
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStorePort for DiskBlobStore {
    async fn get(&self, key: &str) -> Option<Bytes> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(key, "Disk store hit");
                Some(Bytes::from(bytes))
            }
            Err(_) => {
                trace!(key, "Disk store miss");
                None
            }
        }
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let mut usage = self.usage.lock().await;

        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();
        let new_size = value.len() as u64;

        if usage.bytes.saturating_sub(old_size.unwrap_or(0)) + new_size > self.capacity {
            trace!(key, size = new_size, used = usage.bytes, "Disk store write rejected");
            return Err(StoreError::CapacityExceeded);
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StoreError::Io(format!("failed to create store file: {e}")))?;
        file.write_all(&value)
            .await
            .map_err(|e| StoreError::Io(format!("failed to write store file: {e}")))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Io(format!("failed to flush store file: {e}")))?;

        if let Some(old) = old_size {
            usage.bytes = usage.bytes.saturating_sub(old) + new_size;
        } else {
            usage.bytes += new_size;
            usage.entries += 1;
        }

        debug!(key, size = new_size, "Stored blob on disk");
        Ok(())
    }

    async fn remove(&self, key: &str) {
        let path = self.path_for(key);
        let mut usage = self.usage.lock().await;

        let size = fs::metadata(&path).await.map(|m| m.len()).ok();
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key, error = %e, "Failed to remove store file");
            }
        } else if let Some(s) = size {
            usage.bytes = usage.bytes.saturating_sub(s);
            usage.entries = usage.entries.saturating_sub(1);
            debug!(key, "Removed blob from disk");
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Ok(mut entries) = fs::read_dir(&self.dir).await else {
            return Vec::new();
        };

        let mut keys = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != FILE_EXT) {
                continue;
            }
            if let Some(key) = Self::key_from_path(&path)
                && key.starts_with(prefix)
            {
                keys.push(key);
            }
        }
        keys
    }
}

/// Returns the default store directory path.
fn default_store_dir() -> PathBuf {
    directories::ProjectDirs::from("shop", "vitrine", "vitrine").map_or_else(
        || std::env::temp_dir().join("vitrine").join("store"),
        |dirs| dirs.cache_dir().join("store"),
    )
}
