//! Image delivery pipeline: transcode, cache, and budget management.

use std::num::NonZeroUsize;
use std::sync::Arc;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::domain::entities::{
    DeliveredImage, DeliveryOrigin, ImageVariant, STORE_NAMESPACE, VariantKey, is_inline,
};
use crate::domain::ports::{BlobStorePort, TranscoderPort};

/// Full-resolution payloads above this size are served but never persisted,
/// so a single entry cannot dominate the storage budget.
pub const FULL_PERSIST_CEILING: usize = 500 * 1024;

/// Delivered values kept in the in-memory tier.
const DEFAULT_MEMORY_ENTRIES: usize = 64;

/// Converts source image references into optimized, cacheable inline values.
///
/// Lookup order is memory tier, persistent store, transcode. The transform is
/// pure given the same source bytes, so concurrent callers for one key may
/// each transcode and race the persistence write; last write wins with no
/// observable inconsistency. Every failure degrades: a non-optimized image is
/// acceptable, a broken one is not.
pub struct ImagePipeline {
    transcoder: Arc<dyn TranscoderPort>,
    store: Arc<dyn BlobStorePort>,
    memory: RwLock<LruCache<String, String>>,
}

impl ImagePipeline {
    /// Creates a pipeline over the given transcoder and persistent store.
    #[must_use]
    pub fn new(transcoder: Arc<dyn TranscoderPort>, store: Arc<dyn BlobStorePort>) -> Self {
        Self::with_memory_entries(transcoder, store, DEFAULT_MEMORY_ENTRIES)
    }

    /// Creates a pipeline with a custom in-memory tier capacity.
    #[must_use]
    pub fn with_memory_entries(
        transcoder: Arc<dyn TranscoderPort>,
        store: Arc<dyn BlobStorePort>,
        memory_entries: usize,
    ) -> Self {
        let cap = NonZeroUsize::new(memory_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            transcoder,
            store,
            memory: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Returns the optimized representation of `source` for `variant`.
    ///
    /// Empty and already-inline sources pass through unchanged. Cached values
    /// are returned before any decode/encode work. A failed transcode returns
    /// the original reference; this method never fails.
    pub async fn get_optimized_image(&self, source: &str, variant: ImageVariant) -> DeliveredImage {
        if source.is_empty() || is_inline(source) {
            return DeliveredImage::passthrough(source);
        }

        let key = VariantKey::new(source, variant);
        let store_key = key.store_key();

        if let Some(hit) = self.memory.write().await.get(&store_key) {
            trace!(key = %key, "Image memory tier hit");
            return DeliveredImage {
                src: hit.clone(),
                origin: DeliveryOrigin::Cache,
            };
        }

        if let Some(bytes) = self.store.get(&store_key).await
            && let Ok(src) = String::from_utf8(bytes.to_vec())
        {
            trace!(key = %key, "Image persistent store hit");
            self.memory.write().await.put(store_key, src.clone());
            return DeliveredImage {
                src,
                origin: DeliveryOrigin::Cache,
            };
        }

        let encoded = match self.transcoder.transcode(source, variant).await {
            Ok(encoded) => encoded,
            Err(e) => {
                debug!(key = %key, error = %e, "Transcode failed, passing source through");
                return DeliveredImage::passthrough(source);
            }
        };

        let src = encoded.to_inline();
        debug!(key = %key, size = src.len(), "Transcoded image variant");

        if variant != ImageVariant::Full || src.len() <= FULL_PERSIST_CEILING {
            self.persist(&store_key, &src).await;
        } else {
            trace!(key = %key, size = src.len(), "Full variant over persistence ceiling");
        }

        self.memory.write().await.put(store_key, src.clone());
        DeliveredImage {
            src,
            origin: DeliveryOrigin::Transcoded,
        }
    }

    /// Writes a delivered value, recovering once from capacity exhaustion by
    /// evicting this pipeline's own namespace. A write that still fails is
    /// dropped silently; caching is an optimization, not a correctness
    /// requirement.
    async fn persist(&self, store_key: &str, src: &str) {
        let value = Bytes::from(src.as_bytes().to_vec());
        match self.store.put(store_key, value.clone()).await {
            Ok(()) => {}
            Err(e) if e.is_capacity() => {
                warn!(key = store_key, "Store capacity exhausted, evicting image namespace");
                self.evict_own_entries().await;
                if let Err(e) = self.store.put(store_key, value).await {
                    warn!(key = store_key, error = %e, "Image cache write dropped after retry");
                }
            }
            Err(e) => {
                warn!(key = store_key, error = %e, "Image cache write failed");
            }
        }
    }

    /// Removes every store entry under the pipeline's namespace. Entries
    /// belonging to other consumers of the store are never touched.
    pub async fn evict_own_entries(&self) {
        let keys = self.store.keys_with_prefix(STORE_NAMESPACE).await;
        let count = keys.len();
        for key in keys {
            self.store.remove(&key).await;
        }
        debug!(count, "Evicted image namespace from persistent store");
    }
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockTranscoder;
    use crate::infrastructure::store::MemoryBlobStore;

    const SRC: &str = "https://example.com/vase.jpg";

    fn pipeline_with(
        store_capacity: usize,
    ) -> (ImagePipeline, Arc<MockTranscoder>, Arc<MemoryBlobStore>) {
        let transcoder = Arc::new(MockTranscoder::new());
        let store = Arc::new(MemoryBlobStore::new(store_capacity));
        let pipeline = ImagePipeline::new(transcoder.clone(), store.clone());
        (pipeline, transcoder, store)
    }

    fn expected_inline(source: &str, variant: ImageVariant) -> String {
        use base64::Engine as _;
        let payload = MockTranscoder::payload_for(source, variant);
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(payload)
        )
    }

    #[tokio::test]
    async fn test_empty_and_inline_sources_pass_through() {
        let (pipeline, transcoder, _store) = pipeline_with(1 << 20);

        let empty = pipeline.get_optimized_image("", ImageVariant::Preview).await;
        assert_eq!(empty.origin, DeliveryOrigin::Passthrough);
        assert_eq!(empty.src, "");

        let inline = "data:image/jpeg;base64,AAAA";
        let out = pipeline.get_optimized_image(inline, ImageVariant::Full).await;
        assert_eq!(out.origin, DeliveryOrigin::Passthrough);
        assert_eq!(out.src, inline);

        assert_eq!(transcoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_call_reuses_cache_without_retranscoding() {
        let (pipeline, transcoder, _store) = pipeline_with(1 << 20);

        let first = pipeline.get_optimized_image(SRC, ImageVariant::Thumbnail).await;
        assert_eq!(first.origin, DeliveryOrigin::Transcoded);
        assert_eq!(first.src, expected_inline(SRC, ImageVariant::Thumbnail));

        let second = pipeline.get_optimized_image(SRC, ImageVariant::Thumbnail).await;
        assert_eq!(second.origin, DeliveryOrigin::Cache);
        assert_eq!(second.src, first.src);
        assert_eq!(transcoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_persisted_value_survives_memory_tier() {
        let (pipeline, transcoder, store) = pipeline_with(1 << 20);

        let first = pipeline.get_optimized_image(SRC, ImageVariant::Preview).await;

        // A second pipeline over the same store models a fresh process run.
        let revived = ImagePipeline::new(transcoder.clone(), store);
        let second = revived.get_optimized_image(SRC, ImageVariant::Preview).await;

        assert_eq!(second.origin, DeliveryOrigin::Cache);
        assert_eq!(second.src, first.src);
        assert_eq!(transcoder.calls(), 1);
    }

    #[tokio::test]
    async fn test_transcode_failure_returns_source_unchanged() {
        let (pipeline, transcoder, store) = pipeline_with(1 << 20);
        transcoder.set_failing(true);

        let out = pipeline.get_optimized_image(SRC, ImageVariant::Thumbnail).await;

        assert_eq!(out.origin, DeliveryOrigin::Passthrough);
        assert_eq!(out.src, SRC);
        assert!(store.keys_with_prefix("").await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_full_variant_is_served_but_not_persisted() {
        let (pipeline, transcoder, store) = pipeline_with(10 << 20);
        transcoder.set_padding(FULL_PERSIST_CEILING);

        let out = pipeline.get_optimized_image(SRC, ImageVariant::Full).await;

        assert_eq!(out.origin, DeliveryOrigin::Transcoded);
        assert!(out.byte_len() > FULL_PERSIST_CEILING);
        assert!(store.keys_with_prefix(STORE_NAMESPACE).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_preview_is_still_persisted() {
        let (pipeline, transcoder, store) = pipeline_with(10 << 20);
        transcoder.set_padding(FULL_PERSIST_CEILING);

        pipeline.get_optimized_image(SRC, ImageVariant::Preview).await;

        assert_eq!(store.keys_with_prefix(STORE_NAMESPACE).await.len(), 1);
    }

    #[tokio::test]
    async fn test_capacity_exhaustion_evicts_own_namespace_only() {
        let (pipeline, _transcoder, store) = pipeline_with(550);

        // Foreign entry plus enough namespace entries to fill the budget.
        store
            .put("cart/session", Bytes::from_static(b"foreign"))
            .await
            .unwrap();
        store
            .put("img/preview/stale-a", Bytes::from(vec![0u8; 250]))
            .await
            .unwrap();
        store
            .put("img/preview/stale-b", Bytes::from(vec![0u8; 250]))
            .await
            .unwrap();

        let out = pipeline.get_optimized_image(SRC, ImageVariant::Preview).await;
        assert_eq!(out.origin, DeliveryOrigin::Transcoded);

        // The rejected write evicted only the pipeline's namespace, then the
        // retry landed the new entry.
        let keys = store.keys_with_prefix(STORE_NAMESPACE).await;
        assert_eq!(keys, vec![VariantKey::new(SRC, ImageVariant::Preview).store_key()]);
        assert!(store.get("cart/session").await.is_some());
    }

    #[tokio::test]
    async fn test_write_dropped_silently_when_retry_fails() {
        // Budget smaller than a single payload: eviction cannot help.
        let (pipeline, _transcoder, store) = pipeline_with(8);

        let out = pipeline.get_optimized_image(SRC, ImageVariant::Preview).await;

        assert_eq!(out.origin, DeliveryOrigin::Transcoded);
        assert!(store.keys_with_prefix(STORE_NAMESPACE).await.is_empty());
    }

    #[tokio::test]
    async fn test_identical_calls_are_value_equal() {
        let (pipeline, _transcoder, store) = pipeline_with(1 << 20);

        let a = pipeline.get_optimized_image(SRC, ImageVariant::Full).await;
        let fresh = ImagePipeline::new(Arc::new(MockTranscoder::new()), store);
        let b = fresh.get_optimized_image(SRC, ImageVariant::Full).await;

        assert_eq!(a.src, b.src);
    }

    #[tokio::test]
    async fn test_concurrent_same_key_calls_converge() {
        use crate::infrastructure::store::DiskBlobStore;

        let transcoder = Arc::new(MockTranscoder::new());
        let dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(
            DiskBlobStore::new(dir.path().to_path_buf(), 1 << 20)
                .await
                .unwrap(),
        );
        let pipeline = Arc::new(ImagePipeline::new(transcoder.clone(), store.clone()));

        // Hold both transcodes in flight so each caller misses every cache
        // tier before either result lands.
        transcoder.gate_source(SRC);
        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.get_optimized_image(SRC, ImageVariant::Thumbnail).await })
        };
        let second = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.get_optimized_image(SRC, ImageVariant::Thumbnail).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        transcoder.release();
        transcoder.release();

        let a = first.await.unwrap();
        let b = second.await.unwrap();

        assert_eq!(a.src, b.src);
        assert_eq!(transcoder.calls(), 2);

        // Last write wins at the persistence layer with no drift: one entry,
        // counted once.
        let keys = store.keys_with_prefix(STORE_NAMESPACE).await;
        assert_eq!(keys, vec![VariantKey::new(SRC, ImageVariant::Thumbnail).store_key()]);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.used_bytes().await, a.src.len() as u64);
    }
}
