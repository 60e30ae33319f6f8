//! Process-wide product catalog cache with TTL and graceful degradation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{CatalogOrigin, CatalogSnapshot, Product};
use crate::domain::errors::CatalogError;
use crate::domain::ports::ProductSourcePort;

/// Default time-to-live of the cache slot.
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(300);

/// Shared catalog cache: one snapshot slot per process.
///
/// Construct once at application start and pass by reference. The slot is
/// replaced wholesale on every successful fetch and never cleared on failure,
/// so the catalog degrades but never regresses to empty. Two concurrent
/// callers observing a stale slot may both fetch; mapping is pure and the
/// last write wins, so the race is tolerated rather than locked away.
pub struct CatalogCache {
    source: Arc<dyn ProductSourcePort>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    fallback: Arc<Vec<Product>>,
    slot: RwLock<Option<CatalogSnapshot>>,
}

impl CatalogCache {
    /// Creates a cache over the given source, clock, and bundled fallback.
    #[must_use]
    pub fn new(
        source: Arc<dyn ProductSourcePort>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        fallback: Vec<Product>,
    ) -> Self {
        Self {
            source,
            clock,
            ttl,
            fallback: Arc::new(fallback),
            slot: RwLock::new(None),
        }
    }

    /// Returns the current catalog.
    ///
    /// Within the TTL this serves the cache slot with no network access. On a
    /// stale or empty slot it fetches; a failed fetch substitutes the bundled
    /// fallback and stores it with a fresh timestamp, so repeated calls inside
    /// the TTL window neither retry the network nor surface an error.
    pub async fn get_catalog(&self) -> CatalogSnapshot {
        let now = self.clock.now();

        {
            let slot = self.slot.read().await;
            if let Some(snapshot) = slot.as_ref()
                && snapshot.is_valid(now, self.ttl)
            {
                trace!(products = snapshot.len(), "Catalog cache hit");
                return snapshot.with_origin(CatalogOrigin::Cached);
            }
        }

        match self.source.list_products().await {
            Ok(products) => {
                debug!(products = products.len(), "Catalog refreshed from remote");
                let snapshot = CatalogSnapshot::new(products, now, CatalogOrigin::Fresh);
                *self.slot.write().await = Some(snapshot.clone());
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed, serving bundled fallback");
                let snapshot = CatalogSnapshot::new(
                    self.fallback.as_ref().clone(),
                    now,
                    CatalogOrigin::Degraded,
                );
                *self.slot.write().await = Some(snapshot.clone());
                snapshot
            }
        }
    }

    /// Warms the cache before a lookup is known to be needed.
    ///
    /// A no-op while the slot is valid; never fails.
    pub async fn prefetch(&self) {
        let _ = self.get_catalog().await;
    }

    /// Looks up one product by identifier, slug, or SKU.
    ///
    /// Served synchronously from a valid slot when possible; otherwise a
    /// single-item remote fetch, then the bundled fallback. A key found
    /// nowhere is the one failure this subsystem surfaces.
    ///
    /// # Errors
    /// Returns `CatalogError::NotFound` when no source knows the key.
    pub async fn get_product(&self, key: &str) -> Result<Product, CatalogError> {
        let now = self.clock.now();

        {
            let slot = self.slot.read().await;
            if let Some(snapshot) = slot.as_ref()
                && snapshot.is_valid(now, self.ttl)
                && let Some(product) = snapshot.find(key)
            {
                trace!(key, "Product served from catalog cache");
                return Ok(product.clone());
            }
        }

        match self.source.fetch_product(key).await {
            Ok(product) => Ok(product),
            Err(e) => {
                warn!(key, error = %e, "Product fetch failed, scanning fallback");
                self.fallback
                    .iter()
                    .find(|p| p.matches_key(key))
                    .cloned()
                    .ok_or_else(|| CatalogError::not_found(key))
            }
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogCache")
            .field("ttl", &self.ttl)
            .field("fallback_len", &self.fallback.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::mock::ManualClock;
    use crate::domain::entities::fixtures::product;
    use crate::domain::ports::mocks::MockProductSource;

    fn fallback() -> Vec<Product> {
        vec![product("f1", "fallback-vase"), product("f2", "fallback-teppich")]
    }

    fn cache_with(
        products: Vec<Product>,
    ) -> (CatalogCache, Arc<MockProductSource>, Arc<ManualClock>) {
        let source = Arc::new(MockProductSource::new(products));
        let clock = Arc::new(ManualClock::system_now());
        let cache = CatalogCache::new(
            source.clone(),
            clock.clone(),
            DEFAULT_CATALOG_TTL,
            fallback(),
        );
        (cache, source, clock)
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl_issues_no_network_call() {
        let (cache, source, clock) =
            cache_with(vec![product("1", "a"), product("2", "b"), product("3", "c")]);

        let first = cache.get_catalog().await;
        assert_eq!(first.origin(), CatalogOrigin::Fresh);
        assert_eq!(first.len(), 3);

        clock.advance(Duration::from_secs(60));
        let second = cache.get_catalog().await;

        assert_eq!(source.list_calls(), 1);
        assert_eq!(second.origin(), CatalogOrigin::Cached);
        assert_eq!(second.products(), first.products());
    }

    #[tokio::test]
    async fn test_expired_ttl_issues_exactly_one_refetch() {
        let (cache, source, clock) = cache_with(vec![product("1", "a")]);

        cache.get_catalog().await;
        clock.advance(Duration::from_secs(301));
        let refreshed = cache.get_catalog().await;

        assert_eq!(source.list_calls(), 2);
        assert_eq!(refreshed.origin(), CatalogOrigin::Fresh);
    }

    #[tokio::test]
    async fn test_degrades_to_fallback_and_caches_it() {
        let (cache, source, _clock) = cache_with(vec![product("1", "a")]);
        source.set_failing(true);

        let degraded = cache.get_catalog().await;
        assert_eq!(degraded.origin(), CatalogOrigin::Degraded);
        assert_eq!(degraded.products(), fallback().as_slice());

        // Within the TTL the fallback is served from the slot, no retry.
        let repeat = cache.get_catalog().await;
        assert_eq!(source.list_calls(), 1);
        assert_eq!(repeat.origin(), CatalogOrigin::Cached);
        assert_eq!(repeat.products(), degraded.products());
    }

    #[tokio::test]
    async fn test_prefetch_is_noop_while_valid() {
        let (cache, source, _clock) = cache_with(vec![product("1", "a")]);

        cache.prefetch().await;
        cache.prefetch().await;
        cache.prefetch().await;

        assert_eq!(source.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_product_from_valid_slot_skips_network() {
        let (cache, source, _clock) = cache_with(vec![product("1", "vase")]);

        cache.get_catalog().await;
        let p = cache.get_product("vase").await.unwrap();

        assert_eq!(p.id, "1");
        assert_eq!(source.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_get_product_fetches_when_slot_misses() {
        let (cache, source, _clock) = cache_with(vec![product("1", "vase"), product("9", "lampe")]);

        cache.get_catalog().await;
        // "lampe" is in the slot, "9" too; ask for something absent from the
        // mapped slot to force the single-item path.
        let p = cache.get_product("9").await.unwrap();
        assert_eq!(p.slug, "lampe");
        assert_eq!(source.fetch_calls(), 0);

        // Stale slot: remote fetch is used.
        let (cache, source, clock) = cache_with(vec![product("1", "vase")]);
        cache.get_catalog().await;
        clock.advance(Duration::from_secs(400));
        let p = cache.get_product("vase").await.unwrap();
        assert_eq!(p.id, "1");
        assert_eq!(source.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_product_falls_back_on_remote_failure() {
        let (cache, source, _clock) = cache_with(vec![]);
        source.set_failing(true);

        let p = cache.get_product("fallback-vase").await.unwrap();
        assert_eq!(p.id, "f1");
    }

    #[tokio::test]
    async fn test_get_product_miss_is_explicit_not_found() {
        let (cache, source, _clock) = cache_with(vec![]);
        source.set_failing(true);

        let err = cache.get_product("nonexistent-sku").await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { key } if key == "nonexistent-sku"));
    }
}
