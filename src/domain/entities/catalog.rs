//! Catalog cache entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::Product;

/// Which path produced a snapshot.
///
/// The external contract collapses all three into a normal success; the
/// origin exists so callers and tests can observe whether a result came from
/// the network, the cache slot, or the bundled fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Mapped from a successful remote fetch.
    Fresh,
    /// Served from the in-process cache slot within its TTL.
    Cached,
    /// Bundled fallback dataset substituted after a remote failure.
    Degraded,
}

/// The single process-wide catalog cache entry.
///
/// Replaced wholesale on a successful fetch and never cleared on failure;
/// product lists are shared behind an `Arc` so clones are cheap.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    products: Arc<Vec<Product>>,
    fetched_at: DateTime<Utc>,
    origin: CatalogOrigin,
}

impl CatalogSnapshot {
    /// Creates a snapshot timestamped at `fetched_at`.
    #[must_use]
    pub fn new(products: Vec<Product>, fetched_at: DateTime<Utc>, origin: CatalogOrigin) -> Self {
        Self {
            products: Arc::new(products),
            fetched_at,
            origin,
        }
    }

    /// Returns the products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Returns when the snapshot was created.
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Returns which path produced the snapshot.
    #[must_use]
    pub const fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    /// Returns a clone re-labelled with the given origin. The shared product
    /// list is not copied.
    #[must_use]
    pub fn with_origin(&self, origin: CatalogOrigin) -> Self {
        Self {
            products: Arc::clone(&self.products),
            fetched_at: self.fetched_at,
            origin,
        }
    }

    /// Returns true while the snapshot's age is below `ttl`.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now - self.fetched_at;
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => age < ttl,
            Err(_) => true,
        }
    }

    /// Finds a product whose identifier, slug, or SKU equals `key`.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.matches_key(key))
    }

    /// Returns the number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Returns true if the snapshot holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
