//! Remote product source port definition.

use async_trait::async_trait;

use crate::domain::entities::Product;
use crate::domain::errors::SourceError;

/// Port for the remote catalog endpoint's two verbs.
///
/// Implementations map remote records into domain products; coercion of
/// text-borne numerics happens behind this boundary so the cache only ever
/// sees well-formed products.
#[async_trait]
pub trait ProductSourcePort: Send + Sync {
    /// Lists all products in catalog order.
    async fn list_products(&self) -> Result<Vec<Product>, SourceError>;

    /// Fetches one product by identifier, slug, or SKU.
    async fn fetch_product(&self, key: &str) -> Result<Product, SourceError>;
}
