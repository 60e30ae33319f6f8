//! Application layer containing the core services.

/// Service implementations.
pub mod services;

pub use services::{CatalogCache, DEFAULT_CATALOG_TTL, FULL_PERSIST_CEILING, ImagePipeline};
