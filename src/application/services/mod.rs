//! Catalog cache and image pipeline services.

mod catalog_cache;
mod image_pipeline;

pub use catalog_cache::{CatalogCache, DEFAULT_CATALOG_TTL};
pub use image_pipeline::{FULL_PERSIST_CEILING, ImagePipeline};
