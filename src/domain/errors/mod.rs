//! Domain error types.

mod catalog_error;
mod image_error;

pub use catalog_error::{CatalogError, SourceError};
pub use image_error::{StoreError, TranscodeError};
