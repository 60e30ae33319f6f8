//! Port definitions.

mod blob_store_port;
mod product_source_port;
mod transcoder_port;

pub use blob_store_port::BlobStorePort;
pub use product_source_port::ProductSourcePort;
pub use transcoder_port::TranscoderPort;
