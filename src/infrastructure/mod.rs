//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Bundled fallback catalog.
pub mod fallback;
/// Image transcoding backend.
pub mod image;
/// Remote catalog endpoint client.
pub mod remote;
/// Persistent blob store adapters.
pub mod store;

pub use config::{AppConfig, LogLevel};
pub use fallback::fallback_catalog;
pub use image::CodecTranscoder;
pub use remote::{StoreApiClient, StoreApiConfig};
pub use store::{DiskBlobStore, MemoryBlobStore};
