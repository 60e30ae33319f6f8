//! Domain layer with core business entities and port definitions.

/// Injected clock abstraction.
pub mod clock;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use clock::{Clock, SystemClock};
pub use entities::{
    CatalogOrigin, CatalogSnapshot, DeliveredImage, DeliveryOrigin, EncodedImage, ImageVariant,
    Product, VariantKey,
};
pub use errors::{CatalogError, SourceError, StoreError, TranscodeError};
pub use ports::{BlobStorePort, ProductSourcePort, TranscoderPort};
