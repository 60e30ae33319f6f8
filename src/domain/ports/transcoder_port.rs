//! Image transcoder port definition.

use async_trait::async_trait;

use crate::domain::entities::{EncodedImage, ImageVariant};
use crate::domain::errors::TranscodeError;

/// Port for the decode/resize/encode capability.
///
/// Treated as an opaque, possibly-failing service: sources may be
/// unreachable, undecodable, or blocked, and the pipeline degrades rather
/// than propagating any of that.
#[async_trait]
pub trait TranscoderPort: Send + Sync {
    /// Produces the encoded representation of `source` for `variant`.
    ///
    /// # Errors
    /// Returns an error when the source cannot be fetched, decoded, or
    /// re-encoded.
    async fn transcode(
        &self,
        source: &str,
        variant: ImageVariant,
    ) -> Result<EncodedImage, TranscodeError>;
}
