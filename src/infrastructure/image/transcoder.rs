//! Image-codec transcoder backend.
//!
//! Fetches source bytes over HTTP or from the local filesystem, decodes on a
//! blocking worker, downscales per variant, and re-encodes as JPEG.

use async_trait::async_trait;
use bytes::Bytes;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, trace};

use crate::domain::entities::{EncodedImage, ImageVariant};
use crate::domain::errors::TranscodeError;
use crate::domain::ports::TranscoderPort;

/// Settings for the codec transcoder.
#[derive(Debug, Clone)]
pub struct CodecTranscoderConfig {
    /// Timeout for source downloads in seconds.
    pub timeout_secs: u64,
}

impl Default for CodecTranscoderConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// `TranscoderPort` backend over the `image` codec crate.
pub struct CodecTranscoder {
    client: reqwest::Client,
}

impl CodecTranscoder {
    /// Creates a transcoder with default settings.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, TranscodeError> {
        Self::with_config(CodecTranscoderConfig::default())
    }

    /// Creates a transcoder with the given settings.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_config(config: CodecTranscoderConfig) -> Result<Self, TranscodeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranscodeError::Fetch(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Reads source bytes from an HTTP URL or a local path.
    async fn fetch_source(&self, source: &str) -> Result<Bytes, TranscodeError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let response = self
                .client
                .get(source)
                .send()
                .await
                .map_err(|e| TranscodeError::Fetch(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TranscodeError::Fetch(format!("HTTP {}", response.status())));
            }

            response
                .bytes()
                .await
                .map_err(|e| TranscodeError::Fetch(e.to_string()))
        } else {
            tokio::fs::read(source)
                .await
                .map(Bytes::from)
                .map_err(|e| TranscodeError::Fetch(e.to_string()))
        }
    }
}

#[async_trait]
impl TranscoderPort for CodecTranscoder {
    async fn transcode(
        &self,
        source: &str,
        variant: ImageVariant,
    ) -> Result<EncodedImage, TranscodeError> {
        let bytes = self.fetch_source(source).await?;
        trace!(source, %variant, size = bytes.len(), "Fetched source image");

        let encoded = tokio::task::spawn_blocking(move || transcode_bytes(&bytes, variant))
            .await
            .map_err(|e| TranscodeError::Decode(format!("transcode task panicked: {e}")))??;

        debug!(source, %variant, size = encoded.len(), "Encoded image variant");
        Ok(EncodedImage {
            bytes: Bytes::from(encoded),
            mime: "image/jpeg",
        })
    }
}

/// Decode, downscale per variant, and re-encode as JPEG.
fn transcode_bytes(bytes: &[u8], variant: ImageVariant) -> Result<Vec<u8>, TranscodeError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| TranscodeError::Decode(e.to_string()))?;

    let scaled = match variant.target_width() {
        Some(width) => scale_down(decoded, width),
        None => decoded,
    };

    // JPEG carries no alpha channel.
    let rgb = scaled.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, variant.quality());
    rgb.write_with_encoder(encoder)
        .map_err(|e| TranscodeError::Encode(e.to_string()))?;
    Ok(out)
}

/// Downscales to `max_width` preserving aspect ratio; never upscales.
fn scale_down(img: DynamicImage, max_width: u32) -> DynamicImage {
    if img.width() <= max_width {
        return img;
    }
    let height = u32::try_from(
        (u64::from(img.height()) * u64::from(max_width)) / u64::from(img.width().max(1)),
    )
    .unwrap_or(1)
    .max(1);
    img.resize_exact(max_width, height, FilterType::Lanczos3)
}

impl std::fmt::Debug for CodecTranscoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecTranscoder").finish_non_exhaustive()
    }
}
