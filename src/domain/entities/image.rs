//! Image variant and delivery types.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;

/// Key prefix for every persistent-store entry owned by the image pipeline.
/// The store may have other consumers; eviction never crosses this namespace.
pub const STORE_NAMESPACE: &str = "img/";

/// Output quality/size classes the pipeline can produce for a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageVariant {
    /// Tiny blur placeholder, never shown at full size.
    Preview,
    /// Grid-sized rendition.
    Thumbnail,
    /// Re-encoded at original dimensions.
    Full,
}

impl ImageVariant {
    /// Returns the stable name used in store keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Thumbnail => "thumbnail",
            Self::Full => "full",
        }
    }

    /// Returns the downscale target width, or `None` for no resizing.
    #[must_use]
    pub const fn target_width(self) -> Option<u32> {
        match self {
            Self::Preview => Some(20),
            Self::Thumbnail => Some(300),
            Self::Full => None,
        }
    }

    /// Returns the re-encode quality (JPEG scale, 1-100).
    #[must_use]
    pub const fn quality(self) -> u8 {
        match self {
            Self::Preview => 30,
            Self::Thumbnail => 70,
            Self::Full => 80,
        }
    }
}

impl std::fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content address for one `(source, variant)` pair.
///
/// Identical keys always address the same cached value; the source reference
/// is hashed so arbitrary URLs become store- and filename-safe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    source: String,
    variant: ImageVariant,
}

impl VariantKey {
    /// Creates the key for a source reference and requested variant.
    #[must_use]
    pub fn new(source: impl Into<String>, variant: ImageVariant) -> Self {
        Self {
            source: source.into(),
            variant,
        }
    }

    /// Returns the source reference.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the requested variant.
    #[must_use]
    pub const fn variant(&self) -> ImageVariant {
        self.variant
    }

    /// Returns the namespaced persistent-store key.
    #[must_use]
    pub fn store_key(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        let digest = hasher.finalize();
        format!(
            "{STORE_NAMESPACE}{}/{}",
            self.variant.as_str(),
            hex::encode(&digest[..16])
        )
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.variant, self.source)
    }
}

/// Compressed output of one transcode.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Encoded bytes.
    pub bytes: Bytes,
    /// MIME type of the encoding.
    pub mime: &'static str,
}

impl EncodedImage {
    /// Renders the encoding as an inline `data:` value.
    #[must_use]
    pub fn to_inline(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Where a delivered image value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOrigin {
    /// The source reference was returned unchanged (already inline, empty, or
    /// the transcode failed and degraded to the original).
    Passthrough,
    /// Served from a cache tier without transcoding.
    Cache,
    /// Produced by a transcode during this call.
    Transcoded,
}

/// An image value ready for display, with test-visible provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredImage {
    /// Displayable reference: the original source or an inline `data:` value.
    pub src: String,
    /// Which path produced the value.
    pub origin: DeliveryOrigin,
}

impl DeliveredImage {
    /// Wraps a source reference returned unchanged.
    #[must_use]
    pub fn passthrough(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            origin: DeliveryOrigin::Passthrough,
        }
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.src.len()
    }
}

/// Returns true for references that are already inline-encoded.
#[must_use]
pub fn is_inline(source: &str) -> bool {
    source.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ImageVariant::Preview, Some(20), 30; "preview")]
    #[test_case(ImageVariant::Thumbnail, Some(300), 70; "thumbnail")]
    #[test_case(ImageVariant::Full, None, 80; "full")]
    fn test_variant_parameters(variant: ImageVariant, width: Option<u32>, quality: u8) {
        assert_eq!(variant.target_width(), width);
        assert_eq!(variant.quality(), quality);
    }

    #[test]
    fn test_store_key_is_stable_and_namespaced() {
        let a = VariantKey::new("https://example.com/a.jpg", ImageVariant::Preview);
        let b = VariantKey::new("https://example.com/a.jpg", ImageVariant::Preview);

        assert_eq!(a.store_key(), b.store_key());
        assert!(a.store_key().starts_with("img/preview/"));
    }

    #[test]
    fn test_store_key_differs_per_variant_and_source() {
        let src = "https://example.com/a.jpg";
        let preview = VariantKey::new(src, ImageVariant::Preview).store_key();
        let full = VariantKey::new(src, ImageVariant::Full).store_key();
        let other = VariantKey::new("https://example.com/b.jpg", ImageVariant::Preview).store_key();

        assert_ne!(preview, full);
        assert_ne!(preview, other);
    }

    #[test]
    fn test_inline_rendering_round_trips() {
        let encoded = EncodedImage {
            bytes: Bytes::from_static(b"pixels"),
            mime: "image/jpeg",
        };
        let inline = encoded.to_inline();

        assert!(is_inline(&inline));
        let b64 = inline.split_once("base64,").unwrap().1;
        assert_eq!(BASE64.decode(b64).unwrap(), b"pixels");
    }

    #[test]
    fn test_is_inline() {
        assert!(is_inline("data:image/jpeg;base64,AAAA"));
        assert!(!is_inline("https://example.com/a.jpg"));
        assert!(!is_inline(""));
    }
}
