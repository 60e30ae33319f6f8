//! Image pipeline error types.

use thiserror::Error;

/// Failure reported by a persistent blob store.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("store capacity exhausted")]
    CapacityExceeded,

    #[error("store IO error: {0}")]
    Io(String),
}

impl StoreError {
    /// Returns true if the write was rejected for capacity reasons.
    #[must_use]
    pub const fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityExceeded)
    }
}

/// Failure during decode/encode of an image source.
///
/// Never surfaced by the pipeline; a failed transcode degrades to the
/// original reference.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum TranscodeError {
    #[error("failed to fetch source: {0}")]
    Fetch(String),

    #[error("failed to decode source: {0}")]
    Decode(String),

    #[error("failed to encode variant: {0}")]
    Encode(String),
}
