//! Catalog error types.

use thiserror::Error;

/// Failure reported by a remote product source.
///
/// These never reach callers of the catalog cache directly; every variant is
/// recovered locally by degrading to cached or bundled data.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SourceError {
    #[error("network error reaching catalog endpoint: {message}")]
    Network { message: String },

    #[error("catalog endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed catalog payload: {message}")]
    Malformed { message: String },
}

impl SourceError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a malformed-payload error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Failure surfaced by catalog lookups.
///
/// The only observable failure in the subsystem: a specifically requested
/// product that exists in neither cache, remote, nor fallback has no safe
/// substitute.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CatalogError {
    #[error("product not found: {key}")]
    NotFound { key: String },
}

impl CatalogError {
    /// Creates a not-found error for the requested key.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}
