//! Presentation layer.

/// Progressive two-phase image presenter.
pub mod progressive;

pub use progressive::{Phase, ProgressiveImage};
