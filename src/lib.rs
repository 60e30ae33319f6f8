//! Vitrine - a headless storefront data layer.
//!
//! This crate provides the data plumbing behind a storefront UI: a process-wide
//! product catalog cache with TTL and graceful degradation, an image delivery
//! pipeline that transcodes and persistently caches quality variants under a
//! storage budget, and a progressive presenter that reveals images in two
//! phases without applying stale results.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the catalog cache and image pipeline services.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the progressive image presenter.
pub mod presentation;

/// Current version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "vitrine";
