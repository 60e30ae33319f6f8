//! Application configuration from CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::infrastructure::store::DEFAULT_STORE_CAPACITY;

const APP_NAME: &str = "vitrine";
const APP_QUALIFIER: &str = "shop";
const APP_ORGANIZATION: &str = "vitrine";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration from CLI.
#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    version,
    about = "Headless storefront catalog cache and image delivery pipeline",
    long_about = None
)]
pub struct AppConfig {
    /// Catalog endpoint base URL.
    #[arg(long, env = "VITRINE_API_BASE", value_name = "URL")]
    pub api_base: Option<String>,

    /// Persistent store directory.
    #[arg(long, value_name = "PATH")]
    pub store_dir: Option<PathBuf>,

    /// Persistent store byte budget.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_STORE_CAPACITY)]
    pub store_capacity: u64,

    /// Catalog cache time-to-live in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub catalog_ttl_secs: u64,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Returns the catalog cache TTL.
    #[must_use]
    pub const fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    /// Returns the store directory, defaulting to the platform cache dir.
    #[must_use]
    pub fn effective_store_dir(&self) -> PathBuf {
        self.store_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
                || std::env::temp_dir().join(APP_NAME).join("store"),
                |dirs| dirs.cache_dir().join("store"),
            )
        })
    }
}
