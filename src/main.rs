use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::application::{CatalogCache, ImagePipeline};
use vitrine::domain::clock::SystemClock;
use vitrine::domain::entities::{ImageVariant, is_inline};
use vitrine::infrastructure::{
    AppConfig, CodecTranscoder, DiskBlobStore, StoreApiClient, StoreApiConfig, fallback_catalog,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = AppConfig::parse();
    init_logging(&config)?;

    info!(version = vitrine::VERSION, "Starting vitrine cache warmer");

    let mut api_config = StoreApiConfig::default();
    if let Some(base) = &config.api_base {
        api_config.base_url.clone_from(base);
    }

    let source = Arc::new(StoreApiClient::with_config(api_config)?);
    let clock = Arc::new(SystemClock);
    let catalog = CatalogCache::new(source, clock, config.catalog_ttl(), fallback_catalog());

    let store_dir = config.effective_store_dir();
    let store = Arc::new(DiskBlobStore::new(store_dir, config.store_capacity).await?);
    let transcoder = Arc::new(CodecTranscoder::new()?);
    let pipeline = ImagePipeline::new(transcoder, store);

    let snapshot = catalog.get_catalog().await;
    info!(
        products = snapshot.products().len(),
        origin = ?snapshot.origin(),
        "Catalog loaded"
    );

    let mut warmed = 0usize;
    for product in snapshot.products().iter() {
        let Some(source) = product.primary_image() else {
            continue;
        };
        let delivered = pipeline
            .get_optimized_image(source, ImageVariant::Thumbnail)
            .await;
        if is_inline(&delivered.src) {
            warmed += 1;
        } else {
            warn!(key = %product.slug, "Thumbnail left as passthrough");
        }
    }

    info!(warmed, "Cache warming complete");
    Ok(())
}
