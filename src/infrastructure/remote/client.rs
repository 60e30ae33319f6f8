//! HTTP client for the remote catalog endpoint.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::dto::RemoteProductRecord;
use crate::domain::entities::Product;
use crate::domain::errors::SourceError;
use crate::domain::ports::ProductSourcePort;

const DEFAULT_API_BASE: &str = "https://www.mamoru.shop/wp-json/wc/store/v1";
const USER_AGENT: &str = concat!("vitrine/", env!("CARGO_PKG_VERSION"));
const PAGE_SIZE: &str = "100";

/// Settings for the store API client.
#[derive(Debug, Clone)]
pub struct StoreApiConfig {
    /// Base URL of the catalog endpoint.
    pub base_url: String,
    /// Request timeout in seconds. A hanging fetch would otherwise keep the
    /// caller's degradation path from ever running.
    pub timeout_secs: u64,
}

impl Default for StoreApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Catalog endpoint client implementing the two remote verbs.
pub struct StoreApiClient {
    client: Client,
    base_url: String,
}

impl StoreApiClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_config(StoreApiConfig::default())
    }

    /// Creates a client with the given settings.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_config(config: StoreApiConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a request against the products resource. Query values are
    /// percent-encoded by the builder, so keys with spaces or `&` stay intact.
    fn products_request(&self, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/products", self.base_url))
            .query(query)
    }

    async fn get_records(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<RemoteProductRecord>, SourceError> {
        let request = request
            .build()
            .map_err(|e| SourceError::network(e.to_string()))?;
        debug!(url = %request.url(), "Fetching catalog records");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Catalog request failed");
            if e.is_timeout() {
                SourceError::network("request timed out")
            } else {
                SourceError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<RemoteProductRecord>>()
            .await
            .map_err(|e| SourceError::malformed(e.to_string()))
    }
}

#[async_trait]
impl ProductSourcePort for StoreApiClient {
    async fn list_products(&self) -> Result<Vec<Product>, SourceError> {
        let records = self
            .get_records(self.products_request(&[("per_page", PAGE_SIZE)]))
            .await?;
        let now = Utc::now();

        debug!(records = records.len(), "Catalog listing fetched");
        Ok(records.into_iter().map(|r| r.into_product(now)).collect())
    }

    async fn fetch_product(&self, key: &str) -> Result<Product, SourceError> {
        // Numeric keys address the item resource directly; anything else goes
        // through the slug filter.
        if key.chars().all(|c| c.is_ascii_digit()) && !key.is_empty() {
            let url = format!("{}/products/{key}", self.base_url);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| SourceError::network(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(SourceError::malformed(format!("no record for {key}")));
            }
            if !status.is_success() {
                return Err(SourceError::Status {
                    status: status.as_u16(),
                });
            }

            let record: RemoteProductRecord = response
                .json()
                .await
                .map_err(|e| SourceError::malformed(e.to_string()))?;
            return Ok(record.into_product(Utc::now()));
        }

        let records = self
            .get_records(self.products_request(&[("slug", key), ("per_page", "1")]))
            .await?;
        records
            .into_iter()
            .next()
            .map(|r| r.into_product(Utc::now()))
            .ok_or_else(|| SourceError::malformed(format!("no record for {key}")))
    }
}

impl std::fmt::Debug for StoreApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
