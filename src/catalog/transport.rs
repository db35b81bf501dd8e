//! HTTP access to the catalog API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use tracing::{debug, warn};

use super::query::CanonicalQuery;
use crate::config::CatalogConfig;
use crate::error::CatalogError;

/// Status and body of a catalog response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a `GET` against the catalog.
///
/// Implementations return every HTTP status as a [`RawResponse`] and only
/// fail for transport problems; status classification happens in
/// [`CatalogFetcher`](super::CatalogFetcher).
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(&self, path: &str, query: &CanonicalQuery) -> Result<RawResponse, CatalogError>;
}

/// `reqwest` backed transport that always goes to the origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: CatalogConfig,
}

impl HttpTransport {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        debug!(base_url = %config.base_url, "Created catalog HTTP transport");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(&self, path: &str, query: &CanonicalQuery) -> Result<RawResponse, CatalogError> {
        let url = self.config.endpoint(path);
        debug!(%url, query = %query.to_query_string(), "Requesting catalog");

        let response = self.client.get(&url).query(query.pairs()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            warn!(%url, status, body = %body, "Catalog response not OK");
        }
        Ok(RawResponse { status, body })
    }
}
