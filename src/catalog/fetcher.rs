//! Retrieval operations against the catalog and classification of their
//! outcomes.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::query::{self, CanonicalQuery};
use super::transport::{CatalogTransport, HttpTransport, RawResponse};
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::models::{Beer, BeerId, FilterCriteria};

const BEERS_PATH: &str = "/beers";
const RANDOM_PATH: &str = "/beers/random";

/// Paged listing, batch-by-id and random pick over a [`CatalogTransport`].
///
/// Nothing is cached here; every call reaches the transport.
#[derive(Debug)]
pub struct CatalogFetcher<T = HttpTransport> {
    transport: T,
}

impl CatalogFetcher<HttpTransport> {
    pub fn http(config: CatalogConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: CatalogTransport> CatalogFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches one listing page for an already built query.
    ///
    /// Any non-success status is returned as an error; substituting an
    /// empty list is left to the caller.
    pub async fn list_page(&self, query: &CanonicalQuery) -> Result<Vec<Beer>, CatalogError> {
        let response = self.transport.get(BEERS_PATH, query).await?;
        let body = success_body(response)?;
        let beers = decode_list(&body)?;
        debug!(count = beers.len(), "Fetched catalog page");
        Ok(beers)
    }

    /// Builds the query for `criteria` and fetches it.
    pub async fn list(&self, criteria: &FilterCriteria) -> Result<Vec<Beer>, CatalogError> {
        self.list_page(&query::build(criteria)).await
    }

    /// Fetches the given beers in a single page of `per_page` entries.
    ///
    /// An empty id set returns immediately without touching the network.
    pub async fn fetch_by_ids(
        &self,
        ids: &[BeerId],
        per_page: u32,
    ) -> Result<Vec<Beer>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let criteria = FilterCriteria::new()
            .with_ids(ids.iter().copied())
            .with_page(1, page_size_covering(per_page, ids.len()));
        self.list(&criteria).await
    }

    /// Asks the catalog for one random beer.
    ///
    /// A body that is not an object, or that lacks an id or a name, is
    /// "no usable result" and yields `Ok(None)`. HTTP failures, including the
    /// distinguished 404, are errors.
    pub async fn fetch_random(&self) -> Result<Option<Beer>, CatalogError> {
        let response = self
            .transport
            .get(RANDOM_PATH, &CanonicalQuery::default())
            .await?;
        let body = success_body(response)?;

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Random beer payload is not JSON");
                return Ok(None);
            }
        };
        if !has_identity_and_name(&value) {
            warn!(payload = %value, "Random beer data is malformed or incomplete");
            return Ok(None);
        }
        match serde_json::from_value::<Beer>(value) {
            Ok(beer) => {
                info!(id = %beer.id, name = %beer.name, "Fetched random beer");
                Ok(Some(beer))
            }
            Err(e) => {
                warn!(error = %e, "Random beer payload did not decode");
                Ok(None)
            }
        }
    }
}

/// Page size that fits `count` entries, never below `floor`. Saturates at
/// `u32::MAX`.
pub(crate) fn page_size_covering(floor: u32, count: usize) -> u32 {
    floor.max(u32::try_from(count).unwrap_or(u32::MAX))
}

fn success_body(response: RawResponse) -> Result<String, CatalogError> {
    if response.is_success() {
        Ok(response.body)
    } else {
        Err(CatalogError::from_status(response.status, response.body))
    }
}

fn decode_list(body: &str) -> Result<Vec<Beer>, CatalogError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CatalogError::Format(format!("response is not JSON: {e}")))?;
    if !value.is_array() {
        return Err(CatalogError::Format(
            "expected an array of beers".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| CatalogError::Format(format!("array entry is not a beer: {e}")))
}

fn has_identity_and_name(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let has_id = object
        .get("id")
        .and_then(Value::as_u64)
        .is_some_and(|id| id != 0);
    let has_name = object
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    has_id && has_name
}
