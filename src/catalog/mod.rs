//! Remote catalog access.
//!
//! - `query` - canonical query building from filter criteria
//! - `transport` - the HTTP seam (`reqwest` in production)
//! - `fetcher` - list / by-id / random retrieval and outcome classification
//! - `fence` - request tokens for discarding stale responses
//! - `browser` - fenced browse session over filters and pages

pub mod browser;
pub mod fence;
pub mod fetcher;
pub mod query;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowseState, CatalogBrowser, LoadOutcome};
pub use fence::{FenceToken, RequestFence};
pub use fetcher::CatalogFetcher;
pub use query::{build as build_query, CanonicalQuery};
pub use transport::{CatalogTransport, HttpTransport, RawResponse};
