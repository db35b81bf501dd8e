//! The user's favorite beers, resolved against the catalog.

use tracing::{debug, info};

use crate::catalog::fetcher::page_size_covering;
use crate::catalog::{CatalogFetcher, CatalogTransport, HttpTransport};
use crate::config::MIN_FAVORITES_PAGE_SIZE;
use crate::error::CatalogError;
use crate::models::{Beer, BeerId};
use crate::preferences::PreferenceStore;

/// Joins the locally stored favorite ids with full catalog records.
pub struct FavoritesAggregator<'a, T = HttpTransport> {
    store: &'a PreferenceStore,
    fetcher: &'a CatalogFetcher<T>,
}

impl<'a, T: CatalogTransport> FavoritesAggregator<'a, T> {
    pub fn new(store: &'a PreferenceStore, fetcher: &'a CatalogFetcher<T>) -> Self {
        Self { store, fetcher }
    }

    /// Ids currently flagged as favorite, ascending.
    pub fn favorite_ids(&self) -> Vec<BeerId> {
        self.store.favorite_ids()
    }

    /// Fetches every favorite in one request.
    ///
    /// With no favorites this returns an empty list and makes no request.
    /// Fetch failures are returned as is; ids the catalog no longer knows
    /// are simply absent from the result.
    pub async fn load_favorites(&self) -> Result<Vec<Beer>, CatalogError> {
        let ids = self.favorite_ids();
        if ids.is_empty() {
            debug!("No favorites to load");
            return Ok(Vec::new());
        }

        let per_page = page_size_covering(MIN_FAVORITES_PAGE_SIZE, ids.len());
        let beers = self.fetcher.fetch_by_ids(&ids, per_page).await?;
        info!(requested = ids.len(), returned = beers.len(), "Loaded favorites");
        Ok(beers)
    }
}
