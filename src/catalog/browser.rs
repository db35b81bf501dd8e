//! Browse session: the filtered, paged listing a view is showing.
//!
//! Filter and page changes may overlap while requests are in flight. Each
//! load takes a [`FenceToken`](super::FenceToken) and its response is only
//! applied if no newer load was issued meanwhile.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::fence::{FenceToken, RequestFence};
use super::fetcher::CatalogFetcher;
use super::transport::{CatalogTransport, HttpTransport};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::CatalogError;
use crate::layout::{self, TileLayout};
use crate::models::{Beer, FilterCriteria};

/// What the listing currently shows.
///
/// `Empty` and `Failed` are distinct so a view can tell "no beers matched"
/// apart from "the catalog could not be reached".
#[derive(Debug, Clone, Default)]
pub enum BrowseState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Beer>),
    Empty,
    Failed(Arc<CatalogError>),
}

impl BrowseState {
    pub fn beers(&self) -> &[Beer] {
        match self {
            Self::Loaded(beers) => beers,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Whether a finished load was applied to the visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was issued before this one resolved.
    Superseded,
}

#[derive(Debug, Default)]
struct Session {
    filters: FilterCriteria,
    page: u32,
    state: BrowseState,
}

pub struct CatalogBrowser<T = HttpTransport> {
    fetcher: Arc<CatalogFetcher<T>>,
    fence: RequestFence,
    page_size: u32,
    session: Mutex<Session>,
}

impl<T: CatalogTransport> CatalogBrowser<T> {
    pub fn new(fetcher: Arc<CatalogFetcher<T>>) -> Self {
        Self {
            fetcher,
            fence: RequestFence::new(),
            page_size: DEFAULT_PAGE_SIZE,
            session: Mutex::new(Session {
                page: 1,
                ..Session::default()
            }),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Replaces the active filters and goes back to the first page.
    ///
    /// Pagination and id overrides in `filters` are ignored; the session
    /// owns paging.
    pub async fn apply_filters(&self, filters: FilterCriteria) -> LoadOutcome {
        let (token, criteria) = self.begin(|session| {
            session.filters = FilterCriteria {
                ids: None,
                ..filters.without_paging()
            };
            session.page = 1;
        });
        self.load(token, criteria).await
    }

    /// Clears every filter, as the reset button does.
    pub async fn reset_filters(&self) -> LoadOutcome {
        self.apply_filters(FilterCriteria::default()).await
    }

    /// Moves to `page` (1-based) with the current filters.
    pub async fn goto_page(&self, page: u32) -> LoadOutcome {
        let (token, criteria) = self.begin(|session| session.page = page.max(1));
        self.load(token, criteria).await
    }

    /// Re-issues the current request, e.g. after a failure.
    pub async fn reload(&self) -> LoadOutcome {
        let (token, criteria) = self.begin(|_| {});
        self.load(token, criteria).await
    }

    pub fn state(&self) -> BrowseState {
        self.session.lock().state.clone()
    }

    pub fn filters(&self) -> FilterCriteria {
        self.session.lock().filters.clone()
    }

    pub fn page(&self) -> u32 {
        self.session.lock().page
    }

    /// Loaded beers paired with their gallery layout.
    pub fn tiles(&self) -> Vec<(Beer, TileLayout)> {
        let session = self.session.lock();
        layout::arrange(session.state.beers())
            .into_iter()
            .map(|tile| (tile.item.clone(), tile.layout))
            .collect()
    }

    fn request_criteria(&self, session: &Session) -> FilterCriteria {
        session.filters.clone().with_page(session.page, self.page_size)
    }

    /// Changes the session and issues the token for the matching request
    /// under one lock, so the newest token always belongs to the filters
    /// and page the session shows.
    fn begin<F>(&self, change: F) -> (FenceToken, FilterCriteria)
    where
        F: FnOnce(&mut Session),
    {
        let mut session = self.session.lock();
        change(&mut session);
        let token = self.fence.issue();
        session.state = BrowseState::Loading;
        (token, self.request_criteria(&session))
    }

    async fn load(&self, token: FenceToken, criteria: FilterCriteria) -> LoadOutcome {
        debug!(token = token.value(), page = ?criteria.page, "Loading catalog page");

        let result = self.fetcher.list(&criteria).await;

        let mut session = self.session.lock();
        if !self.fence.is_latest(token) {
            debug!(token = token.value(), "Discarding superseded catalog response");
            return LoadOutcome::Superseded;
        }
        session.state = match result {
            Ok(beers) if beers.is_empty() => BrowseState::Empty,
            Ok(beers) => BrowseState::Loaded(beers),
            Err(e) => {
                warn!(error = %e, "Failed to load beers");
                BrowseState::Failed(Arc::new(e))
            }
        };
        LoadOutcome::Applied
    }
}
