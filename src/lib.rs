//! hopshelf - data layer for browsing a remote beer catalog.
//!
//! - `catalog` - query building, fetching, stale-response fencing, browse sessions
//! - `preferences` - local favorites, ratings and notes with change notification
//! - `favorites` - favorite ids joined with catalog records
//! - `layout` - tile sizing for the gallery grid
//! - `models` - beer records, filter criteria, preference records

pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod layout;
pub mod logging;
pub mod models;
pub mod preferences;

pub use catalog::{
    build_query, BrowseState, CanonicalQuery, CatalogBrowser, CatalogFetcher, CatalogTransport,
    FenceToken, HttpTransport, LoadOutcome, RawResponse, RequestFence,
};
pub use config::{CatalogConfig, PreferenceConfig};
pub use error::{CatalogError, FilterError, StorageError};
pub use favorites::FavoritesAggregator;
pub use layout::{arrange, layout_for, GalleryTile, GridSpan, TileLayout, TileVariant};
pub use models::{
    Beer, BeerId, BeerPreferences, BrewDate, FilterCriteria, PreferenceRecord, PreferenceSnapshot,
};
pub use preferences::{
    MemoryBackend, PreferenceBackend, PreferenceChange, PreferenceStore, PreferenceSubscription,
    SqliteBackend, StorageAccess, StoreInstanceId,
};
