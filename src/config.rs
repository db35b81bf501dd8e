//! Runtime configuration for the catalog client and preference storage.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Base URL of the public catalog API.
pub const DEFAULT_API_BASE: &str = "https://punkapi.online/v3";

/// Storage key the preference snapshot lives under.
pub const DEFAULT_STORAGE_KEY: &str = "userBeerCollectionData";

/// Page size used by the browse view.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Smallest page size requested when loading favorites.
pub const MIN_FAVORITES_PAGE_SIZE: u32 = 10;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`HttpTransport`](crate::catalog::HttpTransport).
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CatalogConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an API path such as `/beers/random`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Where preferences are persisted.
#[derive(Debug, Clone)]
pub struct PreferenceConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
}

impl PreferenceConfig {
    /// Database under the platform data directory with the default key.
    pub fn default_location() -> Result<Self> {
        Ok(Self {
            db_path: default_db_path()?,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        })
    }
}

/// Returns the default database path based on XDG directories.
pub fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "hopshelf")
        .context("Failed to determine project directories")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    Ok(data_dir.join("preferences.sqlite"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = CatalogConfig::default().with_base_url("http://localhost:8080/v3/");
        assert_eq!(config.base_url, "http://localhost:8080/v3");
        assert_eq!(config.endpoint("/beers"), "http://localhost:8080/v3/beers");
        assert_eq!(config.endpoint("beers/random"), "http://localhost:8080/v3/beers/random");
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("hopshelf/"));
    }
}
