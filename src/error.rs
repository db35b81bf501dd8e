//! Error types shared across the crate.

use thiserror::Error;

/// Failure of a catalog retrieval.
///
/// `Remote` and `NotFound` both mean the API answered with a non-success
/// status; `NotFound` is split out so callers can word a missing endpoint
/// differently from a generic failure.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog responded with status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("catalog endpoint not found (404): {body}")]
    NotFound { body: String },

    #[error("unexpected catalog payload: {0}")]
    Format(String),

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl CatalogError {
    /// Classifies a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 404 {
            Self::NotFound { body }
        } else {
            Self::Remote { status, body }
        }
    }

    /// HTTP status for errors the API itself reported.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Format(_) | Self::Transport(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure of the local preference medium.
///
/// Never surfaced past [`PreferenceStore`](crate::preferences::PreferenceStore);
/// the store logs it and behaves as if storage were empty.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored preferences are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// Rejected filter input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u8),

    #[error("year must be four digits, got {0:?}")]
    InvalidYear(String),

    #[error("date must look like MM/YYYY, got {0:?}")]
    InvalidDate(String),
}
