//! Storage capability behind the preference store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use super::sqlite::SqliteBackend;
use crate::error::StorageError;

/// A key/value medium the preference snapshot is persisted in.
pub trait PreferenceBackend: Send + Sync {
    /// Identity of the underlying medium. Two backends over the same medium
    /// must report the same id.
    fn location_id(&self) -> String;

    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-local backend; clones of the owning `Arc` share contents.
#[derive(Debug)]
pub struct MemoryBackend {
    id: u64,
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            id: NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed),
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn location_id(&self) -> String {
        format!("memory:{}", self.id)
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// Result of checking for a storage capability.
///
/// Hosts without persistent storage (headless renders, sandboxed
/// previews) pass `Unavailable` and the store degrades to no-ops.
#[derive(Clone)]
pub enum StorageAccess {
    Available(Arc<dyn PreferenceBackend>),
    Unavailable { reason: String },
}

impl StorageAccess {
    pub fn memory() -> Self {
        Self::Available(Arc::new(MemoryBackend::new()))
    }

    /// Opens (or recovers) the SQLite database at `path`.
    ///
    /// Failure to open is reported as `Unavailable` rather than an error.
    pub fn sqlite(path: &Path) -> Self {
        match SqliteBackend::open_or_recover(path) {
            Ok(backend) => Self::Available(Arc::new(backend)),
            Err(e) => {
                warn!(?path, error = ?e, "Preference database unavailable");
                Self::Unavailable {
                    reason: format!("{e:#}"),
                }
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl std::fmt::Debug for StorageAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(backend) => f
                .debug_tuple("Available")
                .field(&backend.location_id())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
