use std::sync::Arc;

use tracing::{debug, error, warn};

use super::backend::{PreferenceBackend, StorageAccess};
use super::notify::{self, LocationShared, PreferenceChange, PreferenceSubscription, StoreInstanceId};
use crate::config::PreferenceConfig;
use crate::error::StorageError;
use crate::models::{BeerId, BeerPreferences, PreferenceRecord, PreferenceSnapshot};

struct Attached {
    backend: Arc<dyn PreferenceBackend>,
    shared: Arc<LocationShared>,
}

/// Persistent per-beer preferences.
///
/// Every instance opened on the same backend and key shares one update lock
/// and one set of subscribers, so an update through any of them is seen by
/// the others' subscriptions. Storage failures are logged, never returned:
/// reads then look empty, and an update whose read fails is not applied.
pub struct PreferenceStore {
    attached: Option<Attached>,
    key: String,
    instance: StoreInstanceId,
}

impl PreferenceStore {
    pub fn new(access: StorageAccess, key: impl Into<String>) -> Self {
        let key = key.into();
        let attached = match access {
            StorageAccess::Available(backend) => {
                let location = format!("{}#{}", backend.location_id(), key);
                debug!(%location, "Attached preference store");
                Some(Attached {
                    shared: notify::location(&location),
                    backend,
                })
            }
            StorageAccess::Unavailable { reason } => {
                warn!(%reason, "Preference storage unavailable, preferences will not persist");
                None
            }
        };
        Self {
            attached,
            key,
            instance: StoreInstanceId::next(),
        }
    }

    /// Opens the SQLite store described by `config`.
    pub fn open(config: &PreferenceConfig) -> Self {
        Self::new(StorageAccess::sqlite(&config.db_path), config.storage_key.clone())
    }

    pub fn is_available(&self) -> bool {
        self.attached.is_some()
    }

    pub fn instance_id(&self) -> StoreInstanceId {
        self.instance
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn get_all(&self) -> PreferenceSnapshot {
        let Some(attached) = &self.attached else {
            return PreferenceSnapshot::new();
        };
        self.read_snapshot(attached.backend.as_ref())
    }

    pub fn get(&self, id: BeerId) -> Option<PreferenceRecord> {
        self.get_all().get(id).cloned()
    }

    pub fn preferences_for(&self, id: BeerId) -> BeerPreferences {
        BeerPreferences::from(self.get(id))
    }

    pub fn favorite_ids(&self) -> Vec<BeerId> {
        self.get_all().favorite_ids()
    }

    /// Shallow-merges `patch` into the record for `id`.
    ///
    /// Returns the record as committed, or `None` when nothing could be
    /// persisted. Re-applying the same patch leaves the stored record as is.
    pub fn update(&self, id: BeerId, patch: &PreferenceRecord) -> Option<PreferenceRecord> {
        self.modify(id, |record| record.merge(patch))
    }

    /// Flips the favorite flag, an absent flag counting as `false`.
    /// Returns the new flag.
    pub fn toggle_favorite(&self, id: BeerId) -> Option<bool> {
        self.modify(id, |record| record.is_favorite = Some(!record.is_favorite()))
            .map(|record| record.is_favorite())
    }

    pub fn set_rating(&self, id: BeerId, rating: f64) -> Option<PreferenceRecord> {
        self.update(id, &PreferenceRecord::rated(rating))
    }

    pub fn set_notes(&self, id: BeerId, notes: impl Into<String>) -> Option<PreferenceRecord> {
        self.update(id, &PreferenceRecord::noted(notes))
    }

    /// Clears every record at this location.
    pub fn reset(&self) -> bool {
        let Some(attached) = &self.attached else {
            return false;
        };
        let _guard = attached.shared.write_lock.lock();
        if let Err(e) = attached.backend.remove(&self.key) {
            error!(error = %e, key = %self.key, "Failed to reset preferences");
            return false;
        }
        debug!(key = %self.key, "Reset preferences");
        attached.shared.publish(&PreferenceChange {
            origin: self.instance,
            snapshot: PreferenceSnapshot::new(),
        });
        true
    }

    /// Subscribes to changes committed through any instance at this
    /// location, this one included.
    pub fn subscribe(&self) -> PreferenceSubscription {
        match &self.attached {
            Some(attached) => attached.shared.subscribe(),
            None => PreferenceSubscription::closed(),
        }
    }

    fn modify<F>(&self, id: BeerId, apply: F) -> Option<PreferenceRecord>
    where
        F: FnOnce(&mut PreferenceRecord),
    {
        let attached = self.attached.as_ref()?;
        let _guard = attached.shared.write_lock.lock();

        let mut snapshot = match self.load_snapshot(attached.backend.as_ref()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, %id, "Failed to read preferences, update not applied");
                return None;
            }
        };
        let existing = snapshot.get(id).cloned();
        let mut record = existing.clone().unwrap_or_default();
        apply(&mut record);

        if existing.as_ref() == Some(&record) {
            return Some(record);
        }
        snapshot.insert(id, record.clone());

        if let Err(e) = self.write_snapshot(attached.backend.as_ref(), &snapshot) {
            error!(error = %e, %id, "Failed to persist preferences");
            return None;
        }
        debug!(%id, ?record, "Updated preferences");
        attached.shared.publish(&PreferenceChange {
            origin: self.instance,
            snapshot,
        });
        Some(record)
    }

    fn read_snapshot(&self, backend: &dyn PreferenceBackend) -> PreferenceSnapshot {
        self.load_snapshot(backend).unwrap_or_else(|e| {
            warn!(error = %e, key = %self.key, "Failed to read preferences, treating as empty");
            PreferenceSnapshot::new()
        })
    }

    /// Reads the stored snapshot. Backend failures are errors; a value that
    /// does not parse reads as empty and is replaced by the next write.
    fn load_snapshot(
        &self,
        backend: &dyn PreferenceBackend,
    ) -> Result<PreferenceSnapshot, StorageError> {
        let raw = match backend.read(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(PreferenceSnapshot::new()),
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, key = %self.key, "Unreadable preferences, treating as empty");
            PreferenceSnapshot::new()
        }))
    }

    fn write_snapshot(
        &self,
        backend: &dyn PreferenceBackend,
        snapshot: &PreferenceSnapshot,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(snapshot)?;
        backend.write(&self.key, &raw)
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("key", &self.key)
            .field("available", &self.is_available())
            .field("instance", &self.instance)
            .finish()
    }
}
