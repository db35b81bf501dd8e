use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::BeerId;

/// Local annotations a user keeps for one beer.
///
/// Every field is optional; `None` means unset. The same type doubles as a
/// partial update: `Some` fields overwrite, `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PreferenceRecord {
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    pub fn rated(rating: f64) -> Self {
        Self {
            rating: Some(rating),
            ..Self::default()
        }
    }

    pub fn noted(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    /// Shallow merge: fields set in `patch` replace ours.
    pub fn merge(&mut self, patch: &PreferenceRecord) {
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = Some(is_favorite);
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }
}

/// Per-item view handed to a card: favorite as a plain flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeerPreferences {
    pub is_favorite: bool,
    pub rating: Option<f64>,
    pub notes: Option<String>,
}

impl From<Option<PreferenceRecord>> for BeerPreferences {
    fn from(record: Option<PreferenceRecord>) -> Self {
        let record = record.unwrap_or_default();
        Self {
            is_favorite: record.is_favorite(),
            rating: record.rating,
            notes: record.notes,
        }
    }
}

/// The whole persisted mapping of beer id to preference record.
///
/// Keys are the id rendered as a decimal string, which is also how the
/// snapshot is stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSnapshot {
    records: BTreeMap<String, PreferenceRecord>,
}

impl PreferenceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: BeerId) -> Option<&PreferenceRecord> {
        self.records.get(&id.to_string())
    }

    pub fn insert(&mut self, id: BeerId, record: PreferenceRecord) {
        self.records.insert(id.to_string(), record);
    }

    /// Ids whose record has `isFavorite == true`, ascending.
    ///
    /// Keys that are not numeric ids are skipped.
    pub fn favorite_ids(&self) -> Vec<BeerId> {
        let mut ids: Vec<BeerId> = self
            .records
            .iter()
            .filter(|(_, record)| record.is_favorite == Some(true))
            .filter_map(|(key, _)| match key.parse::<BeerId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(key = %key, "Skipping favorite with non-numeric id");
                    None
                }
            })
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PreferenceRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(BeerId, PreferenceRecord)> for PreferenceSnapshot {
    fn from_iter<I: IntoIterator<Item = (BeerId, PreferenceRecord)>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|(id, record)| (id.to_string(), record))
                .collect(),
        }
    }
}
