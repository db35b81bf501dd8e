//! Local, persistent per-beer preferences.
//!
//! - `store` - `PreferenceStore`, the only reader/writer of the snapshot
//! - `backend` - storage capability (`StorageAccess`) and in-memory backend
//! - `sqlite` - SQLite key/value backend
//! - `notify` - cross-instance change notification

pub mod backend;
pub mod notify;
pub mod sqlite;
pub mod store;

pub use backend::{MemoryBackend, PreferenceBackend, StorageAccess};
pub use notify::{PreferenceChange, PreferenceSubscription, StoreInstanceId};
pub use sqlite::SqliteBackend;
pub use store::PreferenceStore;
