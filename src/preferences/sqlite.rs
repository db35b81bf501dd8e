//! SQLite-backed key/value storage for preference snapshots.
//!
//! One row per storage key; the value is the serialized snapshot. The
//! database runs in WAL mode so several processes can share the file.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::backend::PreferenceBackend;
use crate::error::StorageError;

pub struct SqliteBackend {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteBackend {
    /// Opens or creates the database at the specified path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )
        .context("Failed to configure SQLite pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS preferences (
                storage_key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            ",
        )
        .context("Failed to create preferences table")?;

        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        info!("Opened preference store at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Opens the database, moving an unreadable file aside and starting
    /// fresh if the first attempt fails.
    pub fn open_or_recover(path: &Path) -> Result<Self> {
        match Self::open(path) {
            Ok(backend) => Ok(backend),
            Err(e) if path.is_file() => {
                warn!(?path, error = ?e, "Handling potential database corruption");
                let backup_path = path.with_extension("sqlite.corrupted");
                std::fs::rename(path, &backup_path).with_context(|| {
                    format!("Failed to backup corrupted database to {:?}", backup_path)
                })?;
                warn!("Backed up corrupted database to {:?}", backup_path);
                Self::open(path)
            }
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish()
    }
}

impl PreferenceBackend for SqliteBackend {
    fn location_id(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .lock()
            .query_row(
                "SELECT value FROM preferences WHERE storage_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.lock().execute(
            "INSERT INTO preferences (storage_key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(storage_key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Self::now()],
        )?;
        debug!(key, bytes = value.len(), "Wrote preference snapshot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .lock()
            .execute("DELETE FROM preferences WHERE storage_key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_create() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("prefs.sqlite");

        let backend = SqliteBackend::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert!(backend.read("missing").unwrap().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("prefs.sqlite");

        {
            let backend = SqliteBackend::open(&db_path).unwrap();
            backend.write("k", r#"{"1":{"rating":3}}"#).unwrap();
            backend.write("k", r#"{"1":{"rating":5}}"#).unwrap();
        }

        let backend = SqliteBackend::open(&db_path).unwrap();
        assert_eq!(
            backend.read("k").unwrap().as_deref(),
            Some(r#"{"1":{"rating":5}}"#)
        );
        backend.remove("k").unwrap();
        assert!(backend.read("k").unwrap().is_none());
    }

    #[test]
    fn test_same_file_same_location() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("prefs.sqlite");
        let a = SqliteBackend::open(&db_path).unwrap();
        let b = SqliteBackend::open(&db_path).unwrap();
        assert_eq!(a.location_id(), b.location_id());
    }

    #[test]
    fn test_recover_from_garbage_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("prefs.sqlite");
        std::fs::write(&db_path, vec![0xAB; 4096]).unwrap();

        let backend = SqliteBackend::open_or_recover(&db_path).unwrap();
        backend.write("k", "{}").unwrap();
        assert!(db_path.with_extension("sqlite.corrupted").exists());
    }
}
