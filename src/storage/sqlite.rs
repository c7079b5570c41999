//! `SQLite` blob store implementation.
//!
//! Provides persistent blob storage using `SQLite` with schema versioning.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{BlobStore, StoreStats};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// SQLite-based blob store.
///
/// # Examples
///
/// ```no_run
/// use dexa_rs::storage::{BlobStore, SqliteStore};
///
/// let mut store = SqliteStore::open("dexa-state.db").unwrap();
/// store.init().unwrap();
/// ```
pub struct SqliteStore {
    /// `SQLite` connection.
    conn: Connection,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// Creates the parent directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;

        // WAL mode for better concurrent access (returns a row, use query_row)
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// Useful for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets the current schema version.
    fn schema_version(&self) -> Result<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    /// Returns current Unix timestamp.
    #[allow(clippy::cast_possible_wrap)]
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    /// Fails with `NotInitialized` unless the schema exists.
    fn require_initialized(&self) -> Result<()> {
        if self.is_initialized()? {
            Ok(())
        } else {
            Err(StorageError::NotInitialized.into())
        }
    }
}

impl BlobStore for SqliteStore {
    fn init(&mut self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(StorageError::from)?;

        match self.schema_version()? {
            None => {
                self.conn
                    .execute(SET_VERSION_SQL, params![CURRENT_SCHEMA_VERSION.to_string()])
                    .map_err(StorageError::from)?;
            }
            Some(v) if v > CURRENT_SCHEMA_VERSION => {
                return Err(StorageError::Migration(format!(
                    "store schema v{v} is newer than supported v{CURRENT_SCHEMA_VERSION}"
                ))
                .into());
            }
            Some(_) => {}
        }

        tracing::debug!(path = ?self.path, "store initialized");
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.require_initialized()?;
        let now = Self::now();
        self.conn
            .execute(
                "INSERT INTO blobs (key, value, size, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     size = excluded.size,
                     updated_at = excluded.updated_at",
                params![key, bytes, bytes.len() as i64, now],
            )
            .map_err(StorageError::from)?;

        tracing::debug!(key, size = bytes.len(), "blob stored");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.require_initialized()?;
        let bytes: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT value FROM blobs WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StorageError::from)?;
        Ok(bytes)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.require_initialized()?;
        self.conn
            .execute("DELETE FROM blobs WHERE key = ?1", params![key])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        self.require_initialized()?;
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM blobs ORDER BY created_at, key")
            .map_err(StorageError::from)?;

        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(StorageError::from)?;

        Ok(keys)
    }

    fn reset(&mut self) -> Result<()> {
        self.require_initialized()?;
        self.conn
            .execute("DELETE FROM blobs", [])
            .map_err(StorageError::from)?;
        tracing::info!("store reset");
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats> {
        self.require_initialized()?;
        let (blob_count, total_bytes): (i64, Option<i64>) = self
            .conn
            .query_row("SELECT COUNT(*), SUM(size) FROM blobs", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(StorageError::from)?;

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len());

        Ok(StoreStats {
            blob_count: blob_count as usize,
            total_bytes: total_bytes.unwrap_or(0) as usize,
            schema_version: self.schema_version()?.unwrap_or(0),
            db_size,
        })
    }
}
