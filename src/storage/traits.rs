//! Blob store trait definition.
//!
//! The index persists through this seam: opaque blobs keyed by name. The
//! store does not know what an index is, and the index does not know what
//! a database is.

use crate::error::Result;
use serde::Serialize;

/// Trait for persistent blob stores.
///
/// Implementations hold opaque byte blobs under string keys. All
/// operations should be atomic where the backend allows it.
pub trait BlobStore: Send {
    /// Initializes the store (creates schema, runs migrations).
    ///
    /// Idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or migration fails.
    fn init(&mut self) -> Result<()>;

    /// Checks if the store is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Stores a blob under a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Retrieves a blob by key.
    ///
    /// Returns `None` if no blob is stored under the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deletes a blob by key.
    ///
    /// Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Lists all stored keys in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_keys(&self) -> Result<Vec<String>>;

    /// Deletes all stored blobs but preserves the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn reset(&mut self) -> Result<()>;

    /// Gets store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StoreStats>;
}

/// Store statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Number of blobs stored.
    pub blob_count: usize,
    /// Total size of all blobs in bytes.
    pub total_bytes: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
