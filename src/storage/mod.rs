//! Storage layer for dexa-rs.
//!
//! Provides persistent blob storage for index snapshots using `SQLite`.
//! The store is deliberately dumb: opaque bytes keyed by name, so the
//! index's wire format stays the index's business.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStore;
pub use traits::{BlobStore, StoreStats};

/// Default database file name.
pub const DEFAULT_DB_NAME: &str = "dexa-state.db";

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".dexa/dexa-state.db";
