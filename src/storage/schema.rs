//! Database schema definitions.
//!
//! Contains SQL schema and migration logic for the dexa `SQLite` database.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL schema for initial database setup.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Opaque blobs keyed by name (index snapshots live here)
CREATE TABLE IF NOT EXISTS blobs (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    size INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
";

/// SQL to check whether the schema exists.
pub const CHECK_SCHEMA_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'blobs'";

/// SQL to read the stored schema version.
pub const GET_VERSION_SQL: &str = "SELECT value FROM schema_info WHERE key = 'version'";

/// SQL to write the schema version.
pub const SET_VERSION_SQL: &str =
    "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?1)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sql_creates_tables() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();

        let count: i64 = conn.query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_schema_sql_idempotent() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
    }

    #[test]
    fn test_version_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute(SET_VERSION_SQL, rusqlite::params!["1"]).unwrap();

        let version: String = conn.query_row(GET_VERSION_SQL, [], |row| row.get(0)).unwrap();
        assert_eq!(version, "1");
    }
}
