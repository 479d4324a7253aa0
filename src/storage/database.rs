//! # Database
//!
//! SQLite-backed key-value area.
//!
//! This is the persistence layer under the entity store: one row per entity
//! key, the value being the entity's JSON document. It deliberately exposes
//! only string get/set/delete; typed decoding happens in
//! [`super::EntityStore`], so this layer stays shape-agnostic.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DATABASE OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │   EntityStore   │  Typed JSON accessors                              │
//! │  └────────┬────────┘                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │    Database     │  String key → JSON document                        │
//! │  │   (this file)   │  - get / set / delete / exists                     │
//! │  │                 │  - prefix scans for per-channel keys               │
//! │  └────────┬────────┘                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │   SQLite DB     │  - In-memory for tests                             │
//! │  │                 │  - File for production                             │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;

use super::schema;
use crate::error::{Error, Result};

/// The key-value database handle
///
/// Wraps a SQLite connection and provides string-level access to entity
/// documents. All operations are synchronous and run to completion; two
/// handles writing the same key produce last-write-wins.
#[derive(Clone)]
pub struct Database {
    /// The underlying SQLite connection
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database
    ///
    /// If path is None, creates an in-memory database (useful for testing).
    pub fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseError(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseError(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseError(format!("Failed to create tables: {}", e)))?;

                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| {
                    Error::DatabaseError(format!("Failed to set schema version: {}", e))
                })?;

                tracing::info!("Store schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) => {
                // No store-level migrations yet; entity-level migrations
                // (e.g. event time fields) run above this layer.
                tracing::debug!("Store schema version: {}", v);
            }
        }

        Ok(())
    }

    /// Get the raw JSON document stored under a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();

        let result = conn.query_row(
            "SELECT value FROM entries WHERE key = ?",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(format!(
                "Failed to read key '{}': {}",
                key, e
            ))),
        }
    }

    /// Store a JSON document under a key, replacing any previous value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        conn.execute(
            "INSERT INTO entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .map_err(|e| Error::DatabaseError(format!("Failed to write key '{}': {}", key, e)))?;

        Ok(())
    }

    /// Delete a key. Returns whether a row was removed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let affected = conn
            .execute("DELETE FROM entries WHERE key = ?", params![key])
            .map_err(|e| Error::DatabaseError(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(affected > 0)
    }

    /// Check if a key exists
    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// List all keys starting with a prefix, sorted
    ///
    /// Used to rebuild cross-entity views (e.g. every `messages_` key) by
    /// scanning, since no references between entities are stored.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();

        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let mut stmt = conn
            .prepare("SELECT key FROM entries WHERE key LIKE ? ESCAPE '\\' ORDER BY key")
            .map_err(|e| Error::DatabaseError(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![pattern], |row| row.get::<_, String>(0))
            .map_err(|e| Error::DatabaseError(format!("Failed to scan keys: {}", e)))?;

        let mut keys = Vec::new();
        for key in rows {
            keys.push(
                key.map_err(|e| Error::DatabaseError(format!("Failed to read key row: {}", e)))?,
            );
        }

        Ok(keys)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_db() -> Database {
        Database::open(None).unwrap()
    }

    #[test]
    fn test_set_get_delete() {
        let db = open_test_db();

        assert_eq!(db.get("user").unwrap(), None);

        db.set("user", r#"{"name":"Alice"}"#).unwrap();
        assert_eq!(db.get("user").unwrap().unwrap(), r#"{"name":"Alice"}"#);

        db.set("user", r#"{"name":"Bob"}"#).unwrap();
        assert_eq!(db.get("user").unwrap().unwrap(), r#"{"name":"Bob"}"#);

        assert!(db.delete("user").unwrap());
        assert!(!db.delete("user").unwrap());
        assert_eq!(db.get("user").unwrap(), None);
    }

    #[test]
    fn test_exists() {
        let db = open_test_db();
        assert!(!db.exists("cursos").unwrap());
        db.set("cursos", "[]").unwrap();
        assert!(db.exists("cursos").unwrap());
    }

    #[test]
    fn test_keys_with_prefix() {
        let db = open_test_db();
        db.set("messages_general", "[]").unwrap();
        db.set("messages_design-project", "[]").unwrap();
        db.set("cursos", "[]").unwrap();

        let keys = db.keys_with_prefix("messages_").unwrap();
        assert_eq!(keys, vec!["messages_design-project", "messages_general"]);
    }

    #[test]
    fn test_prefix_underscore_is_literal() {
        let db = open_test_db();
        // `_` in a LIKE pattern is a single-char wildcard; make sure the
        // scan escapes it so "messagesXgeneral" does not match.
        db.set("messagesXgeneral", "[]").unwrap();
        db.set("messages_general", "[]").unwrap();

        let keys = db.keys_with_prefix("messages_").unwrap();
        assert_eq!(keys, vec!["messages_general"]);
    }

    #[test]
    fn test_file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let path_str = path.to_str().unwrap();

        {
            let db = Database::open(Some(path_str)).unwrap();
            db.set("isAuthenticated", "\"true\"").unwrap();
        }

        let db = Database::open(Some(path_str)).unwrap();
        assert_eq!(db.get("isAuthenticated").unwrap().unwrap(), "\"true\"");
    }
}
