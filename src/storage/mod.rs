//! # Storage Module
//!
//! The Local Entity Store: persistent key-value storage for every Verdant
//! entity.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  EntityStore (typed layer)                                      │    │
//! │  │  ─────────────────────────                                      │    │
//! │  │                                                                 │    │
//! │  │  • load(key)              - strict typed read (decode error)    │    │
//! │  │  • load_or_seed(key, def) - seed default on miss/corruption     │    │
//! │  │  • save(key, value)       - serialize and write synchronously   │    │
//! │  │  • update(key, def, f)    - whole-entity read-modify-write      │    │
//! │  │  • remove / exists / keys_with_prefix                           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  Database (SQLite key-value table)                              │    │
//! │  │  ─────────────────────────────────                              │    │
//! │  │                                                                 │    │
//! │  │  entries(key PRIMARY KEY, value JSON-text, updated_at)          │    │
//! │  │  In-memory for tests, file-backed for production.               │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No transactional guarantees exist across keys: the store is
//! last-write-wins per key, and multi-key operations (like deleting a
//! channel and its message list) are two independent writes.

mod database;
mod schema;
mod store;

pub use database::Database;
pub use store::{keys, EntityStore};

use crate::error::Result;

/// Storage configuration
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Path to the database file (None for in-memory)
    pub database_path: Option<String>,
}

/// Initialize the storage system
pub fn init(config: StorageConfig) -> Result<EntityStore> {
    let db = Database::open(config.database_path.as_deref())?;
    Ok(EntityStore::new(db))
}
