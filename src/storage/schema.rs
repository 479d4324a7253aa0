//! # Database Schema
//!
//! SQL schema definitions for the Verdant key-value area.
//!
//! ## Schema Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DATABASE SCHEMA                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐      ┌─────────────────┐                           │
//! │  │     entries     │      │ schema_version  │                           │
//! │  ├─────────────────┤      ├─────────────────┤                           │
//! │  │ key             │      │ version         │                           │
//! │  │ value           │      └─────────────────┘                           │
//! │  │ updated_at      │                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  One row per entity key; `value` holds the entity's UTF-8 JSON          │
//! │  document. Entity shapes live above this layer; the database knows      │
//! │  nothing about courses, channels, or users.                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Key-value entries
-- One JSON document per entity key (cursos, categories, messages_<id>, ...)
CREATE TABLE IF NOT EXISTS entries (
    -- Entity key, e.g. "cursos" or "messages_general"
    key TEXT PRIMARY KEY,
    -- UTF-8 JSON document
    value TEXT NOT NULL,
    -- Unix timestamp (seconds) of the last write
    updated_at INTEGER NOT NULL
);
"#;
