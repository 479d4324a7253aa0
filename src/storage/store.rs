//! # Entity Store
//!
//! Typed access to named JSON entities in the key-value area.
//!
//! Every feature in Verdant (courses, channels, messages, notifications,
//! users) persists through this one convention: a named key holding one
//! JSON-serializable entity (a scalar, a list, or a map). Reads decode into
//! explicit typed structs at this boundary; writes serialize the whole
//! value back. Updates are read-modify-write of the entire entity.
//!
//! ## Semantics
//!
//! - [`EntityStore::load`] is the strict path: malformed stored JSON is a
//!   [`Error::Decode`] naming the key, never a silent default.
//! - [`EntityStore::load_or_seed`] is the convenience path most call sites
//!   use: a missing key or a corrupt value is logged, the provided default
//!   is persisted under the key, and the default is returned.
//! - [`EntityStore::update`] loads (seeding the default), applies a pure
//!   transform in place, and saves the result. Updates are **not** atomic
//!   across store handles: two concurrent writers of the same key produce
//!   last-write-wins, silently dropping one writer's change.
//!
//! There is no state machine, no retry, no backpressure: every operation is
//! a single synchronous call that either succeeds or returns an error.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;
use crate::error::{Error, Result};

/// Key names for stored entities
pub mod keys {
    /// Current session identity
    pub const USER: &str = "user";

    /// Plaintext-credential user directory
    pub const USERS: &str = "users";

    /// Session flag; the JSON string `"true"` when logged in, absent otherwise
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";

    /// Course catalog
    pub const COURSES: &str = "cursos";

    /// Chat taxonomy (categories with their channels)
    pub const CATEGORIES: &str = "categories";

    /// Event list
    pub const EVENTS: &str = "eventos";

    /// Version marker for the event shape migration
    pub const EVENTS_SCHEMA_VERSION: &str = "eventos_schema_version";

    /// Social feed posts
    pub const FEED_POSTS: &str = "feed_posts";

    /// Notification list
    pub const NOTIFICATIONS: &str = "notificacoes";

    /// Map of lesson id → rating
    pub const LESSON_RATINGS: &str = "lessonRatings";

    /// Map of lesson id → comment list
    pub const LESSON_COMMENTS: &str = "lessonComments";

    /// Prefix for per-channel message keys
    pub const MESSAGES_PREFIX: &str = "messages_";

    /// The message-list key for one channel
    pub fn channel_messages(channel_id: &str) -> String {
        format!("{}{}", MESSAGES_PREFIX, channel_id)
    }
}

/// Typed JSON entity store over the key-value database
pub struct EntityStore {
    db: Database,
}

impl EntityStore {
    /// Create an entity store over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load and decode the entity under a key.
    ///
    /// Returns `Ok(None)` for a missing key. A present-but-malformed value
    /// is an [`Error::Decode`] naming the key.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.db.get(key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| Error::Decode {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load the entity under a key, seeding a default when absent or corrupt.
    ///
    /// The default is persisted back under the key before being returned, so
    /// the next reader sees the same data. Corruption is logged and absorbed
    /// here; callers that must surface it (session keys) use [`Self::load`].
    pub fn load_or_seed<T>(&self, key: &str, default: impl FnOnce() -> T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.db.get(key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!("Discarding malformed value under '{}': {}", key, e);
                    let value = default();
                    self.save(key, &value)?;
                    Ok(value)
                }
            },
            None => {
                let value = default();
                self.save(key, &value)?;
                Ok(value)
            }
        }
    }

    /// Serialize and store an entity under a key
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.db.set(key, &raw)
    }

    /// Read-modify-write an entity under a key.
    ///
    /// Loads the value (seeding the default when absent or corrupt), applies
    /// the transform in place, saves the result, and returns whatever the
    /// transform returned. Not atomic across store handles: concurrent
    /// writers of one key are last-write-wins.
    pub fn update<T, R>(
        &self,
        key: &str,
        default: impl FnOnce() -> T,
        transform: impl FnOnce(&mut T) -> R,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut value = self.load_or_seed(key, default)?;
        let out = transform(&mut value);
        self.save(key, &value)?;
        Ok(out)
    }

    /// Remove a key entirely. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.db.delete(key)
    }

    /// Check if a key exists
    pub fn exists(&self, key: &str) -> Result<bool> {
        self.db.exists(key)
    }

    /// List stored keys with a prefix (e.g. every per-channel message key)
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.db.keys_with_prefix(prefix)
    }

    /// Raw string write, for values that are not JSON-encoded by this layer
    pub(crate) fn save_raw(&self, key: &str, raw: &str) -> Result<()> {
        self.db.set(key, raw)
    }

    /// Raw string read counterpart of [`Self::save_raw`]
    pub(crate) fn load_raw(&self, key: &str) -> Result<Option<String>> {
        self.db.get(key)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
        name: String,
    }

    fn open_store() -> EntityStore {
        EntityStore::new(Database::open(None).unwrap())
    }

    #[test]
    fn test_save_load_round_trip() {
        let store = open_store();

        // For all lists L and transforms T: saving T(load) then loading
        // yields exactly what T produced.
        let seeded: Vec<Item> = store.load_or_seed("items", Vec::new).unwrap();
        assert!(seeded.is_empty());

        let mut transformed = seeded;
        transformed.push(Item {
            id: 1,
            name: "Água".to_string(),
        });
        store.save("items", &transformed).unwrap();

        let loaded: Vec<Item> = store.load("items").unwrap().unwrap();
        assert_eq!(loaded, transformed);
    }

    #[test]
    fn test_load_missing_key() {
        let store = open_store();
        let loaded: Option<Vec<Item>> = store.load("absent").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_malformed_is_decode_error() {
        let store = open_store();
        store.save_raw("items", "{not json").unwrap();

        let err = store.load::<Vec<Item>>("items").unwrap_err();
        match err {
            Error::Decode { key, .. } => assert_eq!(key, "items"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_seed_persists_default() {
        let store = open_store();

        let value = store
            .load_or_seed("greeting", || "olá".to_string())
            .unwrap();
        assert_eq!(value, "olá");

        // Seeded value is now on disk for the next reader.
        let loaded: String = store.load("greeting").unwrap().unwrap();
        assert_eq!(loaded, "olá");
    }

    #[test]
    fn test_load_or_seed_replaces_corrupt_value() {
        let store = open_store();
        store.save_raw("items", "][").unwrap();

        let value: Vec<Item> = store.load_or_seed("items", Vec::new).unwrap();
        assert!(value.is_empty());

        // Corrupt document was overwritten with the default.
        let reloaded: Vec<Item> = store.load("items").unwrap().unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_update_applies_transform() {
        let store = open_store();

        let len = store
            .update("items", Vec::<Item>::new, |items| {
                items.push(Item {
                    id: 7,
                    name: "x".to_string(),
                });
                items.len()
            })
            .unwrap();
        assert_eq!(len, 1);

        let loaded: Vec<Item> = store.load("items").unwrap().unwrap();
        assert_eq!(loaded[0].id, 7);
    }

    #[test]
    fn test_channel_messages_key() {
        assert_eq!(keys::channel_messages("general"), "messages_general");
    }
}
