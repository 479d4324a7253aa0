//! # Notifications Module
//!
//! The notification list under `notificacoes`, plus the fixed-interval
//! course poller that feeds it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      NOTIFICATIONS MODULE                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────┐         ┌───────────────────────────────────┐     │
//! │  │ NotificationSvc  │         │           CoursePoller            │     │
//! │  │                  │         │                                   │     │
//! │  │ - List (newest)  │◄────────│ - Re-reads `cursos` every 30 s    │     │
//! │  │ - Unread count   │  push   │ - First pass primes silently      │     │
//! │  │ - Mark read      │         │ - Unseen id → "novo_curso"        │     │
//! │  │ - Push           │         │ - Stops via shutdown signal       │     │
//! │  └──────────────────┘         └───────────────────────────────────┘     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The poller and a user-initiated write can interleave only as
//! last-write-wins on the `notificacoes` key; nothing coordinates them.

mod poller;

pub use poller::{spawn_course_poller, CoursePoller, PollerHandle};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::{keys, EntityStore};

/// Notification kind for a newly published course
pub const KIND_NEW_COURSE: &str = "novo_curso";

/// One notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Epoch-millis id
    pub id: i64,
    /// Kind tag, e.g. [`KIND_NEW_COURSE`]
    #[serde(rename = "tipo")]
    pub kind: String,
    /// Short title
    #[serde(rename = "titulo")]
    pub title: String,
    /// Body text
    #[serde(rename = "mensagem")]
    pub message: String,
    /// Unix timestamp in milliseconds
    #[serde(rename = "data")]
    pub timestamp: i64,
    /// Whether the user has seen it
    #[serde(rename = "lida", default)]
    pub read: bool,
}

/// Notification list service
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<EntityStore>,
}

impl NotificationService {
    /// Create a notification service over the shared store
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> &EntityStore {
        &self.store
    }

    /// All notifications, newest first.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        let mut list: Vec<Notification> =
            self.store().load_or_seed(keys::NOTIFICATIONS, Vec::new)?;
        list.sort_by_key(|n| std::cmp::Reverse(n.timestamp));
        Ok(list)
    }

    /// How many notifications are unread.
    pub fn unread_count(&self) -> Result<usize> {
        Ok(self.notifications()?.iter().filter(|n| !n.read).count())
    }

    /// Append a notification.
    pub fn push(&self, kind: &str, title: &str, message: &str) -> Result<Notification> {
        let now = crate::time::now_timestamp_millis();
        let notification = Notification {
            id: now,
            kind: kind.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            timestamp: now,
            read: false,
        };

        let stored = notification.clone();
        self.store().update(
            keys::NOTIFICATIONS,
            Vec::new,
            move |list: &mut Vec<Notification>| list.push(stored),
        )?;

        Ok(notification)
    }

    /// Mark one notification as read.
    pub fn mark_read(&self, id: i64) -> Result<()> {
        self.store().update(
            keys::NOTIFICATIONS,
            Vec::new,
            |list: &mut Vec<Notification>| {
                let notification = list
                    .iter_mut()
                    .find(|n| n.id == id)
                    .ok_or(Error::Internal(format!("no notification with id {}", id)))?;
                notification.read = true;
                Ok(())
            },
        )?
    }

    /// Mark every notification as read.
    pub fn mark_all_read(&self) -> Result<()> {
        self.store().update(
            keys::NOTIFICATIONS,
            Vec::new,
            |list: &mut Vec<Notification>| {
                for notification in list.iter_mut() {
                    notification.read = true;
                }
            },
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn service() -> NotificationService {
        NotificationService::new(Arc::new(EntityStore::new(Database::open(None).unwrap())))
    }

    #[test]
    fn test_push_and_unread_count() {
        let service = service();
        assert_eq!(service.unread_count().unwrap(), 0);

        service.push(KIND_NEW_COURSE, "Novo curso", "Curso X disponível").unwrap();
        assert_eq!(service.unread_count().unwrap(), 1);

        let notifications = service.notifications().unwrap();
        assert_eq!(notifications[0].kind, KIND_NEW_COURSE);
        assert!(!notifications[0].read);
    }

    #[test]
    fn test_mark_read() {
        let service = service();
        let n = service.push(KIND_NEW_COURSE, "t", "m").unwrap();

        service.mark_read(n.id).unwrap();
        assert_eq!(service.unread_count().unwrap(), 0);

        assert!(service.mark_read(42).is_err());
    }

    #[test]
    fn test_mark_all_read() {
        let service = service();
        service.push(KIND_NEW_COURSE, "a", "1").unwrap();
        service.push("aviso", "b", "2").unwrap();

        service.mark_all_read().unwrap();
        assert_eq!(service.unread_count().unwrap(), 0);
    }

    #[test]
    fn test_wire_field_names() {
        let service = service();
        service.push(KIND_NEW_COURSE, "t", "m").unwrap();

        let raw = service.store().load_raw(keys::NOTIFICATIONS).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        assert!(first.get("tipo").is_some());
        assert!(first.get("titulo").is_some());
        assert!(first.get("mensagem").is_some());
        assert_eq!(first["lida"], false);
    }
}
