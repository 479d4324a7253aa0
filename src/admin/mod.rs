//! # Admin Module
//!
//! Administrator operations over the user directory. Channel and message
//! moderation live in [`crate::community`] (channel delete, message delete,
//! the rebuilt all-messages view); this module covers promoting and
//! demoting accounts.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::session::{DirectoryUser, SessionUser};
use crate::storage::{keys, EntityStore};

/// Administration service
pub struct AdminService {
    store: Arc<EntityStore>,
}

impl AdminService {
    /// Create an admin service over the shared store
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> &EntityStore {
        &self.store
    }

    fn require_admin(&self, actor: &SessionUser) -> Result<()> {
        if actor.is_admin {
            Ok(())
        } else {
            Err(Error::AdminRequired)
        }
    }

    /// The full user directory (admin only).
    pub fn users(&self, actor: &SessionUser) -> Result<Vec<DirectoryUser>> {
        self.require_admin(actor)?;
        self.store().load_or_seed(keys::USERS, Vec::new)
    }

    /// Flip an account's administrator flag (admin only).
    ///
    /// When the target account is the one currently logged in, the stored
    /// session identity is updated too, so the change applies without a
    /// re-login.
    pub fn toggle_admin(&self, actor: &SessionUser, email: &str) -> Result<DirectoryUser> {
        self.require_admin(actor)?;

        let updated = self.store().update(
            keys::USERS,
            Vec::<DirectoryUser>::new,
            |users| {
                let user = users
                    .iter_mut()
                    .find(|u| u.email.eq_ignore_ascii_case(email))
                    .ok_or_else(|| Error::UserNotFound(email.to_string()))?;
                user.is_admin = !user.is_admin;
                Ok::<DirectoryUser, Error>(user.clone())
            },
        )??;

        // Mirror into the live session when the target is logged in here.
        if let Ok(Some(mut session_user)) = self.store().load::<SessionUser>(keys::USER) {
            if session_user.email.eq_ignore_ascii_case(email) {
                session_user.is_admin = updated.is_admin;
                self.store().save(keys::USER, &session_user)?;
            }
        }

        tracing::info!(
            "{} {} administrator",
            updated.email,
            if updated.is_admin { "is now" } else { "is no longer" }
        );
        Ok(updated)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn setup() -> (AdminService, Arc<EntityStore>) {
        let store = Arc::new(EntityStore::new(Database::open(None).unwrap()));
        let users = vec![
            DirectoryUser {
                name: "Admin".into(),
                email: "admin@exemplo.com".into(),
                password: "s".into(),
                is_admin: true,
            },
            DirectoryUser {
                name: "Ana".into(),
                email: "ana@exemplo.com".into(),
                password: "s".into(),
                is_admin: false,
            },
        ];
        store.save(keys::USERS, &users).unwrap();
        (AdminService::new(Arc::clone(&store)), store)
    }

    fn admin() -> SessionUser {
        SessionUser::new("Admin".into(), "admin@exemplo.com".into(), true)
    }

    #[test]
    fn test_users_requires_admin() {
        let (service, _) = setup();
        let member = SessionUser::new("Ana".into(), "ana@exemplo.com".into(), false);

        assert!(matches!(service.users(&member), Err(Error::AdminRequired)));
        assert_eq!(service.users(&admin()).unwrap().len(), 2);
    }

    #[test]
    fn test_toggle_admin() {
        let (service, _) = setup();

        let updated = service.toggle_admin(&admin(), "ana@exemplo.com").unwrap();
        assert!(updated.is_admin);

        let updated = service.toggle_admin(&admin(), "ana@exemplo.com").unwrap();
        assert!(!updated.is_admin);

        assert!(matches!(
            service.toggle_admin(&admin(), "ninguem@exemplo.com"),
            Err(Error::UserNotFound(_))
        ));
    }

    #[test]
    fn test_toggle_admin_mirrors_into_session() {
        let (service, store) = setup();

        // Ana is the logged-in user on this instance.
        let ana = SessionUser::new("Ana".into(), "ana@exemplo.com".into(), false);
        store.save(keys::USER, &ana).unwrap();

        service.toggle_admin(&admin(), "ana@exemplo.com").unwrap();

        let session: SessionUser = store.load(keys::USER).unwrap().unwrap();
        assert!(session.is_admin);
    }
}
