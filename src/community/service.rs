//! # Community Service
//!
//! Core service struct for chat CRUD plus the seeded default taxonomy.

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{Category, Channel};
use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::EntityStore;

/// Default chat taxonomy, written once when the `categories` key is absent.
pub(super) static DEFAULT_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category {
            id: "project".to_string(),
            name: "PROJETO".to_string(),
            channels: vec![
                Channel {
                    id: "design-project".to_string(),
                    name: "design project".to_string(),
                    description: Some(
                        "Este canal é para discussão de projetos de design.".to_string(),
                    ),
                    is_announcement: false,
                },
                Channel::plain("front-end-project", "front end project"),
                Channel::plain("back-end-project", "back end project"),
                Channel::plain("saas-project", "saas project"),
                Channel::plain("landing-page-project", "landing page project"),
                Channel::plain("booking-hotel-app", "booking hotel app"),
            ],
        },
        Category {
            id: "information".to_string(),
            name: "INFORMAÇÃO".to_string(),
            channels: vec![
                Channel::plain("general", "general"),
                Channel::plain("discussion", "discussion"),
                Channel::plain("work-report", "work report"),
                Channel {
                    id: "announcement".to_string(),
                    name: "announcement".to_string(),
                    description: None,
                    is_announcement: true,
                },
            ],
        },
    ]
});

/// The main community service. Coordinates categories, channels, and
/// messages over the shared entity store.
pub struct CommunityService {
    store: Arc<EntityStore>,
    config: CoreConfig,
}

impl CommunityService {
    /// Create a community service over the shared store
    pub fn new(store: Arc<EntityStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    pub(super) fn store(&self) -> &EntityStore {
        &self.store
    }

    pub(super) fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Guard for operations reserved to administrators
    pub(super) fn require_admin(&self, actor: &SessionUser) -> Result<()> {
        if actor.is_admin {
            Ok(())
        } else {
            Err(Error::AdminRequired)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(super) mod test_support {
    use super::*;
    use crate::storage::Database;

    pub(in crate::community) fn test_service() -> CommunityService {
        let store = Arc::new(EntityStore::new(Database::open(None).unwrap()));
        CommunityService::new(store, CoreConfig::default())
    }

    pub(in crate::community) fn admin() -> SessionUser {
        SessionUser::new("Admin".into(), "admin@exemplo.com".into(), true)
    }

    pub(in crate::community) fn member() -> SessionUser {
        SessionUser::new("Membro".into(), "membro@exemplo.com".into(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{admin, member, test_service};
    use super::*;

    #[test]
    fn test_default_taxonomy_shape() {
        assert_eq!(DEFAULT_CATEGORIES.len(), 2);
        assert_eq!(DEFAULT_CATEGORIES[0].channels.len(), 6);

        let announcement = DEFAULT_CATEGORIES[1]
            .channels
            .iter()
            .find(|c| c.id == "announcement")
            .unwrap();
        assert!(announcement.is_announcement);
    }

    #[test]
    fn test_require_admin() {
        let service = test_service();
        assert!(service.require_admin(&admin()).is_ok());
        assert!(matches!(
            service.require_admin(&member()),
            Err(Error::AdminRequired)
        ));
    }
}
