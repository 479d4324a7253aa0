//! # Channel Management
//!
//! Channel CRUD within categories. Channel ids are slugs derived from the
//! name; an announcement channel restricts posting to administrators.

use serde::{Deserialize, Serialize};

use super::service::DEFAULT_CATEGORIES;
use super::Category;
use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::keys;

/// A named chat stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    /// Slug id, derived from the name at creation time
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional purpose line shown in the channel header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When set, only administrators may post
    #[serde(
        rename = "isAnnouncement",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_announcement: bool,
}

impl Channel {
    /// A channel with no description and no posting restriction
    pub(super) fn plain(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            is_announcement: false,
        }
    }
}

/// Derive a channel/category slug id from a display name.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

impl super::CommunityService {
    /// Create a new channel in a category (admin only).
    ///
    /// The id is the slug of the name; a second channel slugging to the same
    /// id within the category is rejected.
    pub fn create_channel(
        &self,
        actor: &SessionUser,
        category_id: &str,
        name: &str,
        description: Option<&str>,
        is_announcement: bool,
    ) -> Result<Channel> {
        self.require_admin(actor)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation(
                "Informe o nome do canal e selecione uma categoria.".into(),
            ));
        }

        let channel = Channel {
            id: slugify(name),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
            is_announcement,
        };

        let created = channel.clone();
        self.store().update(
            keys::CATEGORIES,
            || DEFAULT_CATEGORIES.clone(),
            move |categories| {
                let category = categories
                    .iter_mut()
                    .find(|c| c.id == category_id)
                    .ok_or(Error::CategoryNotFound)?;
                if category.channels.iter().any(|c| c.id == channel.id) {
                    return Err(Error::DuplicateChannel);
                }
                category.channels.push(channel);
                Ok(())
            },
        )??;

        tracing::info!("Created channel #{}", created.id);
        Ok(created)
    }

    /// Look up a channel by id across every category.
    pub fn channel(&self, channel_id: &str) -> Result<Channel> {
        for category in self.categories()? {
            if let Some(channel) = category.channels.into_iter().find(|c| c.id == channel_id) {
                return Ok(channel);
            }
        }
        Err(Error::ChannelNotFound)
    }

    /// The category a channel belongs to.
    pub fn category_of_channel(&self, channel_id: &str) -> Result<Category> {
        self.categories()?
            .into_iter()
            .find(|cat| cat.channels.iter().any(|c| c.id == channel_id))
            .ok_or(Error::ChannelNotFound)
    }

    /// Delete a channel (admin only).
    ///
    /// Removes the channel from its category and drops the channel's
    /// `messages_{id}` key. These are two independent writes; there is no
    /// cross-key transaction.
    pub fn delete_channel(
        &self,
        actor: &SessionUser,
        category_id: &str,
        channel_id: &str,
    ) -> Result<()> {
        self.require_admin(actor)?;

        self.store().update(
            keys::CATEGORIES,
            || DEFAULT_CATEGORIES.clone(),
            |categories| {
                let category = categories
                    .iter_mut()
                    .find(|c| c.id == category_id)
                    .ok_or(Error::CategoryNotFound)?;
                let before = category.channels.len();
                category.channels.retain(|c| c.id != channel_id);
                if category.channels.len() == before {
                    return Err(Error::ChannelNotFound);
                }
                Ok(())
            },
        )??;

        self.store().remove(&keys::channel_messages(channel_id))?;

        tracing::info!("Deleted channel #{}", channel_id);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::service::test_support::{admin, member, test_service};
    use super::*;
    use crate::storage::keys;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Design Project"), "design-project");
        assert_eq!(slugify("  meu   canal  "), "meu-canal");
    }

    #[test]
    fn test_create_channel() {
        let service = test_service();
        let channel = service
            .create_channel(&admin(), "information", "Dev News", Some("Novidades"), false)
            .unwrap();
        assert_eq!(channel.id, "dev-news");

        let found = service.channel("dev-news").unwrap();
        assert_eq!(found.name, "Dev News");
        assert_eq!(found.description.as_deref(), Some("Novidades"));
    }

    #[test]
    fn test_create_channel_requires_admin() {
        let service = test_service();
        assert!(matches!(
            service.create_channel(&member(), "information", "x", None, false),
            Err(Error::AdminRequired)
        ));
    }

    #[test]
    fn test_duplicate_channel_rejected() {
        let service = test_service();
        // "general" already exists in the seeded INFORMAÇÃO category.
        assert!(matches!(
            service.create_channel(&admin(), "information", "General", None, false),
            Err(Error::DuplicateChannel)
        ));
    }

    #[test]
    fn test_unknown_category() {
        let service = test_service();
        assert!(matches!(
            service.create_channel(&admin(), "missing", "x", None, false),
            Err(Error::CategoryNotFound)
        ));
    }

    #[test]
    fn test_delete_channel_removes_message_key() {
        let service = test_service();
        let actor = admin();

        // Materialize the channel's message list first.
        service.messages(&keys_channel()).unwrap();
        assert!(service
            .store()
            .exists(&keys::channel_messages(&keys_channel()))
            .unwrap());

        service
            .delete_channel(&actor, "information", &keys_channel())
            .unwrap();

        assert!(!service
            .store()
            .exists(&keys::channel_messages(&keys_channel()))
            .unwrap());
        assert!(matches!(
            service.channel(&keys_channel()),
            Err(Error::ChannelNotFound)
        ));

        // Excluded from subsequent category listings.
        let categories = service.categories().unwrap();
        assert!(categories
            .iter()
            .flat_map(|c| &c.channels)
            .all(|c| c.id != keys_channel()));
    }

    fn keys_channel() -> String {
        "general".to_string()
    }

    #[test]
    fn test_category_of_channel() {
        let service = test_service();
        let category = service.category_of_channel("design-project").unwrap();
        assert_eq!(category.id, "project");
    }
}
