//! # Channel Messaging
//!
//! Message lists, one store key per channel. Sending enforces the
//! announcement-only restriction against the *freshly stored* session user
//! (an admin toggle in another view must take effect immediately) and
//! validates attached image URLs against the image-domain allowlist.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::keys;

/// The author snapshot embedded in each message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageAuthor {
    /// Display name at the time of sending
    pub name: String,
    /// Avatar URL at the time of sending
    pub avatar: String,
    /// Role label ("Administrador" / "Membro" / "Bot")
    pub role: String,
    /// Whether the author was an administrator
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    /// Author email, when known (seeded example messages omit it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Epoch-millis id, stored as a string
    pub id: String,
    /// Message text
    pub content: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Author snapshot
    pub user: MessageAuthor,
    /// Optional attached image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A message paired with the channel it was found in, for cross-channel
/// moderation views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// The channel whose key the message was read from
    pub channel_id: String,
    /// The message itself
    pub message: Message,
}

impl super::CommunityService {
    // ── Messages ────────────────────────────────────────────────────────

    /// Get a channel's messages, seeding example messages on first read.
    pub fn messages(&self, channel_id: &str) -> Result<Vec<Message>> {
        let channel = self.channel(channel_id)?;
        self.store().load_or_seed(&keys::channel_messages(channel_id), || {
            example_messages(&channel.id, &channel.name)
        })
    }

    /// Send a message to a channel.
    ///
    /// For announcement channels the admin check is made against the user
    /// currently stored under the `user` key, not the caller's snapshot, so
    /// a demotion elsewhere takes effect on the next send.
    pub fn send_message(
        &self,
        actor: &SessionUser,
        channel_id: &str,
        content: &str,
        image: Option<&str>,
    ) -> Result<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Validation("A mensagem não pode ser vazia.".into()));
        }

        let channel = self.channel(channel_id)?;
        if channel.is_announcement && !self.fresh_is_admin(actor) {
            return Err(Error::AnnouncementRestricted);
        }

        if let Some(url) = image {
            if !self.config().image_url_allowed(url) {
                return Err(Error::ImageDomainNotAllowed(url.to_string()));
            }
        }

        let now = crate::time::now_timestamp_millis();
        let message = Message {
            id: now.to_string(),
            content: content.to_string(),
            timestamp: now,
            user: MessageAuthor {
                name: actor.name.clone(),
                avatar: actor.avatar_or_generated(),
                role: actor.role_label().to_string(),
                is_admin: actor.is_admin,
                email: Some(actor.email.clone()),
            },
            image: image.map(String::from),
        };

        let stored = message.clone();
        self.store().update(
            &keys::channel_messages(channel_id),
            || example_messages(&channel.id, &channel.name),
            move |messages| messages.push(stored),
        )?;

        Ok(message)
    }

    /// Delete one message from a channel (admin only).
    pub fn delete_message(
        &self,
        actor: &SessionUser,
        channel_id: &str,
        message_id: &str,
    ) -> Result<()> {
        self.require_admin(actor)?;

        // Only operate on a materialized list; a missing key means the
        // message cannot exist either.
        let key = keys::channel_messages(channel_id);
        let mut messages: Vec<Message> =
            self.store().load(&key)?.ok_or(Error::MessageNotFound)?;

        let before = messages.len();
        messages.retain(|m| m.id != message_id);
        if messages.len() == before {
            return Err(Error::MessageNotFound);
        }

        self.store().save(&key, &messages)
    }

    /// Every message across every channel, rebuilt by scanning the
    /// `messages_` keys (no references are stored between entities).
    ///
    /// Messages under a key whose channel no longer exists in any category
    /// are skipped, as are unreadable lists.
    pub fn all_messages(&self) -> Result<Vec<ChannelMessage>> {
        let categories = self.categories()?;
        let mut all = Vec::new();

        for key in self.store().keys_with_prefix(keys::MESSAGES_PREFIX)? {
            let channel_id = key[keys::MESSAGES_PREFIX.len()..].to_string();
            let known = categories
                .iter()
                .any(|cat| cat.channels.iter().any(|c| c.id == channel_id));
            if !known {
                continue;
            }

            match self.store().load::<Vec<Message>>(&key) {
                Ok(Some(messages)) => {
                    all.extend(messages.into_iter().map(|message| ChannelMessage {
                        channel_id: channel_id.clone(),
                        message,
                    }));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Skipping unreadable message list '{}': {}", key, e);
                }
            }
        }

        all.sort_by_key(|m| m.message.timestamp);
        Ok(all)
    }

    /// Admin status of whoever is stored under the `user` key right now
    fn fresh_is_admin(&self, fallback: &SessionUser) -> bool {
        match self.store().load::<SessionUser>(keys::USER) {
            Ok(Some(user)) => user.is_admin,
            _ => fallback.is_admin,
        }
    }
}

/// Example messages seeded into an empty channel on first read.
fn example_messages(channel_id: &str, channel_name: &str) -> Vec<Message> {
    let now = crate::time::now_timestamp_millis();
    let system = |content: &str, timestamp: i64, id: &str| Message {
        id: id.to_string(),
        content: content.to_string(),
        timestamp,
        user: MessageAuthor {
            name: "Sistema".to_string(),
            avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=system".to_string(),
            role: "Bot".to_string(),
            is_admin: true,
            email: None,
        },
        image: None,
    };

    match channel_id {
        "design-project" => {
            let author = |name: &str, role: &str, is_admin: bool| MessageAuthor {
                name: name.to_string(),
                avatar: format!(
                    "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
                    name.to_lowercase()
                ),
                role: role.to_string(),
                is_admin,
                email: None,
            };
            vec![
                Message {
                    id: "1".to_string(),
                    content: "Olá pessoal, espero que todos estejam bem hoje. Temos um novo \
                              projeto de design pela frente, e eu gostaria de iniciar nossa \
                              discussão."
                        .to_string(),
                    timestamp: now - 2 * 3_600_000,
                    user: author("Mariam", "UX/UI Designer", true),
                    image: None,
                },
                Message {
                    id: "2".to_string(),
                    content: "Olá Mariam e equipe, estou ansioso para este projeto. Qual é o \
                              escopo do nosso trabalho de design?"
                        .to_string(),
                    timestamp: now - 3_600_000,
                    user: author("Miller", "Product Manager", false),
                    image: None,
                },
                Message {
                    id: "3".to_string(),
                    content: "Olá a todos! Preparei uma breve visão geral do projeto: vamos \
                              projetar um site para uma cafeteria local, com um design moderno \
                              e limpo."
                        .to_string(),
                    timestamp: now - 1_800_000,
                    user: author("Yevhen", "UX/UI Designer", false),
                    image: Some("/mockup-cafeteria.png".to_string()),
                },
            ]
        }
        "general" => vec![system(
            "Bem-vindo ao canal geral! Este é um espaço para discussões gerais da equipe.",
            now - 86_400_000,
            "1",
        )],
        _ => vec![system(
            &format!("Bem-vindo ao canal #{}!", channel_name),
            now - 86_400_000,
            "1",
        )],
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
    fn test_messages_seed_examples() {
        let service = test_service();

        let general = service.messages("general").unwrap();
        assert_eq!(general.len(), 1);
        assert_eq!(general[0].user.role, "Bot");

        let design = service.messages("design-project").unwrap();
        assert_eq!(design.len(), 3);

        let other = service.messages("saas-project").unwrap();
        assert!(other[0].content.contains("#saas project"));
    }

    #[test]
    fn test_messages_unknown_channel() {
        let service = test_service();
        assert!(matches!(
            service.messages("missing"),
            Err(Error::ChannelNotFound)
        ));
    }

    #[test]
    fn test_send_message_appends() {
        let service = test_service();
        let actor = member();

        let sent = service
            .send_message(&actor, "general", "Bom dia!", None)
            .unwrap();
        assert_eq!(sent.user.email.as_deref(), Some("membro@exemplo.com"));
        assert_eq!(sent.user.role, "Membro");

        let messages = service.messages("general").unwrap();
        assert_eq!(messages.last().unwrap().content, "Bom dia!");
    }

    #[test]
    fn test_send_empty_message_rejected() {
        let service = test_service();
        assert!(matches!(
            service.send_message(&member(), "general", "   ", None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_announcement_channel_restricted() {
        let service = test_service();

        assert!(matches!(
            service.send_message(&member(), "announcement", "Aviso!", None),
            Err(Error::AnnouncementRestricted)
        ));

        let sent = service
            .send_message(&admin(), "announcement", "Aviso!", None)
            .unwrap();
        assert!(sent.user.is_admin);
    }

    #[test]
    fn test_announcement_uses_fresh_stored_user() {
        let service = test_service();

        // The caller's snapshot says admin, but the stored session user was
        // demoted in the meantime; the fresh check wins.
        let demoted = member();
        service.store().save(keys::USER, &demoted).unwrap();

        assert!(matches!(
            service.send_message(&admin(), "announcement", "Aviso!", None),
            Err(Error::AnnouncementRestricted)
        ));
    }

    #[test]
    fn test_image_domain_allowlist() {
        let service = test_service();

        assert!(matches!(
            service.send_message(
                &member(),
                "general",
                "olha",
                Some("https://malicious.example/x.png")
            ),
            Err(Error::ImageDomainNotAllowed(_))
        ));

        service
            .send_message(
                &member(),
                "general",
                "olha",
                Some("https://api.dicebear.com/7.x/avataaars/svg?seed=x"),
            )
            .unwrap();
    }

    #[test]
    fn test_delete_message() {
        let service = test_service();
        let actor = admin();

        let sent = service
            .send_message(&actor, "general", "para apagar", None)
            .unwrap();
        service.delete_message(&actor, "general", &sent.id).unwrap();

        let messages = service.messages("general").unwrap();
        assert!(messages.iter().all(|m| m.id != sent.id));

        assert!(matches!(
            service.delete_message(&actor, "general", "nope"),
            Err(Error::MessageNotFound)
        ));
        assert!(matches!(
            service.delete_message(&member(), "general", "1"),
            Err(Error::AdminRequired)
        ));
    }

    #[test]
    fn test_all_messages_rebuilt_by_scan() {
        let service = test_service();
        let actor = admin();

        service.messages("general").unwrap();
        service.messages("discussion").unwrap();
        service.send_message(&actor, "general", "um", None).unwrap();

        let all = service.all_messages().unwrap();
        assert!(all.iter().any(|m| m.channel_id == "general"));
        assert!(all.iter().any(|m| m.channel_id == "discussion"));

        // Deleting a channel removes its messages from the rebuilt view.
        service.delete_channel(&actor, "information", "discussion").unwrap();
        let all = service.all_messages().unwrap();
        assert!(all.iter().all(|m| m.channel_id != "discussion"));
    }
}
