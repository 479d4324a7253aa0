//! # Feed Module
//!
//! The social feed: a single list of posts under `feed_posts`, newest
//! first, with unique-email like lists.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::{keys, EntityStore};

/// The author snapshot embedded in each post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostAuthor {
    /// Display name at posting time
    pub name: String,
    /// Author email
    pub email: String,
    /// Avatar URL at posting time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// One feed post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Epoch-millis id
    pub id: i64,
    /// Author snapshot
    #[serde(rename = "autor")]
    pub author: PostAuthor,
    /// Post text
    #[serde(rename = "conteudo")]
    pub content: String,
    /// Unix timestamp in milliseconds
    #[serde(rename = "data")]
    pub timestamp: i64,
    /// Emails that liked the post, unique
    #[serde(rename = "curtidas", default)]
    pub likes: Vec<String>,
}

/// Social feed service
pub struct FeedService {
    store: Arc<EntityStore>,
}

impl FeedService {
    /// Create a feed service over the shared store
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> &EntityStore {
        &self.store
    }

    /// All posts, newest first.
    pub fn posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.store().load_or_seed(keys::FEED_POSTS, Vec::new)?;
        posts.sort_by_key(|p| std::cmp::Reverse(p.timestamp));
        Ok(posts)
    }

    /// Publish a post.
    pub fn publish(&self, actor: &SessionUser, content: &str) -> Result<Post> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Validation("A publicação não pode ser vazia.".into()));
        }

        let now = crate::time::now_timestamp_millis();
        let post = Post {
            id: now,
            author: PostAuthor {
                name: actor.name.clone(),
                email: actor.email.clone(),
                avatar: actor.avatar.clone(),
            },
            content: content.to_string(),
            timestamp: now,
            likes: Vec::new(),
        };

        let stored = post.clone();
        self.store()
            .update(keys::FEED_POSTS, Vec::new, move |posts: &mut Vec<Post>| {
                posts.push(stored);
            })?;

        Ok(post)
    }

    /// Toggle a like: liking twice removes the like, and the list stays
    /// unique either way.
    pub fn toggle_like(&self, post_id: i64, email: &str) -> Result<Post> {
        self.store().update(
            keys::FEED_POSTS,
            Vec::new,
            |posts: &mut Vec<Post>| {
                let post = posts
                    .iter_mut()
                    .find(|p| p.id == post_id)
                    .ok_or(Error::PostNotFound)?;
                if post.likes.iter().any(|e| e == email) {
                    post.likes.retain(|e| e != email);
                } else {
                    post.likes.push(email.to_string());
                }
                Ok(post.clone())
            },
        )?
    }

    /// Delete a post. Authors may delete their own; admins may delete any.
    pub fn delete_post(&self, actor: &SessionUser, post_id: i64) -> Result<()> {
        self.store().update(
            keys::FEED_POSTS,
            Vec::new,
            |posts: &mut Vec<Post>| {
                let post = posts
                    .iter()
                    .find(|p| p.id == post_id)
                    .ok_or(Error::PostNotFound)?;
                if !actor.is_admin && post.author.email != actor.email {
                    return Err(Error::AdminRequired);
                }
                posts.retain(|p| p.id != post_id);
                Ok(())
            },
        )?
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn service() -> FeedService {
        FeedService::new(Arc::new(EntityStore::new(Database::open(None).unwrap())))
    }

    fn ana() -> SessionUser {
        SessionUser::new("Ana".into(), "ana@exemplo.com".into(), false)
    }

    fn admin() -> SessionUser {
        SessionUser::new("Admin".into(), "admin@exemplo.com".into(), true)
    }

    #[test]
    fn test_publish_and_list() {
        let service = service();
        assert!(service.posts().unwrap().is_empty());

        let post = service.publish(&ana(), "Primeira publicação!").unwrap();
        assert_eq!(post.author.email, "ana@exemplo.com");
        assert!(post.likes.is_empty());

        let posts = service.posts().unwrap();
        assert_eq!(posts.len(), 1);

        assert!(matches!(
            service.publish(&ana(), "   "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_toggle_like_is_unique() {
        let service = service();
        let post = service.publish(&ana(), "Oi").unwrap();

        let post = service.toggle_like(post.id, "outro@exemplo.com").unwrap();
        assert_eq!(post.likes, vec!["outro@exemplo.com"]);

        // Second like from the same email removes it, never duplicates.
        let post = service.toggle_like(post.id, "outro@exemplo.com").unwrap();
        assert!(post.likes.is_empty());

        assert!(matches!(
            service.toggle_like(42, "x@y.z"),
            Err(Error::PostNotFound)
        ));
    }

    #[test]
    fn test_delete_own_post_only() {
        let service = service();
        let post = service.publish(&ana(), "meu post").unwrap();

        let other = SessionUser::new("Outro".into(), "outro@exemplo.com".into(), false);
        assert!(matches!(
            service.delete_post(&other, post.id),
            Err(Error::AdminRequired)
        ));

        // Admins may remove anyone's post.
        service.delete_post(&admin(), post.id).unwrap();
        assert!(service.posts().unwrap().is_empty());
    }
}
