//! # Category Management
//!
//! Categories are named groupings that organize channels; the whole
//! taxonomy lives in one list under the `categories` key.

use serde::{Deserialize, Serialize};

use super::service::DEFAULT_CATEGORIES;
use super::Channel;
use crate::error::{Error, Result};
use crate::session::SessionUser;
use crate::storage::keys;

/// A named grouping of channels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Stable id (slug)
    pub id: String,
    /// Display name, conventionally uppercase
    pub name: String,
    /// Channels in this category, in display order
    pub channels: Vec<Channel>,
}

impl super::CommunityService {
    /// Get the chat taxonomy, seeding the defaults on first read.
    pub fn categories(&self) -> Result<Vec<Category>> {
        self.store()
            .load_or_seed(keys::CATEGORIES, || DEFAULT_CATEGORIES.clone())
    }

    /// Get a single category by id.
    pub fn category(&self, category_id: &str) -> Result<Category> {
        self.categories()?
            .into_iter()
            .find(|c| c.id == category_id)
            .ok_or(Error::CategoryNotFound)
    }

    /// Create a new, empty category (admin only).
    pub fn create_category(&self, actor: &SessionUser, name: &str) -> Result<Category> {
        self.require_admin(actor)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Informe o nome da categoria.".into()));
        }

        let id = super::slugify(name);
        self.store().update(
            keys::CATEGORIES,
            || DEFAULT_CATEGORIES.clone(),
            |categories| {
                if categories.iter().any(|c| c.id == id) {
                    return Err(Error::Validation(
                        "Já existe uma categoria com este nome.".into(),
                    ));
                }
                let category = Category {
                    id: id.clone(),
                    name: name.to_uppercase(),
                    channels: Vec::new(),
                };
                categories.push(category.clone());
                Ok(category)
            },
        )?
    }

    /// Rename a category (admin only).
    pub fn rename_category(
        &self,
        actor: &SessionUser,
        category_id: &str,
        name: &str,
    ) -> Result<()> {
        self.require_admin(actor)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Informe o nome da categoria.".into()));
        }

        self.store().update(
            keys::CATEGORIES,
            || DEFAULT_CATEGORIES.clone(),
            |categories| {
                let category = categories
                    .iter_mut()
                    .find(|c| c.id == category_id)
                    .ok_or(Error::CategoryNotFound)?;
                category.name = name.to_uppercase();
                Ok(())
            },
        )?
    }
}

// ============================================================================
// TESTS
// ============================================================================
