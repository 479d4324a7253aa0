//! # Session Module
//!
//! Authentication and account management over the entity store.
//!
//! Three keys cooperate here:
//!
//! - `users`: the credential directory, a list of `{name, email, password,
//!   isAdmin}` records. Passwords are stored as-is; this mirrors the
//!   platform's stated persistence model and is not a recommendation.
//! - `user`: the current session identity (profile + settings).
//! - `isAuthenticated`: the session flag, the JSON string `"true"` while
//!   logged in and absent otherwise.
//!
//! A missing flag or a corrupt `user` document clears both keys and returns
//! [`Error::AuthRequired`]; callers route that to the login view.

mod profile;

pub use profile::{
    generated_avatar_url, ProfileUpdate, SessionUser, DEFAULT_COUNTRY, DEFAULT_DATE_FORMAT,
    DEFAULT_LANGUAGE, DEFAULT_TIME_FORMAT, DEFAULT_TIME_ZONE, DEFAULT_WELCOME_MESSAGE,
    MAX_NAME_LENGTH, MAX_WELCOME_MESSAGE_LENGTH,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::error::{Error, Result};
use crate::storage::{keys, EntityStore};

/// One record in the `users` credential directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Display name
    pub name: String,
    /// Account email, unique within the directory
    pub email: String,
    /// Plaintext password, compared byte-for-byte at login
    pub password: String,
    /// Administrator flag
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

/// Authentication and account service
pub struct SessionService {
    store: Arc<EntityStore>,
    config: CoreConfig,
}

impl SessionService {
    /// Create a session service over the shared store
    pub fn new(store: Arc<EntityStore>, config: CoreConfig) -> Self {
        Self { store, config }
    }

    fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Whether this email is granted admin status by configuration
    fn is_configured_admin(&self, email: &str) -> bool {
        self.config
            .admin_email
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(email))
    }

    // ========================================================================
    // REGISTRATION / LOGIN
    // ========================================================================

    /// Register a new account and open a session for it.
    ///
    /// Validates required fields and the password confirmation, rejects an
    /// email already present in the directory, appends the credential
    /// record, and writes the session keys.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SessionUser> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Preencha todos os campos obrigatórios.".to_string(),
            ));
        }
        if password != confirm_password {
            return Err(Error::PasswordMismatch);
        }

        let email = email.trim().to_string();
        let mut users: Vec<DirectoryUser> = self.store().load_or_seed(keys::USERS, Vec::new)?;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&email)) {
            return Err(Error::EmailTaken);
        }

        let is_admin = self.is_configured_admin(&email);
        users.push(DirectoryUser {
            name: name.trim().to_string(),
            email: email.clone(),
            password: password.to_string(),
            is_admin,
        });
        self.store().save(keys::USERS, &users)?;

        let user = SessionUser::new(name.trim().to_string(), email, is_admin);
        self.open_session(&user)?;

        tracing::info!("Registered account for {}", user.email);
        Ok(user)
    }

    /// Log in against the credential directory and open a session.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionUser> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Preencha todos os campos.".to_string(),
            ));
        }

        let users: Vec<DirectoryUser> = self.store().load_or_seed(keys::USERS, Vec::new)?;
        let record = users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()) && u.password == password)
            .ok_or(Error::InvalidCredentials)?;

        let is_admin = record.is_admin || self.is_configured_admin(&record.email);
        let user = SessionUser::new(record.name.clone(), record.email.clone(), is_admin);
        self.open_session(&user)?;

        tracing::info!("Opened session for {}", user.email);
        Ok(user)
    }

    fn open_session(&self, user: &SessionUser) -> Result<()> {
        self.store().save(keys::USER, user)?;
        self.store().save(keys::IS_AUTHENTICATED, "true")
    }

    // ========================================================================
    // SESSION STATE
    // ========================================================================

    /// The current session user, with settings defaults filled in.
    ///
    /// A missing session flag, a missing `user` document, or one that fails
    /// to decode all clear the session keys and return
    /// [`Error::AuthRequired`], and the caller redirects to login.
    pub fn current_user(&self) -> Result<SessionUser> {
        if !self.is_authenticated()? {
            self.clear_session()?;
            return Err(Error::AuthRequired);
        }

        match self.store().load::<SessionUser>(keys::USER) {
            Ok(Some(user)) => Ok(user.with_defaults()),
            Ok(None) => {
                self.clear_session()?;
                Err(Error::AuthRequired)
            }
            Err(e) => {
                tracing::warn!("Clearing corrupt session: {}", e);
                self.clear_session()?;
                Err(Error::AuthRequired)
            }
        }
    }

    /// Whether the session flag is present and set
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self
            .store()
            .load::<String>(keys::IS_AUTHENTICATED)
            .unwrap_or(None)
            .as_deref()
            == Some("true"))
    }

    /// Close the session, leaving the account in the directory
    pub fn logout(&self) -> Result<()> {
        self.clear_session()
    }

    fn clear_session(&self) -> Result<()> {
        self.store().remove(keys::IS_AUTHENTICATED)?;
        self.store().remove(keys::USER)?;
        Ok(())
    }

    /// Delete the current account: close the session and drop the
    /// directory record.
    pub fn delete_account(&self) -> Result<()> {
        let user = self.current_user()?;

        self.store().update(keys::USERS, Vec::<DirectoryUser>::new, |users| {
            users.retain(|u| !u.email.eq_ignore_ascii_case(&user.email));
        })?;
        self.clear_session()?;

        tracing::info!("Deleted account {}", user.email);
        Ok(())
    }

    // ========================================================================
    // PROFILE
    // ========================================================================

    /// Apply a partial profile update to the session user.
    ///
    /// Name changes are mirrored into the credential directory so the admin
    /// panel and login stay consistent.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<SessionUser> {
        let mut user = self.current_user()?;
        user.apply_update(update)?;
        user.validate()?;

        self.store().save(keys::USER, &user)?;
        let email = user.email.clone();
        let name = user.name.clone();
        self.store().update(keys::USERS, Vec::<DirectoryUser>::new, |users| {
            if let Some(record) = users
                .iter_mut()
                .find(|u| u.email.eq_ignore_ascii_case(&email))
            {
                record.name = name;
            }
        })?;

        Ok(user)
    }
}

// ============================================================================
// TESTS
// ============================================================================
