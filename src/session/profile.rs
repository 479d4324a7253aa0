//! # User Profile
//!
//! The session user's account details and display settings.
//!
//! Settings fields are optional in the stored JSON; older accounts created
//! before the settings screen existed simply lack them. Defaults are filled
//! in at read time, matching how the stored data evolved.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum length for the display name
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length for the welcome message
pub const MAX_WELCOME_MESSAGE_LENGTH: usize = 256;

/// Default language
pub const DEFAULT_LANGUAGE: &str = "Português";

/// Default date format
pub const DEFAULT_DATE_FORMAT: &str = "DD/MM/YYYY";

/// Default time format
pub const DEFAULT_TIME_FORMAT: &str = "24h";

/// Default country
pub const DEFAULT_COUNTRY: &str = "Brasil";

/// Default time zone
pub const DEFAULT_TIME_ZONE: &str = "America/Sao_Paulo";

/// Default welcome message
pub const DEFAULT_WELCOME_MESSAGE: &str = "Bem-vindo à plataforma Verdant!";

/// The current session identity, stored under the `user` key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    /// Display name
    pub name: String,

    /// Account email (also the identity in enrollment and like lists)
    pub email: String,

    /// Administrator flag
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,

    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Interface language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Date display format
    #[serde(rename = "dateFormat", default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,

    /// Time display format
    #[serde(rename = "timeFormat", default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,

    /// Country
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Time zone name
    #[serde(rename = "timeZone", default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    /// Message shown to other users on the profile
    #[serde(
        rename = "welcomeMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub welcome_message: Option<String>,
}

impl SessionUser {
    /// Create a session user with just a name and email
    pub fn new(name: String, email: String, is_admin: bool) -> Self {
        Self {
            name,
            email,
            is_admin,
            avatar: None,
            language: None,
            date_format: None,
            time_format: None,
            country: None,
            time_zone: None,
            welcome_message: None,
        }
    }

    /// Return a copy with every unset settings field filled with its default
    pub fn with_defaults(mut self) -> Self {
        self.language.get_or_insert_with(|| DEFAULT_LANGUAGE.to_string());
        self.date_format
            .get_or_insert_with(|| DEFAULT_DATE_FORMAT.to_string());
        self.time_format
            .get_or_insert_with(|| DEFAULT_TIME_FORMAT.to_string());
        self.country.get_or_insert_with(|| DEFAULT_COUNTRY.to_string());
        self.time_zone
            .get_or_insert_with(|| DEFAULT_TIME_ZONE.to_string());
        self.welcome_message
            .get_or_insert_with(|| DEFAULT_WELCOME_MESSAGE.to_string());
        self
    }

    /// The role label shown next to messages
    pub fn role_label(&self) -> &'static str {
        if self.is_admin {
            "Administrador"
        } else {
            "Membro"
        }
    }

    /// The avatar URL to display, falling back to a generated one
    pub fn avatar_or_generated(&self) -> String {
        self.avatar
            .clone()
            .unwrap_or_else(|| generated_avatar_url(&self.name))
    }

    /// Validate the profile fields
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ProfileUpdateFailed("Name cannot be empty".into()));
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(Error::ProfileUpdateFailed(format!(
                "Name too long: max {} characters",
                MAX_NAME_LENGTH
            )));
        }
        if let Some(ref msg) = self.welcome_message {
            if msg.len() > MAX_WELCOME_MESSAGE_LENGTH {
                return Err(Error::ProfileUpdateFailed(format!(
                    "Welcome message too long: max {} characters",
                    MAX_WELCOME_MESSAGE_LENGTH
                )));
            }
        }
        Ok(())
    }

    /// Apply a partial update to the profile
    pub fn apply_update(&mut self, update: ProfileUpdate) -> Result<()> {
        match update {
            ProfileUpdate::Name(name) => {
                if name.trim().is_empty() {
                    return Err(Error::ProfileUpdateFailed("Name cannot be empty".into()));
                }
                if name.len() > MAX_NAME_LENGTH {
                    return Err(Error::ProfileUpdateFailed(format!(
                        "Name too long: max {} characters",
                        MAX_NAME_LENGTH
                    )));
                }
                self.name = name;
            }
            ProfileUpdate::Avatar(avatar) => self.avatar = avatar,
            ProfileUpdate::Language(v) => self.language = Some(v),
            ProfileUpdate::DateFormat(v) => self.date_format = Some(v),
            ProfileUpdate::TimeFormat(v) => self.time_format = Some(v),
            ProfileUpdate::Country(v) => self.country = Some(v),
            ProfileUpdate::TimeZone(v) => self.time_zone = Some(v),
            ProfileUpdate::WelcomeMessage(msg) => {
                if msg.len() > MAX_WELCOME_MESSAGE_LENGTH {
                    return Err(Error::ProfileUpdateFailed(format!(
                        "Welcome message too long: max {} characters",
                        MAX_WELCOME_MESSAGE_LENGTH
                    )));
                }
                self.welcome_message = Some(msg);
            }
        }
        Ok(())
    }
}

/// A partial update to the session user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProfileUpdate {
    /// Change the display name
    Name(String),
    /// Set or clear the avatar URL
    Avatar(Option<String>),
    /// Change the interface language
    Language(String),
    /// Change the date display format
    DateFormat(String),
    /// Change the time display format
    TimeFormat(String),
    /// Change the country
    Country(String),
    /// Change the time zone
    TimeZone(String),
    /// Change the profile welcome message
    WelcomeMessage(String),
}

/// Deterministic generated avatar URL for a display name
pub fn generated_avatar_url(name: &str) -> String {
    let seed = name.trim().to_lowercase().replace(char::is_whitespace, "-");
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", seed)
}

// ============================================================================
// TESTS
// ============================================================================
