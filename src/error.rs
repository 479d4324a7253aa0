//! # Error Handling
//!
//! Error types for Verdant Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                      │
//! │  │                                                                      │
//! │  ├── Session Errors                                                     │
//! │  │   ├── AuthRequired          - No valid session; caller shows login   │
//! │  │   ├── InvalidCredentials    - Email/password mismatch                │
//! │  │   ├── EmailTaken            - Registration with existing email       │
//! │  │   ├── PasswordMismatch      - Confirmation differs from password     │
//! │  │   └── AdminRequired         - Operation reserved for administrators  │
//! │  │                                                                      │
//! │  ├── Validation Errors                                                  │
//! │  │   ├── Validation            - Missing/invalid form field             │
//! │  │   ├── InvalidIcon           - Icon outside the fixed icon set        │
//! │  │   ├── InvalidDonation       - Donation amount not a positive number  │
//! │  │   └── ImageDomainNotAllowed - Image URL outside the allowlist        │
//! │  │                                                                      │
//! │  ├── Course Errors                                                      │
//! │  │   ├── CourseNotFound        - Unknown course id                      │
//! │  │   ├── AlreadyEnrolled       - Enrollment would duplicate an email    │
//! │  │   └── LessonNotFound        - Unknown lesson/aula id                 │
//! │  │                                                                      │
//! │  ├── Community Errors                                                   │
//! │  │   ├── CategoryNotFound      - Unknown category id                    │
//! │  │   ├── ChannelNotFound       - Unknown channel id                     │
//! │  │   ├── DuplicateChannel      - Channel slug already exists            │
//! │  │   └── AnnouncementRestricted- Non-admin post to announcement channel │
//! │  │                                                                      │
//! │  └── Storage Errors                                                     │
//! │      ├── Decode               - Stored JSON failed typed decoding       │
//! │      ├── DatabaseError        - Underlying SQLite failure               │
//! │      └── MigrationFailed      - Versioned entity migration failed       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failure handling is local and user-facing: validation errors are surfaced
//! to the caller as messages, not-found conditions map to list-view
//! redirects, and nothing is retried or escalated to a process-fatal error.

use thiserror::Error;

/// Result type alias for Verdant Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Verdant Core
///
/// Errors are categorized by module/domain to make handling clearer and to
/// provide meaningful messages to users.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Session Errors (100-199)
    // ========================================================================

    /// No authenticated session is present (or the stored session is corrupt)
    #[error("No authenticated session. Log in first.")]
    AuthRequired,

    /// Credentials did not match the user directory
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// Registration attempted with an email that already exists
    #[error("An account with this email already exists.")]
    EmailTaken,

    /// Password confirmation did not match
    #[error("Passwords do not match.")]
    PasswordMismatch,

    /// Operation requires administrator privileges
    #[error("This operation requires administrator privileges.")]
    AdminRequired,

    /// Profile update failed validation
    #[error("Failed to update profile: {0}")]
    ProfileUpdateFailed(String),

    /// No directory entry for the given email
    #[error("User not found: {0}")]
    UserNotFound(String),

    // ========================================================================
    // Validation Errors (200-299)
    // ========================================================================

    /// A required form field is missing or invalid
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Icon name outside the fixed icon set
    #[error("Invalid course icon: {0}")]
    InvalidIcon(String),

    /// Donation amount rejected before mutation
    #[error("Invalid donation amount: {0}")]
    InvalidDonation(String),

    /// Message image URL is not on the configured image-domain allowlist
    #[error("Image domain not allowed: {0}")]
    ImageDomainNotAllowed(String),

    // ========================================================================
    // Course Errors (300-399)
    // ========================================================================

    /// Course id not present in the catalog
    #[error("Course not found.")]
    CourseNotFound,

    /// The email is already in the course's enrollment list
    #[error("Already enrolled in this course.")]
    AlreadyEnrolled,

    /// The email is not in the course's enrollment list
    #[error("Not enrolled in this course.")]
    NotEnrolled,

    /// Module id not present on the course
    #[error("Module not found.")]
    ModuleNotFound,

    /// Lesson id not present in the module
    #[error("Lesson not found.")]
    LessonNotFound,

    // ========================================================================
    // Community Errors (400-499)
    // ========================================================================

    /// Category id not present
    #[error("Category not found.")]
    CategoryNotFound,

    /// Channel id not present in any category
    #[error("Channel not found.")]
    ChannelNotFound,

    /// A channel with the same slug already exists in the category
    #[error("A channel with this name already exists in the category.")]
    DuplicateChannel,

    /// Only administrators can post to announcement channels
    #[error("Only administrators can post in announcement channels.")]
    AnnouncementRestricted,

    /// Message id not present in the channel
    #[error("Message not found.")]
    MessageNotFound,

    // ========================================================================
    // Event / Feed / Notification Errors (500-599)
    // ========================================================================

    /// Event id not present
    #[error("Event not found.")]
    EventNotFound,

    /// The email is already registered for the event
    #[error("Already registered for this event.")]
    AlreadyRegistered,

    /// Feed post id not present
    #[error("Post not found.")]
    PostNotFound,

    // ========================================================================
    // Storage Errors (600-699)
    // ========================================================================

    /// Stored JSON under a key failed typed decoding
    #[error("Failed to decode stored value under key '{key}': {reason}")]
    Decode {
        /// The store key whose value failed to decode
        key: String,
        /// The underlying serde error message
        reason: String,
    },

    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Versioned entity migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Session
    /// - 200-299: Validation
    /// - 300-399: Courses
    /// - 400-499: Community
    /// - 500-599: Events / feed / notifications
    /// - 600-699: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Session (100-199)
            Error::AuthRequired => 100,
            Error::InvalidCredentials => 101,
            Error::EmailTaken => 102,
            Error::PasswordMismatch => 103,
            Error::AdminRequired => 104,
            Error::ProfileUpdateFailed(_) => 105,
            Error::UserNotFound(_) => 106,

            // Validation (200-299)
            Error::Validation(_) => 200,
            Error::InvalidIcon(_) => 201,
            Error::InvalidDonation(_) => 202,
            Error::ImageDomainNotAllowed(_) => 203,

            // Courses (300-399)
            Error::CourseNotFound => 300,
            Error::AlreadyEnrolled => 301,
            Error::NotEnrolled => 302,
            Error::ModuleNotFound => 303,
            Error::LessonNotFound => 304,

            // Community (400-499)
            Error::CategoryNotFound => 400,
            Error::ChannelNotFound => 401,
            Error::DuplicateChannel => 402,
            Error::AnnouncementRestricted => 403,
            Error::MessageNotFound => 404,

            // Events / feed / notifications (500-599)
            Error::EventNotFound => 500,
            Error::AlreadyRegistered => 501,
            Error::PostNotFound => 502,

            // Storage (600-699)
            Error::Decode { .. } => 600,
            Error::DatabaseError(_) => 601,
            Error::MigrationFailed(_) => 602,

            // Internal (900-999)
            Error::Internal(_) => 900,
            Error::SerializationError(_) => 901,
        }
    }

    /// Check if this error should send the caller back to the login view
    pub fn requires_login(&self) -> bool {
        matches!(self, Error::AuthRequired | Error::InvalidCredentials)
    }

    /// Check if this error is a "not found" condition
    ///
    /// Not-found conditions map to a redirect to the relevant list view
    /// rather than an error dialog.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::CourseNotFound
                | Error::ModuleNotFound
                | Error::LessonNotFound
                | Error::CategoryNotFound
                | Error::ChannelNotFound
                | Error::MessageNotFound
                | Error::EventNotFound
                | Error::PostNotFound
                | Error::UserNotFound(_)
        )
    }

    /// Check if this error is a form-validation failure
    ///
    /// Validation failures are surfaced inline next to the offending field
    /// or as a blocking dialog; they are never thrown past the form handler.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidIcon(_)
                | Error::InvalidDonation(_)
                | Error::ImageDomainNotAllowed(_)
                | Error::PasswordMismatch
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
