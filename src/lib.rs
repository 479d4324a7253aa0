//! # Verdant Core
//!
//! Core library for the Verdant community and course platform:
//! authentication, channel-based chat, a course catalog with enrollment and
//! donations, events, a social feed, and notifications, all persisted
//! through one local key-value store of JSON entities.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VERDANT CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐    │
//! │  │   Session   │  │  Community  │  │   Courses   │  │    Events    │    │
//! │  │             │  │             │  │             │  │              │    │
//! │  │ - Register  │  │ - Categories│  │ - Catalog   │  │ - Listing    │    │
//! │  │ - Login     │  │ - Channels  │  │ - Enroll    │  │ - Register   │    │
//! │  │ - Profile   │  │ - Messages  │  │ - Donate    │  │ - Migration  │    │
//! │  └──────┬──────┘  └──────┬──────┘  │ - Lessons   │  └──────┬───────┘    │
//! │         │                │         └──────┬──────┘         │            │
//! │  ┌──────┴──────┐  ┌──────┴──────┐         │         ┌──────┴───────┐    │
//! │  │    Feed     │  │    Admin    │         │         │Notifications │    │
//! │  │             │  │             │         │         │              │    │
//! │  │ - Posts     │  │ - Directory │         │         │ - List/read  │    │
//! │  │ - Likes     │  │ - Promote   │         │         │ - 30s poller │    │
//! │  └──────┬──────┘  └──────┬──────┘         │         └──────┬───────┘    │
//! │         │                │                │                │            │
//! │         └────────────────┴───────┬────────┴────────────────┘            │
//! │                                  ▼                                      │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  Storage: EntityStore over a SQLite key-value table             │    │
//! │  │  One JSON document per entity key; synchronous read-modify-     │    │
//! │  │  write; last-write-wins; no cross-key transactions.             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Runtime configuration
//! - [`storage`] - The Local Entity Store (typed JSON over SQLite)
//! - [`session`] - Accounts, login, profile settings
//! - [`community`] - Categories, channels, messaging
//! - [`courses`] - Catalog, enrollment, donations, lessons
//! - [`events`] - Events and the versioned shape migration
//! - [`feed`] - Social feed posts
//! - [`notifications`] - Notification list and the course poller
//! - [`admin`] - User directory administration
//!
//! ## Persistence Model
//!
//! Every entity lives under one string key as a UTF-8 JSON document (see
//! [`storage::keys`]). Reads decode into typed structs at the store
//! boundary; updates rewrite the whole entity. There is no cross-key
//! transaction and no cross-instance coordination: concurrent writers of
//! one key are last-write-wins. The only background activity is the course
//! poller, which re-reads the catalog on a fixed interval.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod admin;
pub mod community;
pub mod config;
pub mod courses;
pub mod error;
pub mod events;
pub mod feed;
pub mod notifications;
pub mod session;
pub mod storage;
/// Time utilities shared by every service.
pub mod time;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use session::{ProfileUpdate, SessionUser};

use std::sync::Arc;

use admin::AdminService;
use community::CommunityService;
use courses::CourseService;
use events::EventService;
use feed::FeedService;
use notifications::{spawn_course_poller, NotificationService, PollerHandle};
use storage::{EntityStore, StorageConfig};

// ============================================================================
// PLATFORM
// ============================================================================

/// The assembled platform: every service wired over one shared store.
///
/// The store is injected into each service rather than reached through a
/// global, so tests (and embedders) can run any number of isolated
/// instances side by side.
///
/// ## Example
///
/// ```ignore
/// use verdant_core::{CoreConfig, Platform};
///
/// let platform = Platform::open(CoreConfig::default())?;
/// let user = platform.session.register("Ana", "ana@exemplo.com", "s", "s")?;
/// let courses = platform.courses.courses()?;
/// ```
pub struct Platform {
    store: Arc<EntityStore>,
    config: CoreConfig,

    /// Accounts, login, profile settings
    pub session: session::SessionService,
    /// Categories, channels, messaging
    pub community: CommunityService,
    /// Catalog, enrollment, donations, lessons
    pub courses: CourseService,
    /// Events and registration
    pub events: EventService,
    /// Social feed posts
    pub feed: FeedService,
    /// Notification list
    pub notifications: NotificationService,
    /// User directory administration
    pub admin: AdminService,
}

impl Platform {
    /// Open the platform: initialize storage, run the event shape
    /// migration, and wire every service over the shared store.
    pub fn open(config: CoreConfig) -> Result<Self> {
        tracing::info!("Opening Verdant Core v{}", env!("CARGO_PKG_VERSION"));

        let store = Arc::new(storage::init(StorageConfig {
            database_path: config.storage_path.clone(),
        })?);

        let events = EventService::new(Arc::clone(&store), config.clone());
        let migration = events.migrate_events()?;
        for failure in &migration.failures {
            tracing::warn!(
                "Event record {:?} left unmigrated: {}",
                failure.id,
                failure.reason
            );
        }

        Ok(Self {
            session: session::SessionService::new(Arc::clone(&store), config.clone()),
            community: CommunityService::new(Arc::clone(&store), config.clone()),
            courses: CourseService::new(Arc::clone(&store), config.clone()),
            events,
            feed: FeedService::new(Arc::clone(&store)),
            notifications: NotificationService::new(Arc::clone(&store)),
            admin: AdminService::new(Arc::clone(&store)),
            store,
            config,
        })
    }

    /// The shared entity store
    pub fn store(&self) -> Arc<EntityStore> {
        Arc::clone(&self.store)
    }

    /// The configuration this platform was opened with
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Spawn the background course poller on the current tokio runtime.
    ///
    /// The returned handle stops the poller; dropping the handle leaves it
    /// running until the runtime shuts down.
    pub fn start_course_poller(&self) -> PollerHandle {
        spawn_course_poller(self.store(), self.config.course_poll_interval)
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Verdant Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
