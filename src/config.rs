//! # Configuration
//!
//! Runtime configuration for Verdant Core. The surface is intentionally
//! small: a storage path, the image-domain allowlist for message/avatar
//! URLs, the course poll interval, and an optional bootstrap admin email.

use std::time::Duration;

/// Default interval between course-catalog polls.
pub const DEFAULT_COURSE_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for initializing Verdant Core
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Path to the store database file (None for in-memory)
    pub storage_path: Option<String>,

    /// Domains that message images and avatars may be loaded from.
    /// Relative paths (bundled assets) are always allowed.
    pub allowed_image_domains: Vec<String>,

    /// Interval between background polls of the course catalog
    pub course_poll_interval: Duration,

    /// Email granted administrator status on login/registration, in
    /// addition to directory entries flagged as admin
    pub admin_email: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            allowed_image_domains: vec!["api.dicebear.com".to_string()],
            course_poll_interval: DEFAULT_COURSE_POLL_INTERVAL,
            admin_email: None,
        }
    }
}

impl CoreConfig {
    /// Check whether an image URL is acceptable under the allowlist.
    ///
    /// Relative paths are bundled assets and always pass. Absolute URLs
    /// pass when their host matches an allowlisted domain exactly.
    pub fn image_url_allowed(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            // No scheme: treat as a relative/bundled asset path.
            return true;
        };
        self.allowed_image_domains.iter().any(|d| d == host)
    }
}

/// Extract the host portion of an absolute http(s) URL, without the port.
fn host_of(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    Some(host.split(':').next().unwrap_or(host))
}
