//! # Course Poller
//!
//! Fixed-interval background check for newly published courses. Each tick
//! re-reads the entire course list; ids not seen before produce one
//! `novo_curso` notification each. The first tick only primes the baseline,
//! so restarting the poller never re-announces the existing catalog.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;

use super::{Notification, NotificationService, KIND_NEW_COURSE};
use crate::error::Result;
use crate::storage::{keys, EntityStore};

/// The slice of a stored course the poller actually reads
#[derive(Debug, Deserialize)]
struct CourseRef {
    id: i64,
    #[serde(rename = "titulo")]
    title: String,
}

/// Background poller diffing the course catalog between ticks
pub struct CoursePoller {
    store: Arc<EntityStore>,
    notifications: NotificationService,
    interval: Duration,
    /// Course ids seen so far; `None` until the priming tick
    known: Option<HashSet<i64>>,
}

impl CoursePoller {
    /// Create a poller over the shared store
    pub fn new(store: Arc<EntityStore>, interval: Duration) -> Self {
        let notifications = NotificationService::new(Arc::clone(&store));
        Self {
            store,
            notifications,
            interval,
            known: None,
        }
    }

    /// Run one poll pass.
    ///
    /// The first call primes the baseline and notifies nothing. Later
    /// calls push one notification per unseen course id and return the
    /// notifications created.
    pub fn tick(&mut self) -> Result<Vec<Notification>> {
        let courses: Vec<CourseRef> = self
            .store
            .load(keys::COURSES)?
            .unwrap_or_default();
        let current: HashSet<i64> = courses.iter().map(|c| c.id).collect();

        let Some(known) = &self.known else {
            self.known = Some(current);
            return Ok(Vec::new());
        };

        let mut created = Vec::new();
        for course in courses.iter().filter(|c| !known.contains(&c.id)) {
            let notification = self.notifications.push(
                KIND_NEW_COURSE,
                "Novo curso disponível",
                &format!("O curso \"{}\" já está disponível na plataforma.", course.title),
            )?;
            created.push(notification);
        }

        self.known = Some(current);
        Ok(created)
    }

    /// Poll until the shutdown signal fires.
    ///
    /// Teardown is cooperative: flipping the watch value stops the loop at
    /// the next select, the way a view stops its interval on unmount.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.tick() {
                        Ok(created) if !created.is_empty() => {
                            tracing::debug!("Course poll: {} new course(s)", created.len());
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!("Course poll failed: {}", e),
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    }
}

/// Handle to a spawned course poller task
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the poller to stop and wait for the task to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn a poller on the current tokio runtime.
pub fn spawn_course_poller(store: Arc<EntityStore>, interval: Duration) -> PollerHandle {
    let poller = CoursePoller::new(store, interval);
    let (shutdown, receiver) = watch::channel(false);
    let task = tokio::spawn(poller.run(receiver));
    PollerHandle { shutdown, task }
}

// ============================================================================
// TESTS
// ============================================================================
