//! # Notifier
//!
//! In-process publish/subscribe service for operator notifications
//! ("entry received", "email sync failed", ...). Held in [`AppState`] and
//! shared by handle; there is no global instance.
//!
//! The list is bounded: adding past capacity evicts the oldest item.
//! Dismissed items stay visible (flagged) until a removal delay elapses.
//! Every change is broadcast as a [`NotifierEvent`] to all subscribers;
//! slow subscribers lag and skip events rather than block publishers.
//!
//! [`AppState`]: crate::state::AppState

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

/// Maximum notifications kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 50;

/// How long a dismissed notification lingers before removal.
pub const DEFAULT_REMOVE_DELAY: Duration = Duration::from_secs(5);

const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by [`Notifier::update`]. `None` fields are kept.
#[derive(Debug, Clone, Default)]
pub struct NotificationUpdate {
    pub level: Option<NotificationLevel>,
    pub title: Option<String>,
    pub message: Option<String>,
}

/// A change to the notification list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierEvent {
    Added { notification: Notification },
    Updated { notification: Notification },
    Dismissed { id: u64 },
    Removed { id: u64 },
}

impl NotifierEvent {
    /// Event name used on the SSE stream.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Updated { .. } => "updated",
            Self::Dismissed { .. } => "dismissed",
            Self::Removed { .. } => "removed",
        }
    }
}

#[derive(Debug)]
struct Inner {
    items: Mutex<VecDeque<Notification>>,
    next_id: AtomicU64,
    capacity: usize,
    remove_delay: Duration,
    events: broadcast::Sender<NotifierEvent>,
}

/// Shared notification service. Cloning yields another handle to the same list.
#[derive(Debug, Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_REMOVE_DELAY)
    }
}

impl Notifier {
    pub fn new(capacity: usize, remove_delay: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::with_capacity(capacity)),
                next_id: AtomicU64::new(1),
                capacity: capacity.max(1),
                remove_delay,
                events,
            }),
        }
    }

    /// Publish a new notification and return its id.
    pub fn add(
        &self,
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> u64 {
        let now = Utc::now();
        let notification = Notification {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            title: title.into(),
            message: message.into(),
            dismissed: false,
            created_at: now,
            updated_at: now,
        };
        let id = notification.id;

        let evicted: Vec<u64> = {
            let mut items = self.inner.items.lock();
            items.push_back(notification.clone());
            let overflow = items.len().saturating_sub(self.inner.capacity);
            items.drain(..overflow).map(|n| n.id).collect()
        };

        self.publish(NotifierEvent::Added { notification });
        for id in evicted {
            self.publish(NotifierEvent::Removed { id });
        }
        id
    }

    /// Apply `update` to notification `id`. Returns the updated value.
    pub fn update(&self, id: u64, update: NotificationUpdate) -> Option<Notification> {
        let updated = {
            let mut items = self.inner.items.lock();
            let item = items.iter_mut().find(|n| n.id == id)?;
            if let Some(level) = update.level {
                item.level = level;
            }
            if let Some(title) = update.title {
                item.title = title;
            }
            if let Some(message) = update.message {
                item.message = message;
            }
            item.updated_at = Utc::now();
            item.clone()
        };

        self.publish(NotifierEvent::Updated {
            notification: updated.clone(),
        });
        Some(updated)
    }

    /// Mark notification `id` dismissed and schedule its removal.
    ///
    /// Returns `false` when the id is unknown or already dismissed.
    pub fn dismiss(&self, id: u64) -> bool {
        let newly_dismissed = {
            let mut items = self.inner.items.lock();
            match items.iter_mut().find(|n| n.id == id) {
                Some(item) if !item.dismissed => {
                    item.dismissed = true;
                    item.updated_at = Utc::now();
                    true
                }
                _ => false,
            }
        };
        if !newly_dismissed {
            return false;
        }

        self.publish(NotifierEvent::Dismissed { id });

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let notifier = self.clone();
                let delay = self.inner.remove_delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    notifier.remove(id);
                });
            }
            Err(_) => {
                self.remove(id);
            }
        }
        true
    }

    /// Remove notification `id` immediately.
    pub fn remove(&self, id: u64) -> bool {
        let removed = {
            let mut items = self.inner.items.lock();
            let before = items.len();
            items.retain(|n| n.id != id);
            items.len() != before
        };
        if removed {
            self.publish(NotifierEvent::Removed { id });
        }
        removed
    }

    /// Snapshot of current notifications, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        self.inner.items.lock().iter().cloned().collect()
    }

    pub fn get(&self, id: u64) -> Option<Notification> {
        self.inner.items.lock().iter().find(|n| n.id == id).cloned()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotifierEvent> {
        self.inner.events.subscribe()
    }

    fn publish(&self, event: NotifierEvent) {
        // No subscribers is not an error.
        let _ = self.inner.events.send(event);
    }
}
