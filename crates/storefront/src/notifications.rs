//! Transient user-facing notifications.
//!
//! The cart shows short messages ("Onesie added to cart!") that disappear on
//! their own after a fixed interval. A [`Notifier`] receives them;
//! [`NotificationCenter`] keeps the ones still on screen.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use bespoke_baby_core::NotificationId;
use tokio::time::Instant;

use crate::config::StorefrontConfig;

/// Default time a notification stays visible.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// How a notification is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Auto-dismissing toast.
    Toast,
    /// Confirmation the shopper must acknowledge (the purchase summary).
    Confirmation,
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    /// An auto-dismissing toast.
    #[must_use]
    pub fn toast(message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::generate(),
            kind: NotificationKind::Toast,
            message: message.into(),
        }
    }

    /// A confirmation dialog.
    #[must_use]
    pub fn confirmation(message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::generate(),
            kind: NotificationKind::Confirmation,
            message: message.into(),
        }
    }
}

/// Receiver of notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notification: Notification) {}
}

#[derive(Debug)]
struct Entry {
    notification: Notification,
    expires_at: Option<Instant>,
}

/// Holds visible notifications and expires toasts after a fixed TTL.
///
/// At most one notification of each kind is shown: a new toast replaces the
/// current toast, a new confirmation the current confirmation. Confirmations
/// otherwise stay until [`NotificationCenter::dismiss`] is called. Expired
/// toasts are dropped whenever the center is read or written.
#[derive(Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    entries: Mutex<VecDeque<Entry>>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// A center using the configured toast lifetime.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(config.notification_ttl)
    }

    /// Notifications still on screen, oldest first.
    #[must_use]
    pub fn visible(&self) -> Vec<Notification> {
        let now = Instant::now();
        let Ok(mut entries) = self.entries.lock() else {
            return Vec::new();
        };
        entries.retain(|entry| entry.expires_at.is_none_or(|at| at > now));
        entries
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    /// Messages of the notifications still on screen, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.visible()
            .into_iter()
            .map(|notification| notification.message)
            .collect()
    }

    /// Remove a notification before it expires.
    pub fn dismiss(&self, id: NotificationId) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|entry| entry.notification.id != id);
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        tracing::debug!(message = %notification.message, "Notification shown");
        let now = Instant::now();
        let expires_at = match notification.kind {
            NotificationKind::Toast => Some(now + self.ttl),
            NotificationKind::Confirmation => None,
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|entry| {
                entry.notification.kind != notification.kind
                    && entry.expires_at.is_none_or(|at| at > now)
            });
            entries.push_back(Entry {
                notification,
                expires_at,
            });
        }
    }
}
