//! Flash notifications.
//!
//! Handlers queue a notification in the session before redirecting; the
//! next page render drains the queue into the notification region, where
//! each toast dismisses itself after the configured timeout.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// How long a toast stays on screen.
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Info => "toast--info",
            Self::Error => "toast--error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Screen corner the notification region is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    #[default]
    BottomRight,
}

impl Position {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
        }
    }
}

/// Placement and lifetime of toasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationConfig {
    pub position: Position,
    pub timeout: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            position: Position::BottomRight,
            timeout: NOTIFICATION_TIMEOUT,
        }
    }
}

impl NotificationConfig {
    #[must_use]
    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }
}

/// Queue a notification for the next rendered page.
///
/// Failures are logged and swallowed; a lost toast never fails a request.
pub async fn push(session: &Session, notification: Notification) {
    let mut queue = session
        .get::<Vec<Notification>>(session_keys::NOTIFICATIONS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queue.push(notification);

    if let Err(e) = session.insert(session_keys::NOTIFICATIONS, queue).await {
        tracing::warn!("Failed to queue notification: {e}");
    }
}

/// Take every queued notification, leaving the queue empty.
pub async fn drain(session: &Session) -> Vec<Notification> {
    session
        .remove::<Vec<Notification>>(session_keys::NOTIFICATIONS)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to read notifications: {e}");
            None
        })
        .unwrap_or_default()
}
