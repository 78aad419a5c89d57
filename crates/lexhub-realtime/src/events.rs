//! Channel event types and wire format.

use serde::{Deserialize, Serialize};

use lexhub_entity::Notification;

/// An event delivered over the notification channel.
///
/// Domain events are pushed by the server as JSON text frames of the form
/// `{"event": "...", "data": {...}}`; the connection lifecycle events are
/// synthesized by the channel itself. Events reach subscribers in the
/// order the transport received them; the channel never reorders or
/// coalesces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ChannelEvent {
    /// The channel is connected.
    Connect,
    /// The channel lost its connection.
    Disconnect,
    /// A new notification was created for this user.
    NewNotification {
        /// The notification payload.
        notification: Notification,
        /// Server-side unread count after delivery.
        #[serde(default, rename = "unreadCount")]
        unread_count: Option<u64>,
    },
    /// A notification was marked read (possibly from another tab/device).
    NotificationRead {
        /// The affected notification.
        #[serde(rename = "notificationId")]
        notification_id: String,
        /// Server-side unread count after the change.
        #[serde(default, rename = "unreadCount")]
        unread_count: Option<u64>,
    },
    /// All notifications were marked read.
    AllNotificationsRead {
        /// Server-side unread count after the change (normally zero).
        #[serde(default, rename = "unreadCount")]
        unread_count: Option<u64>,
    },
    /// A notification was deleted.
    NotificationDeleted {
        /// The removed notification.
        #[serde(rename = "notificationId")]
        notification_id: String,
        /// Server-side unread count after the change.
        #[serde(default, rename = "unreadCount")]
        unread_count: Option<u64>,
    },
}

impl ChannelEvent {
    /// The event name subscribers register under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::NewNotification { .. } => "new-notification",
            Self::NotificationRead { .. } => "notification-read",
            Self::AllNotificationsRead { .. } => "all-notifications-read",
            Self::NotificationDeleted { .. } => "notification-deleted",
        }
    }
}
