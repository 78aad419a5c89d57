//! Channel-to-cache synchronization.
//!
//! Subscribes the notification API surface to the real-time channel so
//! push events land in the cached list and unread counter without a
//! refetch. New-notification events are filtered through the user's
//! notification preferences before they are surfaced; read, read-all, and
//! delete events always sync, since they reflect state changes the user
//! made elsewhere.

use std::sync::Arc;

use tracing::debug;

use lexhub_api::NotificationsApi;
use lexhub_entity::NotificationPreferences;
use lexhub_realtime::{ChannelEvent, NotificationChannel, Subscription};

/// Event names the sync attaches to.
const SYNCED_EVENTS: [&str; 5] = [
    "connect",
    "new-notification",
    "notification-read",
    "all-notifications-read",
    "notification-deleted",
];

/// Wires channel events into the notification cache.
///
/// Dropping the returned subscriptions (or disconnecting the channel)
/// detaches the sync.
pub fn attach(
    channel: &NotificationChannel,
    notifications: Arc<NotificationsApi>,
    preferences: NotificationPreferences,
) -> Vec<Subscription> {
    let preferences = Arc::new(preferences);

    SYNCED_EVENTS
        .iter()
        .map(|event| {
            let notifications = notifications.clone();
            let preferences = preferences.clone();
            channel.on(
                *event,
                Arc::new(move |event: &ChannelEvent| {
                    if let ChannelEvent::NewNotification { notification, .. } = event {
                        if !preferences.allows(notification) {
                            debug!(id = %notification.id, "Push suppressed by preferences");
                            return;
                        }
                    }
                    notifications.apply_push(event);
                }),
            )
        })
        .collect()
}
