//! Notification entity model and list/stats payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::NotificationKind;
use super::priority::NotificationPriority;

/// A notification delivered to the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Notification kind.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Priority level.
    pub priority: NotificationPriority,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Whether the user has read this notification.
    #[serde(default)]
    pub is_read: bool,
    /// Identifier of the related entity (task, matter, ...), if any.
    #[serde(default)]
    pub related_id: Option<String>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

/// Paginated notification list payload, including the unread counter the
/// bell badge displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    /// The notifications on this page, newest first.
    #[serde(default)]
    pub notifications: Vec<Notification>,
    /// Total notifications across all pages.
    #[serde(default)]
    pub total: u64,
    /// Unread notifications across all pages.
    #[serde(default)]
    pub unread_count: u64,
    /// Current page (1-based).
    #[serde(default = "default_page")]
    pub current_page: u64,
    /// Total number of pages.
    #[serde(default = "default_page")]
    pub total_pages: u64,
}

impl NotificationPage {
    /// An empty first page.
    pub fn empty() -> Self {
        Self {
            notifications: Vec::new(),
            total: 0,
            unread_count: 0,
            current_page: 1,
            total_pages: 1,
        }
    }
}

/// Aggregate notification statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    /// Totals across all notifications.
    pub summary: StatsSummary,
}

/// Summary counters within [`NotificationStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Total notifications.
    pub total: u64,
    /// Unread notifications.
    pub unread: u64,
}

fn default_page() -> u64 {
    1
}
