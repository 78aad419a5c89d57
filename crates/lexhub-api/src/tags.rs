//! Cache invalidation tags.
//!
//! Queries register their cache entries under these tags; mutations name
//! the tags they invalidate. Per-record tags are derived with the helper
//! functions so list entries and single-record entries can be invalidated
//! independently.

/// Notification list entries.
pub const NOTIFICATIONS: &str = "Notifications";
/// Notification statistics entries.
pub const NOTIFICATION_STATS: &str = "NotificationStats";
/// The unread-count badge entry.
pub const NOTIFICATION_COUNT: &str = "NotificationCount";

/// Matter list entries.
pub const MATTERS: &str = "Matters";
/// Matter statistics entries.
pub const MATTER_STATS: &str = "MatterStats";

/// Task list entries.
pub const TASKS: &str = "Tasks";
/// Task statistics entries.
pub const TASK_STATS: &str = "TaskStats";

/// Tag for one matter record.
pub fn matter_tag(id: &str) -> String {
    format!("Matter:{id}")
}

/// Tag for one task record.
pub fn task_tag(id: &str) -> String {
    format!("Task:{id}")
}
