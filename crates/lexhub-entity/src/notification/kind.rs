//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

/// Kind of a notification for filtering and preference matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Task-related notifications (assignment, due date, completion).
    Task,
    /// Matter-related notifications.
    Matter,
    /// Calendar event notifications.
    Calendar,
    /// Document-related notifications.
    Document,
    /// Reminder notifications.
    Reminder,
    /// System-level notifications.
    System,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Matter => "matter",
            Self::Calendar => "calendar",
            Self::Document => "document",
            Self::Reminder => "reminder",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
