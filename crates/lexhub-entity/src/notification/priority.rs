//! Notification priority enumeration.

use serde::{Deserialize, Serialize};

/// Priority level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Requires immediate attention.
    Urgent,
    /// High priority.
    High,
    /// Normal priority.
    Medium,
    /// Low priority.
    Low,
}

impl NotificationPriority {
    /// Return the priority as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
