//! Notification preference entity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::kind::NotificationKind;
use super::model::Notification;
use super::priority::NotificationPriority;

/// Per-user notification surfacing preferences.
///
/// Preferences filter which notifications are surfaced to the UI; they do
/// not affect server-side delivery or unread counting. A kind or priority
/// absent from the maps is treated as enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    /// Master switch for in-app notifications.
    #[serde(default = "default_true")]
    pub in_app: bool,
    /// Per-kind enablement.
    #[serde(default, rename = "types")]
    pub kinds: HashMap<NotificationKind, bool>,
    /// Per-priority enablement.
    #[serde(default)]
    pub priorities: HashMap<NotificationPriority, bool>,
}

impl NotificationPreferences {
    /// Whether this notification should be surfaced to the UI.
    pub fn allows(&self, notification: &Notification) -> bool {
        if !self.in_app {
            return false;
        }
        let kind_ok = self.kinds.get(&notification.kind).copied().unwrap_or(true);
        let priority_ok = self
            .priorities
            .get(&notification.priority)
            .copied()
            .unwrap_or(true);
        kind_ok && priority_ok
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            in_app: true,
            kinds: HashMap::new(),
            priorities: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
