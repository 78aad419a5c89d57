//! Optimistic patch descriptors for the notification surface.
//!
//! Each descriptor is built at mutation-issue time and captures whatever
//! prior state its inverse needs (which entries were unread, the removed
//! record), so applying and inverting is deterministic regardless of what
//! happened to the cache in between.

use serde_json::{Value, json};

use lexhub_cache::ValuePatch;

/// Marks one notification read and decrements the unread counter.
pub struct MarkReadPatch {
    pub id: String,
}

impl ValuePatch for MarkReadPatch {
    fn apply(&self, mut state: Value) -> Value {
        let mut flipped = false;
        if let Some(items) = state
            .get_mut("notifications")
            .and_then(Value::as_array_mut)
        {
            for item in items {
                if item.get("_id").and_then(Value::as_str) == Some(self.id.as_str())
                    && item.get("isRead") == Some(&Value::Bool(false))
                {
                    item["isRead"] = Value::Bool(true);
                    flipped = true;
                }
            }
        }
        if flipped {
            adjust_unread(&mut state, -1);
        }
        state
    }

    fn invert(&self, mut state: Value) -> Value {
        let mut flipped = false;
        if let Some(items) = state
            .get_mut("notifications")
            .and_then(Value::as_array_mut)
        {
            for item in items {
                if item.get("_id").and_then(Value::as_str) == Some(self.id.as_str())
                    && item.get("isRead") == Some(&Value::Bool(true))
                {
                    item["isRead"] = Value::Bool(false);
                    flipped = true;
                }
            }
        }
        if flipped {
            adjust_unread(&mut state, 1);
        }
        state
    }
}

/// Marks every notification read and zeroes the unread counter.
///
/// The ids that were unread and the counter value are captured when the
/// mutation is issued, since zeroing is not invertible from the result
/// alone.
pub struct MarkAllReadPatch {
    pub previously_unread: Vec<String>,
    pub previous_unread_count: u64,
}

impl ValuePatch for MarkAllReadPatch {
    fn apply(&self, mut state: Value) -> Value {
        if let Some(items) = state
            .get_mut("notifications")
            .and_then(Value::as_array_mut)
        {
            for item in items {
                item["isRead"] = Value::Bool(true);
            }
        }
        state["unreadCount"] = json!(0);
        state
    }

    fn invert(&self, mut state: Value) -> Value {
        if let Some(items) = state
            .get_mut("notifications")
            .and_then(Value::as_array_mut)
        {
            for item in items {
                let id = item.get("_id").and_then(Value::as_str).unwrap_or_default();
                if self.previously_unread.iter().any(|u| u == id) {
                    item["isRead"] = Value::Bool(false);
                }
            }
        }
        state["unreadCount"] = json!(self.previous_unread_count);
        state
    }
}

/// Removes one notification from the list, decrementing the unread
/// counter only when the removed record was unread.
pub struct DeleteNotificationPatch {
    pub id: String,
    /// The record as captured at issue time; used to reinsert on invert.
    pub removed: Option<Value>,
    pub was_unread: bool,
    pub index: usize,
}

impl ValuePatch for DeleteNotificationPatch {
    fn apply(&self, mut state: Value) -> Value {
        let mut removed = false;
        if let Some(items) = state
            .get_mut("notifications")
            .and_then(Value::as_array_mut)
        {
            let before = items.len();
            items.retain(|item| item.get("_id").and_then(Value::as_str) != Some(self.id.as_str()));
            removed = items.len() != before;
        }
        if removed && self.was_unread {
            adjust_unread(&mut state, -1);
        }
        state
    }

    fn invert(&self, mut state: Value) -> Value {
        let Some(record) = &self.removed else {
            return state;
        };
        if let Some(items) = state
            .get_mut("notifications")
            .and_then(Value::as_array_mut)
        {
            let position = self.index.min(items.len());
            items.insert(position, record.clone());
        }
        if self.was_unread {
            adjust_unread(&mut state, 1);
        }
        state
    }
}

/// Shifts the unread counter in a stats payload, clamped at zero.
pub struct StatsUnreadDelta {
    pub delta: i64,
}

impl ValuePatch for StatsUnreadDelta {
    fn apply(&self, mut state: Value) -> Value {
        adjust_stats_unread(&mut state, self.delta);
        state
    }

    fn invert(&self, mut state: Value) -> Value {
        adjust_stats_unread(&mut state, -self.delta);
        state
    }
}

/// Zeroes the unread counter in a stats payload, restoring the captured
/// value on invert.
pub struct StatsUnreadZero {
    pub previous_unread: u64,
}

impl ValuePatch for StatsUnreadZero {
    fn apply(&self, mut state: Value) -> Value {
        if let Some(summary) = state.get_mut("summary") {
            summary["unread"] = json!(0);
        }
        state
    }

    fn invert(&self, mut state: Value) -> Value {
        if let Some(summary) = state.get_mut("summary") {
            summary["unread"] = json!(self.previous_unread);
        }
        state
    }
}

/// Applies `delta` to `unreadCount`, clamped at zero.
pub(crate) fn adjust_unread(state: &mut Value, delta: i64) {
    let current = state
        .get("unreadCount")
        .and_then(Value::as_u64)
        .unwrap_or(0) as i64;
    state["unreadCount"] = json!((current + delta).max(0));
}

fn adjust_stats_unread(state: &mut Value, delta: i64) {
    if let Some(summary) = state.get_mut("summary") {
        let current = summary.get("unread").and_then(Value::as_u64).unwrap_or(0) as i64;
        summary["unread"] = json!((current + delta).max(0));
    }
}
