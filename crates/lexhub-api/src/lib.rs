//! # lexhub-api
//!
//! Typed endpoint surfaces for the LexHub backend, built on the request
//! gateway and the entity cache. Each surface declares which invalidation
//! tags its queries provide and its mutations invalidate; the notification
//! surface additionally patches the cache optimistically and folds
//! real-time channel events into it.

use serde_json::Value;

pub mod matters;
pub mod notifications;
pub mod tags;
pub mod tasks;

pub use matters::MattersApi;
pub use notifications::{NotificationListQuery, NotificationsApi};
pub use tasks::TasksApi;

/// Unwraps the backend's `{ "data": ... }` envelope, passing bare payloads
/// through untouched.
pub(crate) fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
