//! Notification domain entities.

pub mod kind;
pub mod model;
pub mod preference;
pub mod priority;

pub use kind::NotificationKind;
pub use model::{Notification, NotificationPage, NotificationStats, StatsSummary};
pub use preference::NotificationPreferences;
pub use priority::NotificationPriority;
