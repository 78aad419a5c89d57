//! # lexhub-entity
//!
//! Domain entities for the LexHub client SDK. These are wire-faithful
//! serde types for the payloads the backend exchanges over HTTP and the
//! notification channel; the server owns every record, the client holds
//! read-through cache copies.

pub mod auth;
pub mod matter;
pub mod notification;
pub mod task;
pub mod user;

pub use auth::{AuthResponse, LoginRequest};
pub use matter::{Matter, MatterPage, PageInfo};
pub use notification::{
    Notification, NotificationKind, NotificationPage, NotificationPreferences,
    NotificationPriority, NotificationStats,
};
pub use task::{Task, TaskPage};
pub use user::User;
