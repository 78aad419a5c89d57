//! # lexhub
//!
//! Client SDK for the LexHub legal practice management backend.
//!
//! [`Client`] is the composition root: it wires the HTTP transport, the
//! token-refresh-aware request gateway, the session manager, the tagged
//! entity cache, the typed API surfaces, and the real-time notification
//! channel from one [`AppConfig`]. The channel and the gateway share a
//! single renewal coordinator, so credential expiry is resolved exactly
//! once no matter which side observes it first.
//!
//! ```no_run
//! use lexhub::Client;
//! use lexhub_core::config::AppConfig;
//!
//! # async fn run() -> lexhub_core::AppResult<()> {
//! let config = AppConfig::load("production")?;
//! let client = Client::new(&config)?;
//! client.session().initialize().await?;
//! let page = client.notifications().list(&Default::default()).await?;
//! println!("{} unread", page.unread_count);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod sync;
pub mod telemetry;

pub use client::Client;

pub use lexhub_api::{MattersApi, NotificationListQuery, NotificationsApi, TasksApi};
pub use lexhub_cache::QueryCache;
pub use lexhub_core::config::AppConfig;
pub use lexhub_core::{AppError, AppResult};
pub use lexhub_entity::{
    Matter, Notification, NotificationPage, NotificationPreferences, Task, User,
};
pub use lexhub_gateway::{SessionSignal, SessionSignals};
pub use lexhub_realtime::{ChannelEvent, ChannelState, NotificationChannel};
pub use lexhub_session::{SessionManager, SessionStatus};
