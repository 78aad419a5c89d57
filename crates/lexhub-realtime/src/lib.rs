//! # lexhub-realtime
//!
//! The real-time notification channel: a persistent WebSocket connection
//! that pushes notification events to the client. Independent of the
//! request gateway, but shares its renewal coordinator so a transport
//! authentication error and a burst of HTTP 401s never race two renewals.

pub mod channel;
pub mod events;
pub mod subscribers;
pub mod transport;

pub use channel::{ChannelState, NotificationChannel};
pub use events::ChannelEvent;
pub use subscribers::{SubscriberRegistry, Subscription};
pub use transport::{ChannelConnection, ChannelTransport, WsTransport};
