//! Real-time notification channel configuration.

use serde::{Deserialize, Serialize};

/// Notification channel (WebSocket) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum consecutive reconnect attempts before surfacing a
    /// connection-lost state.
    #[serde(default = "default_max_reconnect")]
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect(),
            reconnect_delay_ms: default_reconnect_delay(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_max_reconnect() -> u32 {
    3
}

fn default_reconnect_delay() -> u64 {
    1000
}

fn default_connect_timeout() -> u64 {
    10
}
