//! Backend API endpoint configuration.

use serde::{Deserialize, Serialize};

/// Backend HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for REST requests, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// WebSocket URL for the notification channel,
    /// e.g. `wss://api.example.com/ws`.
    pub ws_url: String,
    /// Request timeout in seconds for the underlying HTTP client.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}
