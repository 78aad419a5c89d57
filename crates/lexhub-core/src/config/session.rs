//! Session and credential persistence configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle and renewal-artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path of the persisted renewal artifact (refresh token) file.
    ///
    /// This is the cookie-equivalent durable value that lets a new process
    /// re-establish a session without re-authentication.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
    /// Renewal artifact lifetime in days; artifacts older than this are
    /// discarded on load instead of being presented to the backend.
    #[serde(default = "default_artifact_ttl")]
    pub artifact_ttl_days: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            artifact_ttl_days: default_artifact_ttl(),
        }
    }
}

fn default_artifact_path() -> String {
    "data/session/refresh_token".to_string()
}

fn default_artifact_ttl() -> u32 {
    7
}
