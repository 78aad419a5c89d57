//! Entity cache configuration.

use serde::{Deserialize, Serialize};

/// Client-side entity cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached query results.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Seconds an entry is retained after its last subscriber detaches.
    #[serde(default = "default_keep_unused")]
    pub keep_unused_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            keep_unused_seconds: default_keep_unused(),
        }
    }
}

fn default_max_capacity() -> u64 {
    1000
}

fn default_keep_unused() -> u64 {
    60
}
