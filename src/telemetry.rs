//! Tracing initialization.

use tracing_subscriber::{EnvFilter, fmt};

use lexhub_core::config::LoggingConfig;

/// Initialize tracing from logging configuration.
///
/// `RUST_LOG` wins over the configured level when set. Call once per
/// process; a second call is a no-op because the global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .try_init(),
        _ => fmt().with_env_filter(filter).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
