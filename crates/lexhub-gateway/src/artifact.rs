//! Persisted renewal-artifact storage.
//!
//! The renewal artifact (refresh token) is the only durable client-side
//! state in this layer. It is the cookie-equivalent value that lets a new
//! process re-establish a session without re-authentication.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lexhub_core::AppResult;
use lexhub_core::config::SessionConfig;

/// Durable storage for the renewal artifact: three primitive operations,
/// one named value.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Load the stored artifact, if any.
    async fn load(&self) -> AppResult<Option<String>>;

    /// Store (replace) the artifact.
    async fn store(&self, value: &str) -> AppResult<()>;

    /// Delete the artifact.
    async fn clear(&self) -> AppResult<()>;
}

/// File-backed artifact store.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated artifact. Artifacts older than
/// the configured TTL are discarded on load rather than presented to the
/// backend.
#[derive(Debug)]
pub struct FileArtifactStore {
    path: PathBuf,
    ttl: Duration,
}

impl FileArtifactStore {
    /// Create a store from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            path: PathBuf::from(&config.artifact_path),
            ttl: Duration::from_secs(u64::from(config.artifact_ttl_days) * 24 * 60 * 60),
        }
    }

    async fn is_expired(&self) -> AppResult<bool> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        let age = metadata
            .modified()?
            .elapsed()
            .unwrap_or(Duration::from_secs(0));
        Ok(age > self.ttl)
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn load(&self) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(value) => {
                if self.is_expired().await? {
                    warn!(path = %self.path.display(), "Renewal artifact expired, discarding");
                    self.clear().await?;
                    return Ok(None);
                }
                let value = value.trim().to_string();
                Ok((!value.is_empty()).then_some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, value: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "Renewal artifact stored");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory artifact store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    value: Mutex<Option<String>>,
}

impl MemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with an artifact.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn load(&self) -> AppResult<Option<String>> {
        Ok(self.value.lock().await.clone())
    }

    async fn store(&self, value: &str) -> AppResult<()> {
        *self.value.lock().await = Some(value.to_string());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.value.lock().await = None;
        Ok(())
    }
}
