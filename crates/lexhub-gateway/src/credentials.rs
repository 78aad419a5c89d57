//! Process-wide credential state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use lexhub_core::AppResult;
use lexhub_entity::User;

use crate::artifact::ArtifactStore;

/// The in-memory bearer credential.
///
/// At most one credential is current at a time; installing a new one
/// invalidates the previous for new requests (in-flight requests keep
/// whatever credential they already attached).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Opaque access token; expiry is server-validated.
    pub access_token: String,
}

#[derive(Debug, Default)]
struct Inner {
    credential: Option<Credential>,
    user: Option<User>,
}

/// Holds the current credential and user profile, mirrored to the
/// persisted renewal artifact.
///
/// The in-memory state and the artifact are always written under one lock,
/// so there is no window where one is set and the other is stale.
pub struct CredentialStore {
    inner: RwLock<Inner>,
    artifact: Arc<dyn ArtifactStore>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Create an empty store backed by the given artifact storage.
    pub fn new(artifact: Arc<dyn ArtifactStore>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            artifact,
        }
    }

    /// The current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .credential
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    /// The current user profile, if any.
    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    /// Whether a credential is currently held.
    pub async fn has_credential(&self) -> bool {
        self.inner.read().await.credential.is_some()
    }

    /// Install a new credential and profile, persisting the renewal
    /// artifact in the same critical section when one was issued.
    pub async fn install(
        &self,
        access_token: impl Into<String>,
        user: User,
        refresh_token: Option<&str>,
    ) -> AppResult<Credential> {
        let credential = Credential {
            access_token: access_token.into(),
        };
        let mut inner = self.inner.write().await;
        if let Some(artifact) = refresh_token {
            self.artifact.store(artifact).await?;
        }
        inner.credential = Some(credential.clone());
        inner.user = Some(user);
        debug!("Credential installed");
        Ok(credential)
    }

    /// Update only the profile (e.g. after `GET /auth/me`).
    pub async fn set_user(&self, user: User) {
        self.inner.write().await.user = Some(user);
    }

    /// Clear the credential, profile, and persisted artifact together.
    pub async fn clear(&self) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        self.artifact.clear().await?;
        inner.credential = None;
        inner.user = None;
        debug!("Credential cleared");
        Ok(())
    }

    /// Load the persisted renewal artifact.
    pub async fn renewal_artifact(&self) -> AppResult<Option<String>> {
        self.artifact.load().await
    }
}
