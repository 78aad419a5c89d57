//! Session lifecycle manager: initialize, login, logout, password flows.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use lexhub_core::{AppError, AppResult};
use lexhub_entity::{AuthResponse, LoginRequest, User};
use lexhub_gateway::{ApiRequest, CredentialStore, RefreshCoordinator, RequestGateway};

use crate::state::SessionStatus;

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: User,
}

/// Manages the session lifecycle state machine.
///
/// `initialize` is idempotent: concurrent and repeated calls settle on one
/// outcome, and `reset` returns the machine to `Uninitialized` so tests
/// can run multiple lifecycles in one process.
pub struct SessionManager {
    gateway: Arc<RequestGateway>,
    credentials: Arc<CredentialStore>,
    refresh: Arc<RefreshCoordinator>,
    status: RwLock<SessionStatus>,
    init_lock: Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager in the `Uninitialized` state.
    pub fn new(
        gateway: Arc<RequestGateway>,
        credentials: Arc<CredentialStore>,
        refresh: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            refresh,
            status: RwLock::new(SessionStatus::Uninitialized),
            init_lock: Mutex::new(()),
        }
    }

    /// The current lifecycle state.
    pub async fn status(&self) -> SessionStatus {
        *self.status.read().await
    }

    /// The authenticated user's profile, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.credentials.user().await
    }

    /// Attempt to establish a session without user interaction.
    ///
    /// With a credential but no profile, fetches `GET /auth/me`. With no
    /// credential but a persisted renewal artifact, performs a silent
    /// renewal through the shared coordinator. With neither, settles on
    /// `Unauthenticated` without any network call.
    ///
    /// Idempotent: once the machine has left `Uninitialized`, further calls
    /// return the settled state.
    pub async fn initialize(&self) -> AppResult<SessionStatus> {
        let _guard = self.init_lock.lock().await;

        let current = *self.status.read().await;
        if current != SessionStatus::Uninitialized {
            return Ok(current);
        }

        *self.status.write().await = SessionStatus::Pending;

        let outcome = self.initialize_inner().await;
        let status = match outcome {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "Session initialization failed");
                SessionStatus::Unauthenticated
            }
        };

        *self.status.write().await = status;
        info!(status = %status, "Session initialized");
        Ok(status)
    }

    async fn initialize_inner(&self) -> AppResult<SessionStatus> {
        if self.credentials.has_credential().await {
            if self.credentials.user().await.is_none() {
                let me: MeResponse = self.gateway.send_json(&ApiRequest::get("/auth/me")).await?;
                self.credentials.set_user(me.user).await;
            }
            return Ok(SessionStatus::Authenticated);
        }

        // No artifact means no session to resume; don't call the backend
        // and don't emit a forced-logout signal for a cold start.
        if self.credentials.renewal_artifact().await?.is_none() {
            return Ok(SessionStatus::Unauthenticated);
        }

        match self.refresh.refresh().await {
            Ok(_) => Ok(SessionStatus::Authenticated),
            Err(_) => Ok(SessionStatus::Unauthenticated),
        }
    }

    /// Authenticate with email and password.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let request = ApiRequest::post("/auth/login")
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })?
            .skip_auth();

        let auth: AuthResponse = self.gateway.send_json(&request).await?;
        self.credentials
            .install(
                auth.access_token,
                auth.user.clone(),
                auth.refresh_token.as_deref(),
            )
            .await?;

        *self.status.write().await = SessionStatus::Authenticated;
        info!(user_id = %auth.user.id, "Login successful");
        Ok(auth.user)
    }

    /// End the session: tell the backend, then clear the credential and
    /// the persisted artifact together.
    ///
    /// A failing logout endpoint does not keep the local session alive.
    pub async fn logout(&self) -> AppResult<()> {
        if let Err(e) = self.gateway.send(&ApiRequest::post("/auth/logout")).await {
            warn!(error = %e, "Logout endpoint failed, clearing local session anyway");
        }

        self.credentials.clear().await?;
        *self.status.write().await = SessionStatus::Unauthenticated;
        info!("Logout completed");
        Ok(())
    }

    /// Request a password-reset email. Public endpoint.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let request = ApiRequest::post("/auth/forgot-password")
            .json(&serde_json::json!({ "email": email }))?
            .skip_auth();
        self.gateway.send(&request).await.map(|_| ())
    }

    /// Complete a password reset with the emailed token. Public endpoint.
    pub async fn reset_password(&self, token: &str, password: &str) -> AppResult<()> {
        let request = ApiRequest::post("/auth/reset-password")
            .query(vec![("token".to_string(), token.to_string())])
            .json(&serde_json::json!({ "password": password }))?
            .skip_auth();
        self.gateway.send(&request).await.map(|_| ())
    }

    /// Return the machine to `Uninitialized` without touching credentials.
    pub async fn reset(&self) {
        *self.status.write().await = SessionStatus::Uninitialized;
    }

    /// Convenience guard for callers that require an authenticated session.
    pub async fn require_authenticated(&self) -> AppResult<User> {
        self.current_user()
            .await
            .ok_or_else(|| AppError::session("Not authenticated"))
    }
}
