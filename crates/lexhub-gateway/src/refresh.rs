//! Single-flight token renewal.

use std::sync::Arc;

use tracing::{info, warn};

use lexhub_core::singleflight::SingleFlight;
use lexhub_core::{AppError, AppResult};
use lexhub_entity::AuthResponse;

use crate::credentials::{Credential, CredentialStore};
use crate::request::ApiRequest;
use crate::signal::SessionSignals;
use crate::transport::HttpTransport;

/// Coordinates token renewal for the whole process.
///
/// Exactly one renewal call is in flight at any time; every caller that
/// hits credential expiry during that window joins the in-flight renewal
/// and observes its outcome. The notification channel shares this
/// coordinator, so a transport auth error and a burst of 401s never race
/// two renewals.
pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialStore>,
    signals: SessionSignals,
    flight: SingleFlight<Credential>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator").finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialStore>,
        signals: SessionSignals,
    ) -> Self {
        Self {
            transport,
            credentials,
            signals,
            flight: SingleFlight::new(),
        }
    }

    /// Renew the credential, or join the renewal already in flight.
    ///
    /// On success the new credential, profile, and renewal artifact are
    /// installed atomically and returned. On failure the session state and
    /// artifact are cleared, a forced logout is broadcast, and the error
    /// propagates to every joined caller. Renewal is never retried.
    pub async fn refresh(&self) -> AppResult<Credential> {
        let transport = self.transport.clone();
        let credentials = self.credentials.clone();
        let signals = self.signals.clone();

        self.flight
            .run(move || perform_renewal(transport, credentials, signals))
            .await
    }

    /// Whether a renewal is currently in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.flight.is_in_flight().await
    }
}

async fn perform_renewal(
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialStore>,
    signals: SessionSignals,
) -> AppResult<Credential> {
    let outcome = renew_once(&*transport, &credentials).await;

    match outcome {
        Ok(credential) => {
            info!("Credential renewed");
            Ok(credential)
        }
        Err(e) => {
            warn!(error = %e, "Credential renewal failed, clearing session");
            // Teardown must happen even if the artifact was already gone.
            let _ = credentials.clear().await;
            signals.forced_logout();
            Err(e)
        }
    }
}

async fn renew_once(
    transport: &dyn HttpTransport,
    credentials: &CredentialStore,
) -> AppResult<Credential> {
    let artifact = credentials
        .renewal_artifact()
        .await?
        .ok_or_else(|| AppError::authentication("No renewal artifact available"))?;

    let request = ApiRequest::post("/auth/refresh-token")
        .json(&serde_json::json!({ "refreshToken": artifact }))?
        .skip_auth();

    let response = transport.execute(&request, None).await?;
    if !response.is_success() {
        return Err(AppError::authentication(response.error_message()));
    }

    let auth: AuthResponse = serde_json::from_value(response.body)?;
    credentials
        .install(auth.access_token, auth.user, auth.refresh_token.as_deref())
        .await
}
