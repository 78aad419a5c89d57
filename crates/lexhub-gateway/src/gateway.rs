//! The request gateway: bearer attachment and refresh-and-retry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use lexhub_core::error::ErrorKind;
use lexhub_core::{AppError, AppResult};

use crate::credentials::CredentialStore;
use crate::refresh::RefreshCoordinator;
use crate::request::ApiRequest;
use crate::transport::{HttpResponse, HttpTransport};

/// Wraps every outgoing API call.
///
/// Guarantees: every authenticated call either succeeds with a valid
/// credential or fails cleanly; a 401 triggers at most one renewal joined
/// process-wide, and the failed request is retried exactly once with the
/// fresh credential. 403 means authenticated-but-forbidden and never
/// triggers renewal. Network failures and other error statuses propagate
/// unmodified.
pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialStore>,
    refresh: Arc<RefreshCoordinator>,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway").finish_non_exhaustive()
    }
}

impl RequestGateway {
    /// Create a gateway.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialStore>,
        refresh: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            transport,
            credentials,
            refresh,
        }
    }

    /// The shared renewal coordinator (also used by the notification
    /// channel).
    pub fn refresh_coordinator(&self) -> Arc<RefreshCoordinator> {
        self.refresh.clone()
    }

    /// Send a request, transparently recovering from credential expiry
    /// once. Returns the successful response body-bearing response; error
    /// statuses are mapped to [`AppError`] carrying the server message.
    pub async fn send(&self, request: &ApiRequest) -> AppResult<HttpResponse> {
        if request.skip_auth {
            let response = self.transport.execute(request, None).await?;
            return into_result(response);
        }

        let token = self.credentials.access_token().await;
        let response = self.transport.execute(request, token.as_deref()).await?;

        if response.status != 401 {
            return into_result(response);
        }

        debug!(path = %request.path, "Authorization failure, joining renewal");
        let credential = self.refresh.refresh().await?;

        let retried = self
            .transport
            .execute(request, Some(&credential.access_token))
            .await?;
        into_result(retried)
    }

    /// Send a request and deserialize the success body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> AppResult<T> {
        let response = self.send(request).await?;
        Ok(serde_json::from_value(response.body)?)
    }
}

fn into_result(response: HttpResponse) -> AppResult<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let kind = match response.status {
        400 | 422 => ErrorKind::Validation,
        401 => ErrorKind::Authentication,
        403 => ErrorKind::Authorization,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        429 => ErrorKind::RateLimit,
        503 => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::Http,
    };

    Err(AppError::new(kind, response.error_message()))
}
