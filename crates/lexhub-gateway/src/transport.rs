//! HTTP transport abstraction and the reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use lexhub_core::config::ApiConfig;
use lexhub_core::types::ApiErrorResponse;
use lexhub_core::{AppError, AppResult};

use crate::request::{ApiRequest, HttpMethod};

/// A wire-level HTTP response: any response the server produced, including
/// error statuses. Transport failures (no response at all) are returned as
/// [`AppError`] with kind `Network` instead.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `Null` when the body was empty or not JSON.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The server-supplied error message when the body follows the standard
    /// error shape, else a generic fallback naming the status.
    pub fn error_message(&self) -> String {
        serde_json::from_value::<ApiErrorResponse>(self.body.clone())
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("Request failed with status {}", self.status))
    }
}

/// Executes HTTP requests against the backend.
///
/// The trait seam exists so the gateway, session, and cache layers can be
/// exercised in tests against a scripted backend without network access.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute `request`, attaching `bearer` as an Authorization header
    /// when present. Returns the wire response for any status; `Err` only
    /// for transport-level failures.
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>)
    -> AppResult<HttpResponse>;
}

/// Production transport over [`reqwest`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Build the transport from API configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> AppResult<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            AppError::with_source(
                lexhub_core::error::ErrorKind::Network,
                format!("Request to {} {} failed: {e}", request.method, request.path),
                e,
            )
        })?;

        let status = response.status().as_u16();
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);

        debug!(method = %request.method, path = %request.path, status, "HTTP response");

        Ok(HttpResponse { status, body })
    }
}
