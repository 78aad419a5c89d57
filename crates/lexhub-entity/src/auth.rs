//! Authentication request/response payloads.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password, sent over TLS only.
    pub password: String,
}

/// Response of `POST /auth/login` and `POST /auth/refresh-token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Short-lived bearer credential for API requests.
    pub access_token: String,
    /// Long-lived renewal artifact, persisted for silent re-authentication.
    /// Absent when the backend rotates nothing.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The authenticated user's profile.
    pub user: User,
}
