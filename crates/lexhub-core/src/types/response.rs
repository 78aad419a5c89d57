//! Response body types shared across endpoints.

use serde::{Deserialize, Serialize};

/// Standard API error response body.
///
/// When a non-success status carries this shape, the gateway surfaces the
/// server-supplied `message`; otherwise a generic fallback is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    #[serde(default)]
    pub error: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Generic `{ "data": ... }` wrapper the backend puts around most payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    /// The wrapped payload.
    pub data: T,
}
