//! Matter (case) entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A legal matter (case file).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matter {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Matter title.
    pub title: String,
    /// Client display name.
    #[serde(default)]
    pub client_name: Option<String>,
    /// Workflow status, e.g. `"open"`, `"closed"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Practice area, e.g. `"litigation"`.
    #[serde(default)]
    pub practice_area: Option<String>,
    /// When the matter was created.
    pub created_at: DateTime<Utc>,
    /// When the matter was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Paginated matter list payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatterPage {
    /// The matters on this page.
    pub data: Vec<Matter>,
    /// Pagination envelope.
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total items across all pages.
    pub total: u64,
    /// Current page (1-based).
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Total number of pages.
    pub total_pages: u64,
}
