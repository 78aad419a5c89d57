//! User profile entity.

use serde::{Deserialize, Serialize};

/// The authenticated user's profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email address (the login identifier).
    pub email: String,
    /// Role within the firm, e.g. `"admin"` or `"attorney"`.
    #[serde(default)]
    pub role: Option<String>,
}
