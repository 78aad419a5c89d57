//! Task entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matter::PageInfo;

/// A task, optionally tied to a matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Task title.
    pub title: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status, e.g. `"pending"`, `"completed"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Priority label.
    #[serde(default)]
    pub priority: Option<String>,
    /// The matter this task belongs to, if any.
    #[serde(default)]
    pub matter_id: Option<String>,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

/// Paginated task list payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    /// The tasks on this page.
    pub data: Vec<Task>,
    /// Pagination envelope.
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}
