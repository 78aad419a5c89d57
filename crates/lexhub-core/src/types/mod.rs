//! Shared request/response types.

pub mod list;
pub mod response;

pub use list::{ListQuery, SortOrder};
pub use response::{ApiErrorResponse, DataEnvelope};
