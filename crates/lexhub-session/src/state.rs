//! Session lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the client session.
///
/// Created `Uninitialized` at process start; `Pending` while attempting
/// silent renewal or a profile fetch; `Authenticated` once both a valid
/// credential and a user profile are present; `Unauthenticated` on renewal
/// failure or explicit logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No initialization attempt has been made yet.
    Uninitialized,
    /// Silent renewal or profile fetch is in progress.
    Pending,
    /// A valid credential and user profile are both present.
    Authenticated,
    /// No session; the user must log in.
    Unauthenticated,
}

impl SessionStatus {
    /// Whether the session is usable for authenticated requests.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Pending => "pending",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        };
        write!(f, "{s}")
    }
}
