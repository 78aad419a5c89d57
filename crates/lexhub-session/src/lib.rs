//! # lexhub-session
//!
//! Explicit session lifecycle for the LexHub client SDK: an idempotent
//! `initialize()` that silently re-establishes a session from the
//! persisted renewal artifact, plus login/logout and the public password
//! flows.

pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::SessionStatus;
