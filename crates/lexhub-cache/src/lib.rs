//! # lexhub-cache
//!
//! The client-side entity cache: read-through caching with request
//! de-duplication, declarative tag invalidation, and optimistic mutation
//! via immutable patch descriptors with deterministic rollback.
//!
//! Cached payloads are stored as [`serde_json::Value`]; the typed endpoint
//! layer (de)serializes around them.

pub mod entry;
pub mod key;
pub mod patch;
pub mod store;

pub use key::QueryKey;
pub use patch::{MutationId, ValuePatch};
pub use store::QueryCache;
