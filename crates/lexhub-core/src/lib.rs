//! # lexhub-core
//!
//! Core crate for the LexHub client SDK. Contains configuration schemas,
//! shared request/response types, the unified error system, and the
//! single-flight async primitive used by the request gateway and the
//! notification channel.
//!
//! This crate has **no** internal dependencies on other LexHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod singleflight;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
