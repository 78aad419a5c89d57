//! Integration tests for the LexHub client SDK.
//!
//! All tests run against mock transports; no network or backend is
//! required.

mod helpers;

mod cache_test;
mod channel_test;
mod gateway_test;
mod session_test;
