//! # lexhub-gateway
//!
//! The token-refresh-aware request gateway. Every authenticated API call
//! goes through [`RequestGateway::send`], which attaches the current
//! bearer credential and transparently recovers from credential expiry:
//! on a 401 it joins the process-wide single-flight token renewal and
//! retries the original request exactly once with the fresh credential.
//!
//! Renewal failure is fatal to the session: the in-memory credential and
//! the persisted renewal artifact are cleared together and a forced-logout
//! signal is broadcast for the embedding application to observe.

pub mod artifact;
pub mod credentials;
pub mod gateway;
pub mod refresh;
pub mod request;
pub mod signal;
pub mod transport;

pub use artifact::{ArtifactStore, FileArtifactStore, MemoryArtifactStore};
pub use credentials::{Credential, CredentialStore};
pub use gateway::RequestGateway;
pub use refresh::RefreshCoordinator;
pub use request::{ApiRequest, HttpMethod};
pub use signal::{SessionSignal, SessionSignals};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
