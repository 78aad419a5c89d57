//! Session-fatal signals broadcast to the embedding application.

use tokio::sync::broadcast;

/// A session-level signal the embedding application must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// The session is irrecoverably gone (renewal failed or explicit
    /// logout); navigate to the unauthenticated entry point.
    ForcedLogout,
}

/// Broadcast hub for [`SessionSignal`]s.
///
/// The SDK has no router, so "forced navigation" is expressed as a signal
/// the application subscribes to.
#[derive(Debug, Clone)]
pub struct SessionSignals {
    tx: broadcast::Sender<SessionSignal>,
}

impl SessionSignals {
    /// Create a signal hub.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to session signals.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.tx.subscribe()
    }

    /// Broadcast a forced logout. Lagging or absent receivers are not an
    /// error; the session state itself is already cleared by the caller.
    pub fn forced_logout(&self) {
        let _ = self.tx.send(SessionSignal::ForcedLogout);
    }
}

impl Default for SessionSignals {
    fn default() -> Self {
        Self::new()
    }
}
