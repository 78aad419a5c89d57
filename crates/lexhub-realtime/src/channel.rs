//! Notification channel state machine.
//!
//! Owns the connection lifecycle: idempotent connect, bounded reconnect on
//! transport loss, and token renewal when the server signals an expired or
//! invalid credential mid-stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lexhub_core::config::RealtimeConfig;
use lexhub_gateway::RefreshCoordinator;

use crate::events::ChannelEvent;
use crate::subscribers::{EventCallback, SubscriberRegistry, Subscription};
use crate::transport::{ChannelTransport, is_auth_reason};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No connection and none being attempted.
    Disconnected,
    /// A connection attempt is underway.
    Connecting,
    /// Connected and receiving events.
    Connected,
    /// Paused for token renewal; reconnects when it completes.
    Refreshing,
}

struct ChannelInner {
    state: ChannelState,
    token: Option<String>,
    /// Token handed to `connect` while a renewal was in progress; consumed
    /// by the reader task once the renewal settles.
    pending_reconnect: Option<String>,
    cancel: Option<CancellationToken>,
}

/// Client endpoint of the real-time notification stream.
///
/// Cloneable via `Arc`; all mutable state lives behind a single mutex so the
/// public surface can be called from any task.
pub struct NotificationChannel {
    transport: Arc<dyn ChannelTransport>,
    refresh: Arc<RefreshCoordinator>,
    subscribers: Arc<SubscriberRegistry>,
    config: RealtimeConfig,
    inner: Arc<Mutex<ChannelInner>>,
}

impl std::fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel").finish_non_exhaustive()
    }
}

impl NotificationChannel {
    /// Creates a disconnected channel.
    pub fn new(
        transport: Arc<dyn ChannelTransport>,
        refresh: Arc<RefreshCoordinator>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            transport,
            refresh,
            subscribers: Arc::new(SubscriberRegistry::new()),
            config,
            inner: Arc::new(Mutex::new(ChannelInner {
                state: ChannelState::Disconnected,
                token: None,
                pending_reconnect: None,
                cancel: None,
            })),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ChannelState {
        self.inner.lock().await.state
    }

    /// Whether the channel is currently connected.
    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.state == ChannelState::Connected
    }

    /// Registers `callback` for events named `event`.
    pub fn on(&self, event: impl Into<String>, callback: EventCallback) -> Subscription {
        self.subscribers.on(event, callback)
    }

    /// Opens the channel with `token`.
    ///
    /// Calling with the token already in use while connected or connecting
    /// is a no-op. Calling during a renewal records the token for a single
    /// reconnect once the renewal settles. A different token while connected
    /// tears the current connection down and reconnects with the new one.
    pub async fn connect(&self, token: impl Into<String>) {
        let token = token.into();
        let mut inner = self.inner.lock().await;

        match inner.state {
            ChannelState::Connected | ChannelState::Connecting => {
                if inner.token.as_deref() == Some(token.as_str()) {
                    debug!("Channel already active with this token, ignoring connect");
                    return;
                }
                // Token changed; restart with the new one.
                if let Some(cancel) = inner.cancel.take() {
                    cancel.cancel();
                }
            }
            ChannelState::Refreshing => {
                debug!("Renewal in progress, deferring connect");
                inner.pending_reconnect = Some(token);
                return;
            }
            ChannelState::Disconnected => {}
        }

        self.start_locked(&mut inner, token);
    }

    /// Closes the channel and drops all subscribers.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(cancel) = inner.cancel.take() {
            cancel.cancel();
        }
        inner.state = ChannelState::Disconnected;
        inner.token = None;
        inner.pending_reconnect = None;
        self.subscribers.clear();
        info!("Notification channel disconnected");
    }

    fn start_locked(&self, inner: &mut ChannelInner, token: String) {
        let cancel = CancellationToken::new();
        inner.state = ChannelState::Connecting;
        inner.token = Some(token.clone());
        inner.pending_reconnect = None;
        inner.cancel = Some(cancel.clone());

        let channel = self.clone_parts();
        tokio::spawn(async move {
            channel.run_loop(token, cancel).await;
        });
    }

    fn clone_parts(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            refresh: self.refresh.clone(),
            subscribers: self.subscribers.clone(),
            config: self.config.clone(),
            inner: self.inner.clone(),
        }
    }

    /// Reader task: connect, pump events, and handle loss or auth failure
    /// until cancelled or the retry budget runs out.
    async fn run_loop(&self, mut token: String, cancel: CancellationToken) {
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return;
            }

            let connection = tokio::select! {
                result = self.transport.connect(&token) => result,
                _ = cancel.cancelled() => return,
            };

            let mut connection = match connection {
                Ok(connection) => connection,
                Err(e) if e.is_auth_expiry() => {
                    match self.renew(&cancel).await {
                        Some(new_token) => {
                            token = new_token;
                            attempts = 0;
                            continue;
                        }
                        None => return,
                    }
                }
                Err(e) => {
                    attempts += 1;
                    warn!(error = %e, attempt = attempts, "Channel connect failed");
                    if !self.retry_delay(attempts, &cancel).await {
                        return;
                    }
                    continue;
                }
            };

            attempts = 0;
            if !self.set_state_if_live(&cancel, ChannelState::Connected).await {
                connection.close().await;
                return;
            }
            info!("Notification channel connected");
            self.subscribers.dispatch(&ChannelEvent::Connect);

            // Pump events until the connection ends.
            let outcome = loop {
                let next = tokio::select! {
                    event = connection.next_event() => event,
                    _ = cancel.cancelled() => {
                        connection.close().await;
                        return;
                    }
                };

                match next {
                    Ok(Some(event)) => self.subscribers.dispatch(&event),
                    Ok(None) => break ReadOutcome::Closed,
                    Err(e) if e.is_auth_expiry() || is_auth_reason(&e.message) => {
                        break ReadOutcome::AuthFailed;
                    }
                    Err(e) => {
                        warn!(error = %e, "Channel read error");
                        break ReadOutcome::Lost;
                    }
                }
            };

            self.subscribers.dispatch(&ChannelEvent::Disconnect);

            match outcome {
                ReadOutcome::AuthFailed => match self.renew(&cancel).await {
                    Some(new_token) => {
                        token = new_token;
                        continue;
                    }
                    None => return,
                },
                // Server-initiated close reconnects immediately; transport
                // loss counts against the retry budget.
                ReadOutcome::Closed => {
                    if !self.set_state_if_live(&cancel, ChannelState::Connecting).await {
                        return;
                    }
                    continue;
                }
                ReadOutcome::Lost => {
                    attempts += 1;
                    if !self.retry_delay(attempts, &cancel).await {
                        return;
                    }
                    continue;
                }
            }
        }
    }

    /// Renews the token via the shared coordinator. Returns the token to
    /// reconnect with, or `None` when renewal failed (the coordinator has
    /// already cleared credentials and signaled logout) or the loop was
    /// cancelled or superseded.
    async fn renew(&self, cancel: &CancellationToken) -> Option<String> {
        if !self.set_state_if_live(cancel, ChannelState::Refreshing).await {
            return None;
        }
        info!("Channel token rejected, renewing");

        let result = tokio::select! {
            result = self.refresh.refresh() => result,
            _ = cancel.cancelled() => return None,
        };

        let mut inner = self.inner.lock().await;
        if inner.cancel.as_ref().map(|c| c.is_cancelled()).unwrap_or(true) || cancel.is_cancelled()
        {
            return None;
        }

        // A connect issued during the renewal supplies the token to use.
        let pending = inner.pending_reconnect.take();

        match result {
            Ok(credential) => {
                let token = pending.unwrap_or(credential.access_token);
                inner.state = ChannelState::Connecting;
                inner.token = Some(token.clone());
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "Channel token renewal failed");
                inner.state = ChannelState::Disconnected;
                inner.token = None;
                None
            }
        }
    }

    /// Sleeps the fixed reconnect delay. Returns `false` when the budget is
    /// exhausted or the loop was cancelled, after settling to Disconnected.
    async fn retry_delay(&self, attempts: u32, cancel: &CancellationToken) -> bool {
        if attempts >= self.config.max_reconnect_attempts {
            warn!(attempts, "Channel reconnect budget exhausted");
            let mut inner = self.inner.lock().await;
            if !cancel.is_cancelled() {
                inner.state = ChannelState::Disconnected;
                inner.token = None;
            }
            return false;
        }

        let delay = Duration::from_millis(self.config.reconnect_delay_ms);
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = cancel.cancelled() => false,
        }
    }

    /// Transitions to `state` unless this loop has been cancelled or
    /// replaced by a newer one.
    async fn set_state_if_live(&self, cancel: &CancellationToken, state: ChannelState) -> bool {
        let mut inner = self.inner.lock().await;
        if cancel.is_cancelled() {
            return false;
        }
        inner.state = state;
        true
    }
}

enum ReadOutcome {
    /// Server closed the connection without an auth reason.
    Closed,
    /// Token rejected mid-stream.
    AuthFailed,
    /// Transport error.
    Lost,
}
