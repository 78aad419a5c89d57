//! SDK composition root.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use lexhub_api::{MattersApi, NotificationsApi, TasksApi};
use lexhub_cache::QueryCache;
use lexhub_core::AppResult;
use lexhub_core::config::AppConfig;
use lexhub_gateway::{
    CredentialStore, FileArtifactStore, RefreshCoordinator, ReqwestTransport, RequestGateway,
    SessionSignal, SessionSignals,
};
use lexhub_realtime::{NotificationChannel, WsTransport};
use lexhub_session::SessionManager;

/// The assembled LexHub client.
///
/// Construction wires one shared pipeline: transport, credential store,
/// renewal coordinator, gateway, session manager, cache, API surfaces,
/// and the notification channel. All handles are `Arc`-shared, so the
/// client itself is cheap to clone via [`Client::clone`].
#[derive(Clone)]
pub struct Client {
    gateway: Arc<RequestGateway>,
    session: Arc<SessionManager>,
    cache: Arc<QueryCache>,
    notifications: Arc<NotificationsApi>,
    matters: Arc<MattersApi>,
    tasks: Arc<TasksApi>,
    channel: Arc<NotificationChannel>,
    signals: SessionSignals,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Builds a client from configuration.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.api)?);
        let artifact = Arc::new(FileArtifactStore::new(&config.session));
        let credentials = Arc::new(CredentialStore::new(artifact));
        let signals = SessionSignals::new();
        let refresh = Arc::new(RefreshCoordinator::new(
            transport.clone(),
            credentials.clone(),
            signals.clone(),
        ));
        let gateway = Arc::new(RequestGateway::new(
            transport,
            credentials.clone(),
            refresh.clone(),
        ));
        let session = Arc::new(SessionManager::new(
            gateway.clone(),
            credentials,
            refresh.clone(),
        ));
        let cache = Arc::new(QueryCache::new(&config.cache));

        let notifications = Arc::new(NotificationsApi::new(gateway.clone(), cache.clone()));
        let matters = Arc::new(MattersApi::new(gateway.clone(), cache.clone()));
        let tasks = Arc::new(TasksApi::new(gateway.clone(), cache.clone()));

        let ws_transport = Arc::new(WsTransport::new(
            config.api.ws_url.clone(),
            Duration::from_secs(config.realtime.connect_timeout_seconds),
        ));
        let channel = Arc::new(NotificationChannel::new(
            ws_transport,
            refresh,
            config.realtime.clone(),
        ));

        info!(base_url = %config.api.base_url, "LexHub client assembled");
        Ok(Self {
            gateway,
            session,
            cache,
            notifications,
            matters,
            tasks,
            channel,
            signals,
        })
    }

    /// The request gateway, for endpoints without a typed surface.
    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    /// Session lifecycle: initialize, login, logout.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The entity cache shared by every API surface.
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Notification endpoints.
    pub fn notifications(&self) -> &Arc<NotificationsApi> {
        &self.notifications
    }

    /// Matter endpoints.
    pub fn matters(&self) -> &Arc<MattersApi> {
        &self.matters
    }

    /// Task endpoints.
    pub fn tasks(&self) -> &Arc<TasksApi> {
        &self.tasks
    }

    /// The real-time notification channel.
    pub fn channel(&self) -> &Arc<NotificationChannel> {
        &self.channel
    }

    /// Subscribe to session signals. The embedding application listens
    /// here for [`SessionSignal::ForcedLogout`] and routes the user to its
    /// sign-in surface.
    pub fn session_signals(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }
}
