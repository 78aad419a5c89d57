//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use lexhub_cache::QueryCache;
use lexhub_core::AppResult;
use lexhub_core::config::CacheConfig;
use lexhub_gateway::{
    ApiRequest, CredentialStore, HttpResponse, HttpTransport, MemoryArtifactStore,
    RefreshCoordinator, RequestGateway, SessionSignals,
};
use lexhub_session::SessionManager;

/// One recorded HTTP exchange.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub bearer: Option<String>,
}

/// Programmable HTTP transport.
///
/// The handler decides the response from the request and attached bearer;
/// every exchange is recorded for assertions.
pub struct MockTransport {
    handler: Box<dyn Fn(&ApiRequest, Option<&str>) -> AppResult<HttpResponse> + Send + Sync>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay_on: Option<(String, std::time::Duration)>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest, Option<&str>) -> AppResult<HttpResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delay_on: None,
        })
    }

    /// Like [`MockTransport::new`], but responses for `path` are held for
    /// `delay` first, so concurrent callers can pile onto one in-flight
    /// request.
    pub fn with_delay(
        handler: impl Fn(&ApiRequest, Option<&str>) -> AppResult<HttpResponse> + Send + Sync + 'static,
        path: &str,
        delay: std::time::Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
            delay_on: Some((path.to_string(), delay)),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> AppResult<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method.as_str().to_string(),
            path: request.path.clone(),
            bearer: bearer.map(str::to_string),
        });
        if let Some((path, delay)) = &self.delay_on {
            if request.path == *path {
                tokio::time::sleep(*delay).await;
            }
        }
        (self.handler)(request, bearer)
    }
}

/// The wired-up SDK stack under test.
pub struct TestStack {
    pub transport: Arc<MockTransport>,
    pub credentials: Arc<CredentialStore>,
    pub refresh: Arc<RefreshCoordinator>,
    pub gateway: Arc<RequestGateway>,
    pub session: Arc<SessionManager>,
    pub cache: Arc<QueryCache>,
    pub signals: SessionSignals,
}

/// Wire up the full stack over `transport`, with a persisted renewal
/// artifact when `artifact` is given.
pub fn stack_with(transport: Arc<MockTransport>, artifact: Option<&str>) -> TestStack {
    let store = match artifact {
        Some(value) => MemoryArtifactStore::with_value(value),
        None => MemoryArtifactStore::new(),
    };
    let credentials = Arc::new(CredentialStore::new(Arc::new(store)));
    let signals = SessionSignals::new();
    let refresh = Arc::new(RefreshCoordinator::new(
        transport.clone(),
        credentials.clone(),
        signals.clone(),
    ));
    let gateway = Arc::new(RequestGateway::new(
        transport.clone(),
        credentials.clone(),
        refresh.clone(),
    ));
    let session = Arc::new(SessionManager::new(
        gateway.clone(),
        credentials.clone(),
        refresh.clone(),
    ));
    let cache = Arc::new(QueryCache::new(&CacheConfig::default()));

    TestStack {
        transport,
        credentials,
        refresh,
        gateway,
        session,
        cache,
        signals,
    }
}

/// A stack with an installed credential and persisted artifact, as after
/// a successful login.
pub async fn authenticated_stack(transport: Arc<MockTransport>) -> TestStack {
    let stack = stack_with(transport, Some("artifact-1"));
    stack
        .credentials
        .install("old-token".to_string(), sample_user(), Some("artifact-1"))
        .await
        .unwrap();
    stack
}

pub fn sample_user() -> lexhub_entity::User {
    serde_json::from_value(json!({
        "_id": "u1",
        "email": "jordan@firm.example",
        "firstName": "Jordan",
        "lastName": "Reyes",
        "role": "attorney",
    }))
    .unwrap()
}

/// Body of a successful auth/refresh response.
pub fn auth_body(token: &str) -> Value {
    json!({
        "accessToken": token,
        "refreshToken": "artifact-2",
        "user": {
            "_id": "u1",
            "email": "jordan@firm.example",
            "firstName": "Jordan",
            "lastName": "Reyes",
            "role": "attorney",
        },
    })
}

pub fn response(status: u16, body: Value) -> AppResult<HttpResponse> {
    Ok(HttpResponse { status, body })
}

pub fn unauthorized() -> AppResult<HttpResponse> {
    response(401, json!({"message": "jwt expired"}))
}
