//! Integration tests for the notification channel and its shared renewal.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;

use lexhub_api::NotificationsApi;
use lexhub_core::AppError;
use lexhub_core::AppResult;
use lexhub_core::config::RealtimeConfig;
use lexhub_gateway::ApiRequest;
use lexhub_realtime::{
    ChannelConnection, ChannelEvent, ChannelState, ChannelTransport, NotificationChannel,
};

use crate::helpers::{MockTransport, auth_body, authenticated_stack, response, unauthorized};

struct ScriptedConnection {
    events: VecDeque<AppResult<Option<ChannelEvent>>>,
}

#[async_trait]
impl ChannelConnection for ScriptedConnection {
    async fn next_event(&mut self) -> AppResult<Option<ChannelEvent>> {
        match self.events.pop_front() {
            Some(next) => next,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {}
}

struct ScriptedWs {
    scripts: AsyncMutex<VecDeque<VecDeque<AppResult<Option<ChannelEvent>>>>>,
    seen_tokens: AsyncMutex<Vec<String>>,
}

impl ScriptedWs {
    fn new(scripts: Vec<VecDeque<AppResult<Option<ChannelEvent>>>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: AsyncMutex::new(scripts.into()),
            seen_tokens: AsyncMutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChannelTransport for ScriptedWs {
    async fn connect(&self, token: &str) -> AppResult<Box<dyn ChannelConnection>> {
        self.seen_tokens.lock().await.push(token.to_string());
        match self.scripts.lock().await.pop_front() {
            Some(events) => Ok(Box::new(ScriptedConnection { events })),
            None => std::future::pending().await,
        }
    }
}

fn fast_config() -> RealtimeConfig {
    RealtimeConfig {
        max_reconnect_attempts: 3,
        reconnect_delay_ms: 5,
        connect_timeout_seconds: 1,
    }
}

async fn wait_for_state(channel: &NotificationChannel, want: ChannelState) {
    for _ in 0..200 {
        if channel.state().await == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("channel stuck at {:?}", channel.state().await);
}

#[tokio::test]
async fn test_channel_auth_error_and_http_401_share_one_renewal() {
    let refresh_calls = Arc::new(AtomicU32::new(0));
    let counter = refresh_calls.clone();
    // Renewal is held long enough for both sides to join one flight.
    let transport = MockTransport::with_delay(
        move |request, bearer| {
            if request.path == "/auth/refresh-token" {
                counter.fetch_add(1, Ordering::SeqCst);
                return response(200, auth_body("new-token"));
            }
            match bearer {
                Some("new-token") => response(200, json!({"data": {}})),
                _ => unauthorized(),
            }
        },
        "/auth/refresh-token",
        Duration::from_millis(50),
    );
    let stack = authenticated_stack(transport).await;

    // First socket dies immediately with an auth error; the reconnect
    // stays open.
    let ws = ScriptedWs::new(vec![
        VecDeque::from([Err(AppError::authentication("jwt expired"))]),
        VecDeque::new(),
    ]);
    let channel = NotificationChannel::new(ws.clone(), stack.refresh.clone(), fast_config());

    // The channel hits the auth error while an HTTP request 401s; both
    // must share the single in-flight renewal.
    channel.connect("old-token").await;
    stack
        .gateway
        .send(&ApiRequest::get("/matters"))
        .await
        .unwrap();
    wait_for_state(&channel, ChannelState::Connected).await;

    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    let tokens = ws.seen_tokens.lock().await.clone();
    assert_eq!(tokens, vec!["old-token".to_string(), "new-token".to_string()]);

    channel.disconnect().await;
}

#[tokio::test]
async fn test_push_events_flow_into_cache() {
    let transport = MockTransport::new(|_, _| response(200, json!({"data": {}})));
    let stack = authenticated_stack(transport).await;
    let api = Arc::new(NotificationsApi::new(
        stack.gateway.clone(),
        stack.cache.clone(),
    ));

    let notification: lexhub_entity::Notification = serde_json::from_value(json!({
        "_id": "n9",
        "type": "reminder",
        "priority": "urgent",
        "title": "Statute of limitations",
        "message": "Runs in 7 days",
        "isRead": false,
        "createdAt": "2026-08-30T08:00:00Z",
    }))
    .unwrap();

    let ws = ScriptedWs::new(vec![VecDeque::from([Ok(Some(
        ChannelEvent::NewNotification {
            notification: notification.clone(),
            unread_count: Some(3),
        },
    ))])]);
    let channel = NotificationChannel::new(ws, stack.refresh.clone(), fast_config());

    let subscriptions = lexhub::sync::attach(
        &channel,
        api.clone(),
        lexhub_entity::NotificationPreferences::default(),
    );
    assert_eq!(subscriptions.len(), 5);

    // Seed the list entry the push event patches.
    let key = lexhub_cache::QueryKey::new(
        "notifications",
        &lexhub_api::NotificationListQuery::default().to_pairs(),
    );
    stack.cache.upsert(
        &key,
        &[lexhub_api::tags::NOTIFICATIONS],
        json!({"notifications": [], "total": 0, "unreadCount": 0,
               "currentPage": 1, "totalPages": 1}),
    );

    channel.connect("token").await;
    wait_for_state(&channel, ChannelState::Connected).await;

    for _ in 0..200 {
        let page = stack.cache.get(&key).unwrap();
        if page["notifications"].as_array().unwrap().len() == 1 {
            assert_eq!(page["notifications"][0]["_id"], json!("n9"));
            assert_eq!(page["unreadCount"], json!(3));
            channel.disconnect().await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("push event never reached the cache");
}

#[tokio::test]
async fn test_suppressed_kind_never_reaches_cache() {
    let transport = MockTransport::new(|_, _| response(200, json!({"data": {}})));
    let stack = authenticated_stack(transport).await;
    let api = Arc::new(NotificationsApi::new(
        stack.gateway.clone(),
        stack.cache.clone(),
    ));

    let notification: lexhub_entity::Notification = serde_json::from_value(json!({
        "_id": "n5",
        "type": "calendar",
        "priority": "low",
        "title": "Sync",
        "message": "Weekly sync",
        "isRead": false,
        "createdAt": "2026-08-30T08:00:00Z",
    }))
    .unwrap();

    let ws = ScriptedWs::new(vec![VecDeque::from([Ok(Some(
        ChannelEvent::NewNotification {
            notification,
            unread_count: Some(1),
        },
    ))])]);
    let channel = NotificationChannel::new(ws, stack.refresh.clone(), fast_config());

    let mut preferences = lexhub_entity::NotificationPreferences::default();
    preferences
        .kinds
        .insert(lexhub_entity::NotificationKind::Calendar, false);
    let _subscriptions = lexhub::sync::attach(&channel, api, preferences);

    let key = lexhub_cache::QueryKey::new(
        "notifications",
        &lexhub_api::NotificationListQuery::default().to_pairs(),
    );
    stack.cache.upsert(
        &key,
        &[lexhub_api::tags::NOTIFICATIONS],
        json!({"notifications": [], "total": 0, "unreadCount": 0,
               "currentPage": 1, "totalPages": 1}),
    );

    channel.connect("token").await;
    wait_for_state(&channel, ChannelState::Connected).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let page = stack.cache.get(&key).unwrap();
    assert!(page["notifications"].as_array().unwrap().is_empty());
    assert_eq!(page["unreadCount"], json!(0));

    channel.disconnect().await;
}
