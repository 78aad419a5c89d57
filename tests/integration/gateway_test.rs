//! Integration tests for the request gateway's renewal behavior.

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::json;

use lexhub_core::error::ErrorKind;
use lexhub_gateway::{ApiRequest, SessionSignal};

use crate::helpers::{
    MockTransport, auth_body, authenticated_stack, response, stack_with, unauthorized,
};

/// A transport that rejects the old token, serves one renewal, and then
/// accepts the new token.
fn renewing_transport() -> std::sync::Arc<MockTransport> {
    MockTransport::new(|request, bearer| {
        if request.path == "/auth/refresh-token" {
            return response(200, auth_body("new-token"));
        }
        match bearer {
            Some("new-token") => response(200, json!({"data": {"path": request.path}})),
            _ => unauthorized(),
        }
    })
}

#[tokio::test]
async fn test_401_renews_and_retries_once() {
    let stack = authenticated_stack(renewing_transport()).await;

    let body = stack
        .gateway
        .send(&ApiRequest::get("/matters"))
        .await
        .unwrap();
    assert_eq!(body.status, 200);

    // Original with the stale token, one renewal, retry with the fresh one.
    assert_eq!(stack.transport.calls_to("/matters"), 2);
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 1);

    let requests = stack.transport.requests();
    assert_eq!(requests[0].bearer.as_deref(), Some("old-token"));
    assert_eq!(requests[2].bearer.as_deref(), Some("new-token"));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_renewal() {
    // Hold the renewal open so every panel's first attempt lands inside
    // the renewal window.
    let transport = MockTransport::with_delay(
        |request, bearer| {
            if request.path == "/auth/refresh-token" {
                return response(200, auth_body("new-token"));
            }
            match bearer {
                Some("new-token") => response(200, json!({"data": {"path": request.path}})),
                _ => unauthorized(),
            }
        },
        "/auth/refresh-token",
        std::time::Duration::from_millis(50),
    );
    let stack = authenticated_stack(transport).await;

    // Three panels fire at once with the same expired token.
    let matters = ApiRequest::get("/matters");
    let tasks = ApiRequest::get("/tasks");
    let notifications = ApiRequest::get("/notifications");
    let (a, b, c) = tokio::join!(
        stack.gateway.send(&matters),
        stack.gateway.send(&tasks),
        stack.gateway.send(&notifications),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());

    // One renewal total; each request retried exactly once.
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 1);
    assert_eq!(stack.transport.calls_to("/matters"), 2);
    assert_eq!(stack.transport.calls_to("/tasks"), 2);
    assert_eq!(stack.transport.calls_to("/notifications"), 2);
}

#[tokio::test]
async fn test_skip_auth_never_triggers_renewal() {
    let transport = MockTransport::new(|_, _| unauthorized());
    let stack = authenticated_stack(transport).await;

    let err = stack
        .gateway
        .send(&ApiRequest::post("/auth/login").skip_auth())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 0);

    // No bearer attached to public endpoints.
    assert_eq!(stack.transport.requests()[0].bearer, None);
}

#[tokio::test]
async fn test_403_propagates_without_renewal() {
    let transport = MockTransport::new(|_, _| response(403, json!({"message": "forbidden"})));
    let stack = authenticated_stack(transport).await;

    let err = stack
        .gateway
        .send(&ApiRequest::delete("/matters/m1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 0);
    assert_eq!(stack.transport.calls_to("/matters/m1"), 1);
}

#[tokio::test]
async fn test_renewal_failure_clears_session_and_signals_logout() {
    let transport = MockTransport::new(|_, _| unauthorized());
    let stack = authenticated_stack(transport).await;
    let mut logout = stack.signals.subscribe();

    let err = stack
        .gateway
        .send(&ApiRequest::get("/matters"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);

    assert!(!stack.credentials.has_credential().await);
    assert_eq!(stack.credentials.renewal_artifact().await.unwrap(), None);
    assert_eq!(logout.recv().await.unwrap(), SessionSignal::ForcedLogout);
}

#[tokio::test]
async fn test_renewal_failure_fails_every_joined_caller() {
    let refresh_calls = std::sync::Arc::new(AtomicU32::new(0));
    let counter = refresh_calls.clone();
    let transport = MockTransport::new(move |request, _| {
        if request.path == "/auth/refresh-token" {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        unauthorized()
    });
    let stack = authenticated_stack(transport).await;

    let matters = ApiRequest::get("/matters");
    let tasks = ApiRequest::get("/tasks");
    let (a, b) = tokio::join!(stack.gateway.send(&matters), stack.gateway.send(&tasks));
    assert!(a.is_err() && b.is_err());
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validation_error_carries_server_message() {
    let transport =
        MockTransport::new(|_, _| response(422, json!({"message": "title is required"})));
    let stack = stack_with(transport, None);

    let err = stack
        .gateway
        .send(&ApiRequest::post("/matters").skip_auth())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "title is required");
}
