//! Integration tests for session lifecycle flows.

use serde_json::json;

use lexhub_session::SessionStatus;

use crate::helpers::{MockTransport, auth_body, response, stack_with, unauthorized};

#[tokio::test]
async fn test_cold_start_without_artifact_is_offline() {
    let transport = MockTransport::new(|_, _| unauthorized());
    let stack = stack_with(transport, None);

    let status = stack.session.initialize().await.unwrap();
    assert_eq!(status, SessionStatus::Unauthenticated);

    // No artifact means no renewal attempt and no network traffic at all.
    assert!(stack.transport.requests().is_empty());
}

#[tokio::test]
async fn test_cold_start_with_artifact_resumes_silently() {
    let transport = MockTransport::new(|request, _| {
        if request.path == "/auth/refresh-token" {
            response(200, auth_body("resumed-token"))
        } else {
            response(200, json!({"data": {}}))
        }
    });
    let stack = stack_with(transport, Some("artifact-1"));

    let status = stack.session.initialize().await.unwrap();
    assert_eq!(status, SessionStatus::Authenticated);
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 1);

    let user = stack.session.current_user().await.unwrap();
    assert_eq!(user.email, "jordan@firm.example");
    assert_eq!(
        stack.credentials.access_token().await.as_deref(),
        Some("resumed-token")
    );
}

#[tokio::test]
async fn test_cold_start_with_stale_artifact_settles_unauthenticated() {
    let transport = MockTransport::new(|_, _| unauthorized());
    let stack = stack_with(transport, Some("stale-artifact"));

    let status = stack.session.initialize().await.unwrap();
    assert_eq!(status, SessionStatus::Unauthenticated);
    assert!(!stack.credentials.has_credential().await);
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let transport = MockTransport::new(|request, _| {
        if request.path == "/auth/refresh-token" {
            response(200, auth_body("resumed-token"))
        } else {
            response(200, json!({"data": {}}))
        }
    });
    let stack = stack_with(transport, Some("artifact-1"));

    let (a, b) = tokio::join!(stack.session.initialize(), stack.session.initialize());
    assert_eq!(a.unwrap(), SessionStatus::Authenticated);
    assert_eq!(b.unwrap(), SessionStatus::Authenticated);
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 1);

    let again = stack.session.initialize().await.unwrap();
    assert_eq!(again, SessionStatus::Authenticated);
    assert_eq!(stack.transport.calls_to("/auth/refresh-token"), 1);
}

#[tokio::test]
async fn test_login_installs_credential_and_artifact() {
    let transport = MockTransport::new(|request, _| {
        assert_eq!(request.path, "/auth/login");
        assert!(request.skip_auth);
        response(200, auth_body("fresh-token"))
    });
    let stack = stack_with(transport, None);

    let user = stack
        .session
        .login("jordan@firm.example", "hunter2")
        .await
        .unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(stack.session.status().await, SessionStatus::Authenticated);
    assert_eq!(
        stack.credentials.access_token().await.as_deref(),
        Some("fresh-token")
    );
    assert_eq!(
        stack.credentials.renewal_artifact().await.unwrap().as_deref(),
        Some("artifact-2")
    );
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let transport =
        MockTransport::new(|_, _| response(401, json!({"message": "Invalid credentials"})));
    let stack = stack_with(transport, None);

    let err = stack
        .session
        .login("jordan@firm.example", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.message, "Invalid credentials");
    assert_eq!(stack.session.status().await, SessionStatus::Uninitialized);
    assert!(!stack.credentials.has_credential().await);
}

#[tokio::test]
async fn test_logout_clears_even_when_endpoint_fails() {
    let transport = MockTransport::new(|request, _| {
        if request.path == "/auth/logout" {
            response(503, json!({"message": "maintenance"}))
        } else {
            response(200, json!({}))
        }
    });
    let stack = stack_with(transport, Some("artifact-1"));
    stack
        .credentials
        .install(
            "token".to_string(),
            crate::helpers::sample_user(),
            Some("artifact-1"),
        )
        .await
        .unwrap();

    stack.session.logout().await.unwrap();
    assert_eq!(stack.session.status().await, SessionStatus::Unauthenticated);
    assert!(!stack.credentials.has_credential().await);
    assert_eq!(stack.credentials.renewal_artifact().await.unwrap(), None);
}

#[tokio::test]
async fn test_password_reset_flows_are_public() {
    let transport = MockTransport::new(|request, bearer| {
        assert!(request.skip_auth);
        assert_eq!(bearer, None);
        response(200, json!({"message": "ok"}))
    });
    let stack = stack_with(transport, None);

    stack
        .session
        .forgot_password("jordan@firm.example")
        .await
        .unwrap();
    stack
        .session
        .reset_password("reset-token", "new-password")
        .await
        .unwrap();

    let paths: Vec<String> = stack
        .transport
        .requests()
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, vec!["/auth/forgot-password", "/auth/reset-password"]);
}
