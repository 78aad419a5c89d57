//! Integration tests for the entity cache and optimistic mutations.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{Value, json};

use lexhub_api::{NotificationListQuery, NotificationsApi};
use lexhub_cache::{QueryKey, ValuePatch};

use crate::helpers::{MockTransport, authenticated_stack, response, unauthorized};

fn page_body() -> Value {
    json!({
        "notifications": [
            {"_id": "n1", "type": "task", "priority": "high", "title": "Filing due",
             "message": "Discovery deadline", "isRead": false,
             "createdAt": "2026-08-28T09:00:00Z"},
            {"_id": "n2", "type": "system", "priority": "low", "title": "Maintenance",
             "message": "Scheduled tonight", "isRead": true,
             "createdAt": "2026-08-27T21:00:00Z"},
        ],
        "total": 2,
        "unreadCount": 1,
        "currentPage": 1,
        "totalPages": 1,
    })
}

#[tokio::test]
async fn test_concurrent_fetches_deduplicate() {
    let list_calls = Arc::new(AtomicU32::new(0));
    let counter = list_calls.clone();
    let transport = MockTransport::new(move |request, _| {
        if request.path == "/notifications" {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        response(200, json!({"data": page_body()}))
    });
    let stack = authenticated_stack(transport).await;
    let api = Arc::new(NotificationsApi::new(
        stack.gateway.clone(),
        stack.cache.clone(),
    ));

    let query = NotificationListQuery::default();
    let (a, b, c) = tokio::join!(api.list(&query), api.list(&query), api.list(&query));
    assert_eq!(a.unwrap().unread_count, 1);
    assert_eq!(b.unwrap().total, 2);
    assert_eq!(c.unwrap().notifications.len(), 2);

    // One request served all three callers.
    assert_eq!(list_calls.load(Ordering::SeqCst), 1);

    // A fresh entry serves from cache without another request.
    api.list(&query).await.unwrap();
    assert_eq!(list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalidated_entry_refetches_on_next_read() {
    let transport =
        MockTransport::new(|_, _| response(200, json!({"data": page_body()})));
    let stack = authenticated_stack(transport).await;
    let api = NotificationsApi::new(stack.gateway.clone(), stack.cache.clone());

    let query = NotificationListQuery::default();
    api.list(&query).await.unwrap();
    assert_eq!(stack.transport.calls_to("/notifications"), 1);

    stack.cache.invalidate(&[lexhub_api::tags::NOTIFICATIONS]);
    api.list(&query).await.unwrap();
    assert_eq!(stack.transport.calls_to("/notifications"), 2);
}

#[tokio::test]
async fn test_optimistic_delete_rolls_back_on_server_error() {
    // The delete endpoint fails; everything else succeeds.
    let transport = MockTransport::new(|request, _| {
        if request.path.starts_with("/notifications/") {
            response(500, json!({"message": "database unavailable"}))
        } else {
            response(200, json!({"data": page_body()}))
        }
    });
    let stack = authenticated_stack(transport).await;
    let api = NotificationsApi::new(stack.gateway.clone(), stack.cache.clone());

    let query = NotificationListQuery::default();
    let before = api.list(&query).await.unwrap();
    assert_eq!(before.notifications.len(), 2);
    assert_eq!(before.unread_count, 1);

    let err = api.delete("n1").await.unwrap_err();
    assert_eq!(err.message, "database unavailable");

    // The optimistic removal was rolled back; the list is as fetched.
    let after = api.list(&query).await.unwrap();
    assert_eq!(after.notifications.len(), 2);
    assert_eq!(after.notifications[0].id, "n1");
    assert_eq!(after.unread_count, 1);
}

#[tokio::test]
async fn test_mark_as_read_survives_renewal_retry() {
    // The read endpoint 401s once, renews, then succeeds on retry; the
    // optimistic patch must commit, not roll back.
    let transport = MockTransport::new(|request, bearer| {
        if request.path == "/auth/refresh-token" {
            return response(200, crate::helpers::auth_body("new-token"));
        }
        if request.path == "/notifications" {
            return response(200, json!({"data": page_body()}));
        }
        match bearer {
            Some("new-token") => response(200, json!({"success": true})),
            _ => unauthorized(),
        }
    });
    let stack = authenticated_stack(transport).await;
    let api = NotificationsApi::new(stack.gateway.clone(), stack.cache.clone());

    let query = NotificationListQuery::default();
    api.list(&query).await.unwrap();

    api.mark_as_read("n1").await.unwrap();
    assert_eq!(stack.transport.calls_to("/notifications/n1/read"), 2);

    // The committed patch is visible until the invalidated entry refetches.
    let key = QueryKey::new("notifications", &query.to_pairs());
    let cached = stack.cache.get(&key).unwrap();
    assert_eq!(cached["notifications"][0]["isRead"], json!(true));
    assert_eq!(cached["unreadCount"], json!(0));
}

/// Patch that shifts a bare counter, used to pin journal ordering.
struct CounterPatch {
    delta: i64,
}

impl ValuePatch for CounterPatch {
    fn apply(&self, state: Value) -> Value {
        json!(state.as_i64().unwrap_or(0) + self.delta)
    }

    fn invert(&self, state: Value) -> Value {
        json!(state.as_i64().unwrap_or(0) - self.delta)
    }
}

#[tokio::test]
async fn test_rollback_is_isolated_under_out_of_order_completion() {
    let transport = MockTransport::new(|_, _| response(200, json!({})));
    let stack = authenticated_stack(transport).await;
    let cache = stack.cache;

    let key = QueryKey::bare("counter");
    cache.upsert(&key, &[], json!(0));

    // Mutation A issued first, B second; B completes first, A fails.
    let a = cache.begin_mutation();
    let b = cache.begin_mutation();
    cache.apply_patch(&key, a, Arc::new(CounterPatch { delta: 1 }));
    cache.apply_patch(&key, b, Arc::new(CounterPatch { delta: 10 }));
    assert_eq!(cache.get(&key).unwrap(), json!(11));

    cache.commit(&key, b);
    cache.rollback(&key, a);

    // Only B's effect remains.
    assert_eq!(cache.get(&key).unwrap(), json!(10));
}

#[tokio::test]
async fn test_commit_folds_in_issue_order() {
    let transport = MockTransport::new(|_, _| response(200, json!({})));
    let stack = authenticated_stack(transport).await;
    let cache = stack.cache;

    let key = QueryKey::bare("counter");
    cache.upsert(&key, &[], json!(0));

    let a = cache.begin_mutation();
    let b = cache.begin_mutation();
    cache.apply_patch(&key, a, Arc::new(CounterPatch { delta: 1 }));
    cache.apply_patch(&key, b, Arc::new(CounterPatch { delta: 10 }));

    // B's response lands before A's; the observable value never jumps.
    cache.commit(&key, b);
    assert_eq!(cache.get(&key).unwrap(), json!(11));
    cache.commit(&key, a);
    assert_eq!(cache.get(&key).unwrap(), json!(11));
}
