//! Notification endpoint surface.
//!
//! Queries go through the entity cache (tagged, de-duplicated); the read
//! and delete mutations patch the cache optimistically before their
//! request is sent and roll the patch back if it fails. Channel events
//! are folded into the cached list with [`NotificationsApi::apply_push`],
//! so the bell badge tracks the server without refetching.

mod patches;

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::debug;

use lexhub_cache::{QueryCache, QueryKey};
use lexhub_core::AppResult;
use lexhub_entity::{NotificationKind, NotificationPage, NotificationPriority, NotificationStats};
use lexhub_gateway::{ApiRequest, RequestGateway};
use lexhub_realtime::ChannelEvent;

use crate::tags::{NOTIFICATION_COUNT, NOTIFICATION_STATS, NOTIFICATIONS};
use crate::unwrap_data;
use patches::{
    DeleteNotificationPatch, MarkAllReadPatch, MarkReadPatch, StatsUnreadDelta, StatsUnreadZero,
    adjust_unread,
};

/// Default page size for the notification list.
const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Filterable, paginated query for the notification list.
#[derive(Debug, Clone)]
pub struct NotificationListQuery {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
    /// Filter by read state.
    pub is_read: Option<bool>,
    /// Filter by kind.
    pub kind: Option<NotificationKind>,
    /// Filter by priority.
    pub priority: Option<NotificationPriority>,
    /// Inclusive lower creation-date bound (ISO 8601).
    pub start_date: Option<String>,
    /// Inclusive upper creation-date bound (ISO 8601).
    pub end_date: Option<String>,
}

impl Default for NotificationListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            is_read: None,
            kind: None,
            priority: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl NotificationListQuery {
    /// Render the query-string pairs in the order the backend expects.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(is_read) = self.is_read {
            pairs.push(("isRead".to_string(), is_read.to_string()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("type".to_string(), kind.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority".to_string(), priority.as_str().to_string()));
        }
        if let Some(start) = &self.start_date {
            pairs.push(("startDate".to_string(), start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("endDate".to_string(), end.clone()));
        }
        pairs
    }
}

/// Typed surface over the notification endpoints.
pub struct NotificationsApi {
    gateway: Arc<RequestGateway>,
    cache: Arc<QueryCache>,
}

impl std::fmt::Debug for NotificationsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationsApi").finish_non_exhaustive()
    }
}

impl NotificationsApi {
    /// Creates the surface over a shared gateway and cache.
    pub fn new(gateway: Arc<RequestGateway>, cache: Arc<QueryCache>) -> Self {
        Self { gateway, cache }
    }

    fn list_key(query: &NotificationListQuery) -> QueryKey {
        QueryKey::new("notifications", &query.to_pairs())
    }

    /// The cache key optimistic patches and push events target: the
    /// unfiltered first page the bell dropdown displays.
    fn default_list_key() -> QueryKey {
        Self::list_key(&NotificationListQuery::default())
    }

    fn stats_key() -> QueryKey {
        QueryKey::bare("notification-stats")
    }

    fn unread_key() -> QueryKey {
        QueryKey::bare("notification-unread-count")
    }

    /// Fetch a page of notifications, served from cache when fresh.
    pub async fn list(&self, query: &NotificationListQuery) -> AppResult<NotificationPage> {
        let key = Self::list_key(query);
        let request = ApiRequest::get("/notifications").query(query.to_pairs());
        let gateway = self.gateway.clone();

        let value = self
            .cache
            .fetch(
                &key,
                &[NOTIFICATIONS, NOTIFICATION_STATS, NOTIFICATION_COUNT],
                move || async move {
                    let response = gateway.send(&request).await?;
                    let page: NotificationPage =
                        serde_json::from_value(unwrap_data(response.body))?;
                    Ok(serde_json::to_value(page)?)
                },
            )
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch aggregate statistics, served from cache when fresh.
    pub async fn stats(&self) -> AppResult<NotificationStats> {
        let key = Self::stats_key();
        let request = ApiRequest::get("/notifications/stats");
        let gateway = self.gateway.clone();

        let value = self
            .cache
            .fetch(&key, &[NOTIFICATION_STATS], move || async move {
                let response = gateway.send(&request).await?;
                Ok(unwrap_data(response.body))
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// The unread counter for the bell badge, served from cache when
    /// fresh. Push events keep this in sync between fetches.
    pub async fn unread_count(&self) -> AppResult<u64> {
        let key = Self::unread_key();
        let request = ApiRequest::get("/notifications/stats");
        let gateway = self.gateway.clone();

        let value = self
            .cache
            .fetch(&key, &[NOTIFICATION_COUNT], move || async move {
                let response = gateway.send(&request).await?;
                let data = unwrap_data(response.body);
                let unread = data
                    .get("summary")
                    .and_then(|s| s.get("unread"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                Ok(json!(unread))
            })
            .await?;

        Ok(value.as_u64().unwrap_or(0))
    }

    /// Mark one notification read.
    ///
    /// The cached list and stats are patched before the request is sent;
    /// a failed request rolls exactly this mutation's patches back.
    pub async fn mark_as_read(&self, id: &str) -> AppResult<()> {
        let list_key = Self::default_list_key();
        let stats_key = Self::stats_key();
        let ticket = self.cache.begin_mutation();

        let list_patched = self.cache.apply_patch(
            &list_key,
            ticket,
            Arc::new(MarkReadPatch { id: id.to_string() }),
        );
        let stats_patched =
            self.cache
                .apply_patch(&stats_key, ticket, Arc::new(StatsUnreadDelta { delta: -1 }));

        let request = ApiRequest::put(format!("/notifications/{id}/read"));
        match self.gateway.send(&request).await {
            Ok(_) => {
                self.cache.commit(&list_key, ticket);
                self.cache.commit(&stats_key, ticket);
                self.cache
                    .invalidate(&[NOTIFICATIONS, NOTIFICATION_STATS, NOTIFICATION_COUNT]);
                Ok(())
            }
            Err(e) => {
                if list_patched {
                    self.cache.rollback(&list_key, ticket);
                }
                if stats_patched {
                    self.cache.rollback(&stats_key, ticket);
                }
                Err(e)
            }
        }
    }

    /// Mark every notification read.
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        let list_key = Self::default_list_key();
        let stats_key = Self::stats_key();
        let ticket = self.cache.begin_mutation();

        // Capture what is unread now; zeroing is not invertible otherwise.
        let snapshot = self.cache.get(&list_key);
        let previously_unread: Vec<String> = snapshot
            .as_ref()
            .and_then(|page| page.get("notifications"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.get("isRead") == Some(&Value::Bool(false)))
                    .filter_map(|item| item.get("_id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let previous_unread_count = snapshot
            .as_ref()
            .and_then(|page| page.get("unreadCount"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let previous_stats_unread = self
            .cache
            .get(&stats_key)
            .as_ref()
            .and_then(|stats| stats.get("summary"))
            .and_then(|summary| summary.get("unread"))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        let list_patched = self.cache.apply_patch(
            &list_key,
            ticket,
            Arc::new(MarkAllReadPatch {
                previously_unread,
                previous_unread_count,
            }),
        );
        let stats_patched = self.cache.apply_patch(
            &stats_key,
            ticket,
            Arc::new(StatsUnreadZero {
                previous_unread: previous_stats_unread,
            }),
        );

        let request = ApiRequest::put("/notifications/read-all");
        match self.gateway.send(&request).await {
            Ok(_) => {
                self.cache.commit(&list_key, ticket);
                self.cache.commit(&stats_key, ticket);
                self.cache
                    .invalidate(&[NOTIFICATIONS, NOTIFICATION_STATS, NOTIFICATION_COUNT]);
                Ok(())
            }
            Err(e) => {
                if list_patched {
                    self.cache.rollback(&list_key, ticket);
                }
                if stats_patched {
                    self.cache.rollback(&stats_key, ticket);
                }
                Err(e)
            }
        }
    }

    /// Delete one notification.
    ///
    /// The unread counter drops only when the removed record was unread,
    /// judged from the cache at issue time.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let list_key = Self::default_list_key();
        let ticket = self.cache.begin_mutation();

        let snapshot = self.cache.get(&list_key);
        let (removed, index) = snapshot
            .as_ref()
            .and_then(|page| page.get("notifications"))
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .position(|item| item.get("_id").and_then(Value::as_str) == Some(id))
                    .map(|index| (Some(items[index].clone()), index))
            })
            .unwrap_or((None, 0));
        let was_unread = removed
            .as_ref()
            .map(|record| record.get("isRead") == Some(&Value::Bool(false)))
            .unwrap_or(false);

        let list_patched = self.cache.apply_patch(
            &list_key,
            ticket,
            Arc::new(DeleteNotificationPatch {
                id: id.to_string(),
                removed,
                was_unread,
                index,
            }),
        );

        let request = ApiRequest::delete(format!("/notifications/{id}"));
        match self.gateway.send(&request).await {
            Ok(_) => {
                self.cache.commit(&list_key, ticket);
                self.cache
                    .invalidate(&[NOTIFICATIONS, NOTIFICATION_STATS, NOTIFICATION_COUNT]);
                Ok(())
            }
            Err(e) => {
                if list_patched {
                    self.cache.rollback(&list_key, ticket);
                }
                Err(e)
            }
        }
    }

    /// Fold a channel event into the cached list and unread counter.
    ///
    /// Server truth lands below any pending optimistic patches. When the
    /// event carries the server's unread count that value wins; otherwise
    /// the counter is adjusted locally.
    pub fn apply_push(&self, event: &ChannelEvent) {
        let list_key = Self::default_list_key();
        match event {
            ChannelEvent::Connect => {
                // Anything pushed while disconnected was missed.
                self.cache
                    .invalidate(&[NOTIFICATIONS, NOTIFICATION_STATS, NOTIFICATION_COUNT]);
            }
            ChannelEvent::Disconnect => {}
            ChannelEvent::NewNotification {
                notification,
                unread_count,
            } => {
                let record = match serde_json::to_value(notification) {
                    Ok(record) => record,
                    Err(_) => return,
                };
                let count = *unread_count;
                self.cache.patch_base(&list_key, move |mut page| {
                    if let Some(items) =
                        page.get_mut("notifications").and_then(Value::as_array_mut)
                    {
                        items.insert(0, record);
                    }
                    if let Some(total) = page.get("total").and_then(Value::as_u64) {
                        page["total"] = json!(total + 1);
                    }
                    match count {
                        Some(count) => page["unreadCount"] = json!(count),
                        None => adjust_unread(&mut page, 1),
                    }
                    page
                });
                self.sync_unread_count(*unread_count, 1);
                self.cache.invalidate(&[NOTIFICATION_STATS]);
                debug!(id = %notification.id, "Push: new notification");
            }
            ChannelEvent::NotificationRead {
                notification_id,
                unread_count,
            } => {
                let id = notification_id.clone();
                let count = *unread_count;
                self.cache.patch_base(&list_key, move |mut page| {
                    let mut flipped = false;
                    if let Some(items) =
                        page.get_mut("notifications").and_then(Value::as_array_mut)
                    {
                        for item in items {
                            if item.get("_id").and_then(Value::as_str) == Some(id.as_str())
                                && item.get("isRead") == Some(&Value::Bool(false))
                            {
                                item["isRead"] = Value::Bool(true);
                                flipped = true;
                            }
                        }
                    }
                    match count {
                        Some(count) => page["unreadCount"] = json!(count),
                        None if flipped => adjust_unread(&mut page, -1),
                        None => {}
                    }
                    page
                });
                self.sync_unread_count(*unread_count, -1);
                self.cache.invalidate(&[NOTIFICATION_STATS]);
            }
            ChannelEvent::AllNotificationsRead { unread_count } => {
                let count = unread_count.unwrap_or(0);
                self.cache.patch_base(&list_key, move |mut page| {
                    if let Some(items) =
                        page.get_mut("notifications").and_then(Value::as_array_mut)
                    {
                        for item in items {
                            item["isRead"] = Value::Bool(true);
                        }
                    }
                    page["unreadCount"] = json!(count);
                    page
                });
                self.cache
                    .upsert(&Self::unread_key(), &[NOTIFICATION_COUNT], json!(count));
                self.cache.invalidate(&[NOTIFICATION_STATS]);
            }
            ChannelEvent::NotificationDeleted {
                notification_id,
                unread_count,
            } => {
                let id = notification_id.clone();
                let count = *unread_count;
                self.cache.patch_base(&list_key, move |mut page| {
                    let mut removed_unread = false;
                    if let Some(items) =
                        page.get_mut("notifications").and_then(Value::as_array_mut)
                    {
                        if let Some(index) = items
                            .iter()
                            .position(|item| {
                                item.get("_id").and_then(Value::as_str) == Some(id.as_str())
                            })
                        {
                            let removed = items.remove(index);
                            removed_unread =
                                removed.get("isRead") == Some(&Value::Bool(false));
                        }
                    }
                    if let Some(total) = page.get("total").and_then(Value::as_u64) {
                        page["total"] = json!(total.saturating_sub(1));
                    }
                    match count {
                        Some(count) => page["unreadCount"] = json!(count),
                        None if removed_unread => adjust_unread(&mut page, -1),
                        None => {}
                    }
                    page
                });
                self.sync_unread_count(*unread_count, -1);
                self.cache.invalidate(&[NOTIFICATION_STATS]);
            }
        }
    }

    /// Bring the badge counter entry in line with a push event.
    fn sync_unread_count(&self, server_count: Option<u64>, local_delta: i64) {
        match server_count {
            Some(count) => {
                self.cache
                    .upsert(&Self::unread_key(), &[NOTIFICATION_COUNT], json!(count));
            }
            None => {
                self.cache.patch_base(&Self::unread_key(), move |value| {
                    let current = value.as_u64().unwrap_or(0) as i64;
                    json!((current + local_delta).max(0))
                });
            }
        }
    }
}
