//! The query cache.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use tracing::debug;

use lexhub_core::AppResult;
use lexhub_core::config::CacheConfig;

use crate::entry::EntryState;
use crate::key::QueryKey;
use crate::patch::{MutationId, ValuePatch};

type InflightFuture = Shared<BoxFuture<'static, AppResult<Value>>>;

/// Normalized, tag-addressed cache of server entities.
///
/// Entries are evicted after staying unused for the configured idle
/// period. Identical concurrent fetches share one in-flight execution;
/// mutations invalidate entries by tag and may patch entries
/// optimistically through issue-ordered patch journals.
pub struct QueryCache {
    entries: moka::sync::Cache<QueryKey, Arc<Mutex<EntryState>>>,
    tag_index: DashMap<String, HashSet<QueryKey>>,
    inflight: DashMap<QueryKey, InflightFuture>,
    mutation_seq: AtomicU64,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .finish_non_exhaustive()
    }
}

impl QueryCache {
    /// Create a cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = moka::sync::Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(std::time::Duration::from_secs(config.keep_unused_seconds))
            .build();

        Self {
            entries,
            tag_index: DashMap::new(),
            inflight: DashMap::new(),
            mutation_seq: AtomicU64::new(1),
        }
    }

    /// Read-through fetch with de-duplication.
    ///
    /// Returns the cached value when present and not stale. Otherwise
    /// exactly one execution of `loader` runs for this key; concurrent
    /// callers with the same key attach to it and receive the same result.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        tags: &[&str],
        loader: F,
    ) -> AppResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        if let Some(entry) = self.entries.get(key) {
            let state = entry.lock().expect("cache entry lock poisoned");
            if !state.stale {
                return Ok(state.current());
            }
        }

        let (fut, leader) = match self.inflight.entry(key.clone()) {
            Entry::Occupied(occupied) => (occupied.get().clone(), false),
            Entry::Vacant(vacant) => {
                let fut = loader().boxed().shared();
                vacant.insert(fut.clone());
                (fut, true)
            }
        };

        let result = fut.await;

        if leader {
            self.inflight.remove(key);
            if let Ok(value) = &result {
                self.store_fetched(key, tags, value.clone());
            }
        }

        result
    }

    fn store_fetched(&self, key: &QueryKey, tags: &[&str], value: Value) {
        let tag_set: HashSet<String> = tags.iter().map(|t| t.to_string()).collect();
        for tag in &tag_set {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }

        if let Some(entry) = self.entries.get(key) {
            entry
                .lock()
                .expect("cache entry lock poisoned")
                .refresh_base(value, tag_set);
        } else {
            self.entries.insert(
                key.clone(),
                Arc::new(Mutex::new(EntryState::new(value, tag_set))),
            );
        }
    }

    /// The current observable value for `key` (last-known state, stale or
    /// not), if cached.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.entries
            .get(key)
            .map(|entry| entry.lock().expect("cache entry lock poisoned").current())
    }

    /// Whether the entry for `key` is marked stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.lock().expect("cache entry lock poisoned").stale)
            .unwrap_or(false)
    }

    /// Mark every entry carrying one of `tags` stale. Stale entries are
    /// re-fetched on next access; nothing is forced while unobserved.
    pub fn invalidate(&self, tags: &[&str]) {
        let mut count = 0usize;
        for tag in tags {
            if let Some(keys) = self.tag_index.get(*tag) {
                for key in keys.iter() {
                    if let Some(entry) = self.entries.get(key) {
                        entry.lock().expect("cache entry lock poisoned").stale = true;
                        count += 1;
                    }
                }
            }
        }
        debug!(?tags, count, "Cache entries invalidated");
    }

    /// Allocate the issue-order ticket for a mutation. Tickets order the
    /// patch journal independently of response arrival order.
    pub fn begin_mutation(&self) -> MutationId {
        MutationId(self.mutation_seq.fetch_add(1, Ordering::SeqCst))
    }

    /// Apply an optimistic patch to `key`. No-op when nothing is cached
    /// under the key. Returns whether a patch was recorded.
    pub fn apply_patch(
        &self,
        key: &QueryKey,
        id: MutationId,
        patch: Arc<dyn ValuePatch>,
    ) -> bool {
        match self.entries.get(key) {
            Some(entry) => {
                entry
                    .lock()
                    .expect("cache entry lock poisoned")
                    .push_patch(id, patch);
                true
            }
            None => false,
        }
    }

    /// Roll back the patch recorded for `id` on `key`, leaving every other
    /// mutation's patch in place.
    pub fn rollback(&self, key: &QueryKey, id: MutationId) -> bool {
        match self.entries.get(key) {
            Some(entry) => entry
                .lock()
                .expect("cache entry lock poisoned")
                .remove_patch(id),
            None => false,
        }
    }

    /// Confirm the patch for `id` on `key`, folding confirmed patches into
    /// the server-truth base in issue order.
    pub fn commit(&self, key: &QueryKey, id: MutationId) {
        if let Some(entry) = self.entries.get(key) {
            entry
                .lock()
                .expect("cache entry lock poisoned")
                .commit_patch(id);
        }
    }

    /// Write server truth for `key` directly (push-event sync, seeding).
    pub fn upsert(&self, key: &QueryKey, tags: &[&str], value: Value) {
        self.store_fetched(key, tags, value);
    }

    /// Transform the server-truth base of `key` in place, below any
    /// pending optimistic patches. Returns whether the entry existed.
    pub fn patch_base<F>(&self, key: &QueryKey, transform: F) -> bool
    where
        F: FnOnce(Value) -> Value,
    {
        match self.entries.get(key) {
            Some(entry) => {
                let mut state = entry.lock().expect("cache entry lock poisoned");
                state.base = transform(std::mem::take(&mut state.base));
                true
            }
            None => false,
        }
    }

    /// Attach a subscriber to `key`.
    pub fn subscribe(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.get(key) {
            entry.lock().expect("cache entry lock poisoned").subscribers += 1;
        }
    }

    /// Detach a subscriber from `key`. The underlying entry is not
    /// dropped eagerly; idle eviction reclaims it.
    pub fn unsubscribe(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.get(key) {
            let mut state = entry.lock().expect("cache entry lock poisoned");
            state.subscribers = state.subscribers.saturating_sub(1);
        }
    }

    /// Current subscriber count for `key`.
    pub fn subscriber_count(&self, key: &QueryKey) -> u64 {
        self.entries
            .get(key)
            .map(|entry| entry.lock().expect("cache entry lock poisoned").subscribers)
            .unwrap_or(0)
    }

    /// Drop everything. Used on logout.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.tag_index.clear();
        self.inflight.clear();
    }
}
