//! Subscriber registration and event dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::trace;

use crate::events::ChannelEvent;

/// Callback invoked for each matching event.
pub type EventCallback = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;

/// Tracks which callbacks are registered for which event names and
/// dispatches events to them in registration order.
///
/// Dispatch happens synchronously on the channel's single reader task, so
/// subscribers observe events in exactly the order the transport received
/// them.
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    by_event: DashMap<String, Vec<(u64, EventCallback)>>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("events", &self.by_event.len())
            .finish_non_exhaustive()
    }
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            by_event: DashMap::new(),
        }
    }

    /// Register `callback` for `event` and return its unsubscribe handle.
    pub fn on(
        self: &Arc<Self>,
        event: impl Into<String>,
        callback: EventCallback,
    ) -> Subscription {
        let event = event.into();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.by_event
            .entry(event.clone())
            .or_default()
            .push((id, callback));
        Subscription {
            registry: self.clone(),
            event,
            id,
        }
    }

    /// Remove the callback registered under `id` for `event`.
    pub fn off(&self, event: &str, id: u64) {
        if let Some(mut callbacks) = self.by_event.get_mut(event) {
            callbacks.retain(|(cb_id, _)| *cb_id != id);
        }
    }

    /// Invoke every callback registered for this event's name.
    pub fn dispatch(&self, event: &ChannelEvent) {
        // Snapshot outside the shard lock; a callback may unsubscribe.
        let callbacks: Vec<EventCallback> = self
            .by_event
            .get(event.name())
            .map(|entry| entry.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        trace!(event = event.name(), subscribers = callbacks.len(), "Dispatching channel event");
        for callback in callbacks {
            callback(event);
        }
    }

    /// Drop every subscription. Used on disconnect/logout.
    pub fn clear(&self) {
        self.by_event.clear();
    }

    /// Number of callbacks registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.by_event.get(event).map(|v| v.len()).unwrap_or(0)
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle that removes its callback on [`Subscription::unsubscribe`].
pub struct Subscription {
    registry: Arc<SubscriberRegistry>,
    event: String,
    id: u64,
}

impl Subscription {
    /// Remove the callback this handle registered.
    pub fn unsubscribe(self) {
        self.registry.off(&self.event, self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("id", &self.id)
            .finish()
    }
}
