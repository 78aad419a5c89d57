//! Single-flight execution of a fallible async operation.
//!
//! At most one execution is in flight at a time; callers that arrive while
//! one is running await its outcome instead of starting their own. The
//! request gateway uses this for token renewal (one renewal per failure
//! episode, all 401-ed requests queued behind it) and the notification
//! channel uses the same coordinator for its pending-reconnect handling.

use std::future::Future;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use crate::result::AppResult;

/// Coordinates single-flight execution of an async operation producing `T`.
///
/// The outcome (success or error) is cloned to every caller that joined the
/// in-flight execution. Once the operation settles, the slot is cleared and
/// the next `run` starts a fresh execution.
pub struct SingleFlight<T: Clone> {
    inflight: Mutex<Option<Shared<BoxFuture<'static, AppResult<T>>>>>,
}

impl<T: Clone> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    /// Creates an idle single-flight slot.
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(None),
        }
    }

    /// Runs `op`, or joins the execution already in flight.
    ///
    /// `op` is only invoked when no execution is in flight; joiners drop
    /// their closure unused and await the shared outcome. The caller that
    /// started the execution clears the slot after it settles.
    pub async fn run<F, Fut>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let (fut, leader) = {
            let mut slot = self.inflight.lock().await;
            match slot.as_ref() {
                Some(existing) => (existing.clone(), false),
                None => {
                    let fut = op().boxed().shared();
                    *slot = Some(fut.clone());
                    (fut, true)
                }
            }
        };

        let result = fut.await;

        if leader {
            *self.inflight.lock().await = None;
        }

        result
    }

    /// Whether an execution is currently in flight.
    pub async fn is_in_flight(&self) -> bool {
        self.inflight.lock().await.is_some()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}
