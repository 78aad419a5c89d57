//! Cache entry state and the per-entry patch journal.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::patch::{MutationId, ValuePatch};

/// One pending or committed patch in the journal.
pub(crate) struct PatchRecord {
    pub(crate) id: MutationId,
    pub(crate) patch: Arc<dyn ValuePatch>,
    pub(crate) committed: bool,
}

/// State of one cached query result.
///
/// `base` is the last server-confirmed value. Optimistic patches sit on
/// top of it in issue order; the observable value is the fold of the base
/// through every journaled patch. Rolling back a mutation removes exactly
/// its record, so a stale mutation's rollback never disturbs a newer
/// mutation's patch. Committing marks the record confirmed; confirmed
/// records are folded into the base only from the front of the journal,
/// which keeps the fold order equal to issue order even when responses
/// arrive out of order.
pub(crate) struct EntryState {
    pub(crate) base: Value,
    pub(crate) journal: Vec<PatchRecord>,
    pub(crate) tags: HashSet<String>,
    pub(crate) stale: bool,
    pub(crate) subscribers: u64,
}

impl EntryState {
    pub(crate) fn new(base: Value, tags: HashSet<String>) -> Self {
        Self {
            base,
            journal: Vec::new(),
            tags,
            stale: false,
            subscribers: 0,
        }
    }

    /// The observable value: base folded through the journal.
    pub(crate) fn current(&self) -> Value {
        self.journal
            .iter()
            .fold(self.base.clone(), |state, record| {
                record.patch.apply(state)
            })
    }

    /// Insert a patch keeping the journal sorted by issue order.
    pub(crate) fn push_patch(&mut self, id: MutationId, patch: Arc<dyn ValuePatch>) {
        let position = self
            .journal
            .partition_point(|record| record.id < id);
        self.journal.insert(
            position,
            PatchRecord {
                id,
                patch,
                committed: false,
            },
        );
    }

    /// Remove the patch for `id`. Returns whether it was present.
    pub(crate) fn remove_patch(&mut self, id: MutationId) -> bool {
        let before = self.journal.len();
        self.journal.retain(|record| record.id != id);
        self.journal.len() != before
    }

    /// Mark the patch for `id` confirmed, then fold every leading
    /// confirmed patch into the base.
    pub(crate) fn commit_patch(&mut self, id: MutationId) {
        if let Some(record) = self.journal.iter_mut().find(|r| r.id == id) {
            record.committed = true;
        }
        while self.journal.first().is_some_and(|r| r.committed) {
            let record = self.journal.remove(0);
            self.base = record.patch.apply(std::mem::take(&mut self.base));
        }
    }

    /// Replace the base with fresh server truth, keeping pending patches.
    pub(crate) fn refresh_base(&mut self, base: Value, tags: HashSet<String>) {
        self.base = base;
        self.tags = tags;
        self.stale = false;
    }
}
