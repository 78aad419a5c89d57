//! Optimistic mutation patches.
//!
//! A mutation that patches the cache optimistically describes itself as an
//! immutable descriptor with a forward and an inverse transformation.
//! Descriptors are pure: applying and then inverting one returns the input
//! state, which is what makes rollback deterministic and testable.

use serde_json::Value;

/// Issue-order ticket for a mutation.
///
/// Tickets are allocated when the mutation is issued, before its network
/// request starts, and give the journal a total order that is independent
/// of response arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MutationId(pub u64);

/// An immutable optimistic-patch descriptor over a cached JSON value.
pub trait ValuePatch: Send + Sync {
    /// Apply the patch to the given state.
    fn apply(&self, state: Value) -> Value;

    /// Invert the patch: `invert(apply(s)) == s` for any state `s` the
    /// patch was applied to.
    fn invert(&self, state: Value) -> Value;
}
