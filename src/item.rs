//! The `Item` record returned by peek/dequeue/enqueue.

use serde::{Deserialize, Serialize};

/// An immutable record produced by enqueue and returned by peek/dequeue.
///
/// `value` is never mutated by this crate except via an explicit `Update`
/// call, and items handed back to callers are independent copies: mutating
/// a returned `Item` has no effect on what is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique, monotonically increasing (within its sub-queue) identifier
    /// assigned at enqueue time.
    pub id: u64,
    /// Priority level, present only for items returned from a `PriorityQueue`.
    pub priority: Option<u8>,
    /// Opaque payload bytes.
    pub value: Vec<u8>,
}

impl Item {
    pub(crate) fn new(id: u64, priority: Option<u8>, value: Vec<u8>) -> Self {
        Self { id, priority, value }
    }
}
