//! # durable-queue
//!
//! An embedded, durable, ordered queue library backed by an on-disk ordered
//! key-value store ([`sled`]). It exposes three persistent container
//! abstractions on a shared storage substrate:
//!
//! - [`Queue`]: a FIFO queue with stable insertion order.
//! - [`Stack`]: a LIFO stack with stable insertion order.
//! - [`PriorityQueue`]: 256 discrete priority levels, each internally FIFO,
//!   with a configurable head-selection policy ([`Order::Asc`] /
//!   [`Order::Desc`]).
//!
//! All three persist every mutation synchronously by default (see
//! [`Options::sync`]), survive process restarts with consistent head/tail
//! positions, and support random-access read (peek by offset or by
//! identifier), out-of-place value updates, and destructive removal.
//!
//! ## Concurrency
//!
//! A handle may be shared across threads (wrap it in an `Arc` to do so);
//! every public operation acquires a single per-handle [`parking_lot::Mutex`]
//! guarding both the in-memory cursor state and the backing store calls.
//! Opening the same directory twice, from this process or another, fails,
//! because the backing store takes an exclusive lock on `open`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use durable_queue::Queue;
//!
//! # fn main() -> durable_queue::Result<()> {
//! let q = Queue::open("./my-queue")?;
//! q.enqueue(b"a")?;
//! q.enqueue(b"b")?;
//! assert_eq!(q.len(), 2);
//! let item = q.dequeue()?;
//! assert_eq!(item.value, b"a");
//! # Ok(())
//! # }
//! ```

mod fifo;
mod item;
mod kind;
mod options;
mod priority;
mod stack;
mod store;

pub use fifo::Queue;
pub use item::Item;
pub use options::Options;
pub use priority::{Order, PriorityQueue};
pub use stack::Stack;

/// Result type for every public operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for durable-queue operations (see the design doc's error
/// handling section). Every operation either returns a valid item/unit or
/// exactly one of these.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Dequeue/peek on a queue or sub-queue with no live items.
    #[error("queue is empty")]
    Empty,
    /// Offset or id outside the live range, or offset >= length.
    #[error("offset or id {0} is out of bounds")]
    OutOfBounds(u64),
    /// The directory's recorded kind marker differs from the kind requested
    /// at open.
    #[error("directory already holds a queue of a different kind")]
    IncompatibleType,
    /// Any failure surfaced by the backing store (lock contention, disk
    /// error, checksum failure).
    #[error("backing store I/O error: {0}")]
    Io(#[from] sled::Error),
    /// Operation attempted on a handle after `close`/`drop_queue`.
    #[error("operation on a closed queue")]
    DbClosed,
}
