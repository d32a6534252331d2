//! LIFO façade: identical key schema and enqueue as [`crate::Queue`]; only
//! dequeue/peek target the tail instead of the head.

use std::path::Path;

use parking_lot::Mutex;

use crate::fifo::{OpenHandle, SubQueue};
use crate::item::Item;
use crate::kind::Kind;
use crate::options::Options;
use crate::Result;

/// A durable, on-disk stack (LIFO) with stable insertion order.
pub struct Stack {
    inner: Mutex<StackState>,
}

struct StackState {
    handle: OpenHandle,
    sub: SubQueue,
}

impl Stack {
    /// Opens (creating if necessary) a stack at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, Options::default())
    }

    /// Opens a stack at `path` with explicit [`Options`].
    pub fn open_with_options(path: impl AsRef<Path>, opts: Options) -> Result<Self> {
        // FIFO and LIFO share the same on-disk kind marker: the distinction
        // is purely behavioural at open time and cannot be detected from
        // persisted state (spec §3, "Kind marker").
        let handle = OpenHandle::open(path, Kind::FifoStack, opts)?;
        let sub = SubQueue::recover(handle.store()?, Vec::new())?;
        Ok(Self { inner: Mutex::new(StackState { handle, sub }) })
    }

    /// Pushes `value` onto the stack.
    pub fn enqueue(&self, value: &[u8]) -> Result<Item> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let id = state.sub.enqueue(store, &opts, value)?;
        Ok(Item::new(id, None, value.to_vec()))
    }

    /// Removes and returns the item most recently pushed.
    pub fn dequeue(&self) -> Result<Item> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let (id, value) = state.sub.dequeue_back(store, &opts)?;
        Ok(Item::new(id, None, value))
    }

    /// Returns the item most recently pushed, without removing it.
    pub fn peek(&self) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.sub.peek_back(state.handle.store()?)?;
        Ok(Item::new(id, None, value))
    }

    /// Returns the item `n` positions before the top (`n == 0` is the top).
    pub fn peek_by_offset(&self, n: u64) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.sub.peek_by_offset_back(state.handle.store()?, n)?;
        Ok(Item::new(id, None, value))
    }

    /// Returns the item with the given `id`, if it is still live.
    pub fn peek_by_id(&self, id: u64) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.sub.peek_by_id(state.handle.store()?, id)?;
        Ok(Item::new(id, None, value))
    }

    /// Replaces the value stored under `item.id` with `new_value`.
    pub fn update(&self, item: &mut Item, new_value: &[u8]) -> Result<()> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        state.sub.update(store, &opts, item.id, new_value)?;
        item.value = new_value.to_vec();
        Ok(())
    }

    /// Number of items currently on the stack.
    pub fn len(&self) -> u64 {
        self.inner.lock().sub.len()
    }

    /// `true` iff the stack currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().sub.is_empty()
    }

    /// Flushes and closes the backing store, releasing the directory lock.
    pub fn close(&self) -> Result<()> {
        self.inner.lock().handle.close()
    }

    /// Closes the stack and removes its directory.
    pub fn drop_queue(&self) -> Result<()> {
        self.inner.lock().handle.drop_queue()
    }
}
