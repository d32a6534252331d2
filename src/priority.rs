//! Priority core: 256 FIFO sub-queues, one per priority byte, layered under
//! one directory with an eagerly tracked global head priority.

use std::path::Path;

use parking_lot::Mutex;
use tracing::trace;

use crate::fifo::{OpenHandle, SubQueue};
use crate::item::Item;
use crate::kind::Kind;
use crate::options::Options;
use crate::{Error, Result};

const LEVELS: usize = 256;

/// Head-selection direction for a [`PriorityQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// The numerically smallest non-empty priority is the global head.
    Asc,
    /// The numerically largest non-empty priority is the global head.
    Desc,
}

/// A durable, on-disk priority queue with 256 discrete priority levels, each
/// internally FIFO.
pub struct PriorityQueue {
    inner: Mutex<PriorityState>,
}

struct PriorityState {
    handle: OpenHandle,
    subs: Vec<SubQueue>,
    order: Order,
    cur_head_priority: u8,
    is_empty: bool,
}

impl PriorityState {
    /// Full-range re-scan for the nearest non-empty sub-queue in the
    /// configured direction. Bounded by 256 cheap in-memory length checks;
    /// spec §4.5 requires scanning the full byte range defensively rather
    /// than assuming only one direction can hold a surviving item.
    fn rescan(&mut self) {
        let found = match self.order {
            Order::Asc => (0..LEVELS).find(|&p| !self.subs[p].is_empty()),
            Order::Desc => (0..LEVELS).rev().find(|&p| !self.subs[p].is_empty()),
        };
        match found {
            Some(p) => {
                self.cur_head_priority = p as u8;
                self.is_empty = false;
            }
            None => {
                self.is_empty = true;
            }
        }
    }
}

impl PriorityQueue {
    /// Opens (creating if necessary) a priority queue at `path` under the
    /// given head-selection `order`, with default options.
    pub fn open(path: impl AsRef<Path>, order: Order) -> Result<Self> {
        Self::open_with_options(path, order, Options::default())
    }

    /// Opens a priority queue at `path` with explicit [`Options`].
    pub fn open_with_options(path: impl AsRef<Path>, order: Order, opts: Options) -> Result<Self> {
        let handle = OpenHandle::open(path, Kind::Priority, opts)?;
        let store = handle.store()?;
        let mut subs = Vec::with_capacity(LEVELS);
        for p in 0..LEVELS {
            subs.push(SubQueue::recover(store, vec![p as u8])?);
        }
        let mut state = PriorityState {
            handle,
            subs,
            order,
            cur_head_priority: 0,
            is_empty: true,
        };
        state.rescan();
        trace!(
            order = ?state.order,
            is_empty = state.is_empty,
            cur_head_priority = state.cur_head_priority,
            "priority queue recovered"
        );
        Ok(Self { inner: Mutex::new(state) })
    }

    /// Enqueues `value` at priority level `priority`.
    pub fn enqueue(&self, value: &[u8], priority: u8) -> Result<Item> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let id = state.subs[priority as usize].enqueue(store, &opts, value)?;

        if state.is_empty {
            state.cur_head_priority = priority;
            state.is_empty = false;
        } else {
            match state.order {
                Order::Asc => {
                    if priority < state.cur_head_priority {
                        state.cur_head_priority = priority;
                    }
                }
                Order::Desc => {
                    if priority > state.cur_head_priority {
                        state.cur_head_priority = priority;
                    }
                }
            }
        }

        Ok(Item::new(id, Some(priority), value.to_vec()))
    }

    /// Dequeues the item at the current global head priority.
    pub fn dequeue(&self) -> Result<Item> {
        let mut state = self.inner.lock();
        if state.is_empty {
            return Err(Error::Empty);
        }
        let p = state.cur_head_priority;
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let (id, value) = state.subs[p as usize].dequeue_front(store, &opts)?;
        if state.subs[p as usize].is_empty() {
            state.rescan();
        }
        Ok(Item::new(id, Some(p), value))
    }

    /// Dequeues from sub-queue `priority` unconditionally, regardless of
    /// whether it is the current global head.
    pub fn dequeue_by_priority(&self, priority: u8) -> Result<Item> {
        let mut state = self.inner.lock();
        if state.subs[priority as usize].is_empty() {
            return Err(Error::Empty);
        }
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let (id, value) = state.subs[priority as usize].dequeue_front(store, &opts)?;
        if priority == state.cur_head_priority && state.subs[priority as usize].is_empty() {
            state.rescan();
        }
        Ok(Item::new(id, Some(priority), value))
    }

    /// Peeks the item at the current global head priority.
    pub fn peek(&self) -> Result<Item> {
        let state = self.inner.lock();
        if state.is_empty {
            return Err(Error::Empty);
        }
        let p = state.cur_head_priority;
        let (id, value) = state.subs[p as usize].peek_front(state.handle.store()?)?;
        Ok(Item::new(id, Some(p), value))
    }

    /// Treats all 256 sub-queues as concatenated in the configured direction
    /// and returns the item at offset `n`.
    pub fn peek_by_offset(&self, n: u64) -> Result<Item> {
        let state = self.inner.lock();
        let store = state.handle.store()?;
        let mut remaining = n;
        let levels: Box<dyn Iterator<Item = usize>> = match state.order {
            Order::Asc => Box::new(0..LEVELS),
            Order::Desc => Box::new((0..LEVELS).rev()),
        };
        for p in levels {
            let len = state.subs[p].len();
            if remaining < len {
                let (id, value) = state.subs[p].peek_by_offset_front(store, remaining)?;
                return Ok(Item::new(id, Some(p as u8), value));
            }
            remaining -= len;
        }
        Err(Error::OutOfBounds(n))
    }

    /// Direct access into sub-queue `priority` by id.
    pub fn peek_by_priority_id(&self, priority: u8, id: u64) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.subs[priority as usize].peek_by_id(state.handle.store()?, id)?;
        Ok(Item::new(id, Some(priority), value))
    }

    /// Replaces the value stored under `item.id` within `item.priority`'s
    /// sub-queue. `item.priority` must be `Some` (set by a prior
    /// enqueue/peek/dequeue on this queue).
    pub fn update(&self, item: &mut Item, new_value: &[u8]) -> Result<()> {
        let priority = item.priority.ok_or(Error::OutOfBounds(item.id))?;
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        state.subs[priority as usize].update(store, &opts, item.id, new_value)?;
        item.value = new_value.to_vec();
        Ok(())
    }

    /// Sum of every sub-queue's length.
    pub fn len(&self) -> u64 {
        self.inner.lock().subs.iter().map(SubQueue::len).sum()
    }

    /// `true` iff every sub-queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty
    }

    /// Flushes and closes the backing store, releasing the directory lock.
    pub fn close(&self) -> Result<()> {
        self.inner.lock().handle.close()
    }

    /// Closes the priority queue and removes its directory.
    pub fn drop_queue(&self) -> Result<()> {
        self.inner.lock().handle.drop_queue()
    }
}
