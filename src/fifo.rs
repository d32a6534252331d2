//! FIFO core: the monotonic key schema and cursor discipline shared by
//! [`crate::Queue`], [`crate::Stack`], and every per-priority sub-queue inside
//! [`crate::PriorityQueue`].

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::item::Item;
use crate::kind::{check_or_record, Kind};
use crate::options::Options;
use crate::store::{KvStore, SledKvStore};
use crate::{Error, Result};

/// One FIFO cursor pair plus the fixed key prefix that namespaces it. The
/// priority core owns 256 of these (one per priority byte); the plain FIFO
/// and LIFO façades own exactly one, with an empty prefix.
pub(crate) struct SubQueue {
    prefix: Vec<u8>,
    head: u64,
    tail: u64,
}

impl SubQueue {
    fn key(&self, id: u64) -> Vec<u8> {
        let mut k = Vec::with_capacity(self.prefix.len() + 8);
        k.extend_from_slice(&self.prefix);
        k.extend_from_slice(&id.to_be_bytes());
        k
    }

    /// Inclusive `[lo, hi]` byte bounds spanning every possible item key
    /// under `prefix`: `prefix ++ BE64(0)` through `prefix ++
    /// BE64(u64::MAX)`. Bounding by value rather than by "starts with
    /// `prefix`" keeps the (shorter, empty) kind-marker key out of the scan
    /// even when `prefix` itself is empty (the plain FIFO/LIFO case).
    fn bounds_for(prefix: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut lo = prefix.to_vec();
        lo.extend_from_slice(&0u64.to_be_bytes());
        let mut hi = prefix.to_vec();
        hi.extend_from_slice(&u64::MAX.to_be_bytes());
        (lo, hi)
    }

    /// Reconstructs head/tail for `prefix` by seeking the store's extremal
    /// keys under it. Correct because enqueue only ever appends a key
    /// numerically greater than `tail`, and dequeue only ever deletes the key
    /// at `head` (or, for the LIFO/priority re-scan paths, at `tail`), so
    /// the extremal present keys bracket exactly the live range.
    pub(crate) fn recover(store: &dyn KvStore, prefix: Vec<u8>) -> Result<Self> {
        let (lo, hi) = Self::bounds_for(&prefix);
        let tail = match store.last_key_in_range(&lo, &hi)? {
            Some(k) => Self::parse_id_with_prefix(&prefix, &k),
            None => 0,
        };
        let head = match store.first_key_in_range(&lo, &hi)? {
            Some(k) => Self::parse_id_with_prefix(&prefix, &k),
            None => tail + 1,
        };
        Ok(Self { prefix, head, tail })
    }

    fn parse_id_with_prefix(prefix: &[u8], key: &[u8]) -> u64 {
        let id_bytes: [u8; 8] = key[prefix.len()..prefix.len() + 8]
            .try_into()
            .expect("item key is always prefix.len() + 8 bytes");
        u64::from_be_bytes(id_bytes)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head > self.tail
    }

    pub(crate) fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.tail - self.head + 1
        }
    }

    pub(crate) fn enqueue(
        &mut self,
        store: &dyn KvStore,
        opts: &Options,
        value: &[u8],
    ) -> Result<u64> {
        let id = self.tail + 1;
        store.put(&self.key(id), value)?;
        if opts.sync {
            store.flush()?;
        }
        self.tail = id;
        Ok(id)
    }

    pub(crate) fn dequeue_front(&mut self, store: &dyn KvStore, opts: &Options) -> Result<(u64, Vec<u8>)> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let id = self.head;
        let key = self.key(id);
        let value = store.get(&key)?.ok_or(Error::Empty)?;
        store.delete(&key)?;
        if opts.sync {
            store.flush()?;
        }
        self.head += 1;
        Ok((id, value))
    }

    pub(crate) fn dequeue_back(&mut self, store: &dyn KvStore, opts: &Options) -> Result<(u64, Vec<u8>)> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let id = self.tail;
        let key = self.key(id);
        let value = store.get(&key)?.ok_or(Error::Empty)?;
        store.delete(&key)?;
        if opts.sync {
            store.flush()?;
        }
        self.tail -= 1;
        Ok((id, value))
    }

    pub(crate) fn peek_front(&self, store: &dyn KvStore) -> Result<(u64, Vec<u8>)> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let value = store.get(&self.key(self.head))?.ok_or(Error::Empty)?;
        Ok((self.head, value))
    }

    pub(crate) fn peek_back(&self, store: &dyn KvStore) -> Result<(u64, Vec<u8>)> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let value = store.get(&self.key(self.tail))?.ok_or(Error::Empty)?;
        Ok((self.tail, value))
    }

    pub(crate) fn peek_by_offset_front(&self, store: &dyn KvStore, n: u64) -> Result<(u64, Vec<u8>)> {
        if n >= self.len() {
            return Err(Error::OutOfBounds(n));
        }
        self.peek_by_id(store, self.head + n)
    }

    pub(crate) fn peek_by_offset_back(&self, store: &dyn KvStore, n: u64) -> Result<(u64, Vec<u8>)> {
        if n >= self.len() {
            return Err(Error::OutOfBounds(n));
        }
        self.peek_by_id(store, self.tail - n)
    }

    pub(crate) fn peek_by_id(&self, store: &dyn KvStore, id: u64) -> Result<(u64, Vec<u8>)> {
        if id < self.head || id > self.tail {
            return Err(Error::OutOfBounds(id));
        }
        let value = store.get(&self.key(id))?.ok_or(Error::OutOfBounds(id))?;
        Ok((id, value))
    }

    pub(crate) fn update(
        &mut self,
        store: &dyn KvStore,
        opts: &Options,
        id: u64,
        new_value: &[u8],
    ) -> Result<()> {
        if id < self.head || id > self.tail {
            return Err(Error::OutOfBounds(id));
        }
        store.put(&self.key(id), new_value)?;
        if opts.sync {
            store.flush()?;
        }
        Ok(())
    }
}

/// Shared directory-ownership state behind every public handle: the open
/// store (or `None` after `close`/`drop_queue`), the path it owns, and the
/// options it was opened with.
pub(crate) struct OpenHandle {
    store: Option<SledKvStore>,
    path: PathBuf,
    pub(crate) opts: Options,
}

impl OpenHandle {
    pub(crate) fn open(path: impl AsRef<Path>, kind: Kind, opts: Options) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(?path, "opening queue directory");
        let store = SledKvStore::open(&path)?;
        check_or_record(&store, kind)?;
        Ok(Self { store: Some(store), path, opts })
    }

    pub(crate) fn store(&self) -> Result<&dyn KvStore> {
        match &self.store {
            Some(s) => Ok(s),
            None => Err(Error::DbClosed),
        }
    }

    pub(crate) fn close(&mut self) -> Result<()> {
        if let Some(store) = self.store.take() {
            store.flush()?;
            trace!(path = ?self.path, "queue closed");
        }
        Ok(())
    }

    pub(crate) fn drop_queue(&mut self) -> Result<()> {
        self.close()?;
        SledKvStore::destroy(&self.path)?;
        debug!(path = ?self.path, "queue directory removed");
        Ok(())
    }
}

/// A durable, on-disk FIFO queue with stable insertion order.
///
/// Every mutation is persisted before the call returns (subject to
/// [`Options::sync`]); the directory is exclusively owned for the lifetime
/// of this handle.
pub struct Queue {
    inner: Mutex<QueueState>,
}

struct QueueState {
    handle: OpenHandle,
    sub: SubQueue,
}

impl Queue {
    /// Opens (creating if necessary) a FIFO queue at `path` with default
    /// options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, Options::default())
    }

    /// Opens a FIFO queue at `path` with explicit [`Options`].
    pub fn open_with_options(path: impl AsRef<Path>, opts: Options) -> Result<Self> {
        let handle = OpenHandle::open(path, Kind::FifoStack, opts)?;
        let sub = SubQueue::recover(handle.store()?, Vec::new())?;
        Ok(Self { inner: Mutex::new(QueueState { handle, sub }) })
    }

    /// Appends `value` to the tail of the queue.
    pub fn enqueue(&self, value: &[u8]) -> Result<Item> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let id = state.sub.enqueue(store, &opts, value)?;
        Ok(Item::new(id, None, value.to_vec()))
    }

    /// Removes and returns the item at the head of the queue.
    pub fn dequeue(&self) -> Result<Item> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        let (id, value) = state.sub.dequeue_front(store, &opts)?;
        Ok(Item::new(id, None, value))
    }

    /// Returns the item at the head of the queue without removing it.
    pub fn peek(&self) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.sub.peek_front(state.handle.store()?)?;
        Ok(Item::new(id, None, value))
    }

    /// Returns the item `n` positions after the head (`n == 0` is the head).
    pub fn peek_by_offset(&self, n: u64) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.sub.peek_by_offset_front(state.handle.store()?, n)?;
        Ok(Item::new(id, None, value))
    }

    /// Returns the item with the given `id`, if it is still live.
    pub fn peek_by_id(&self, id: u64) -> Result<Item> {
        let state = self.inner.lock();
        let (id, value) = state.sub.peek_by_id(state.handle.store()?, id)?;
        Ok(Item::new(id, None, value))
    }

    /// Replaces the value stored under `item.id` with `new_value`. The id is
    /// preserved; `item.value` is updated to reflect the new bytes.
    pub fn update(&self, item: &mut Item, new_value: &[u8]) -> Result<()> {
        let mut state = self.inner.lock();
        let store = state.handle.store()?;
        let opts = state.handle.opts;
        state.sub.update(store, &opts, item.id, new_value)?;
        item.value = new_value.to_vec();
        Ok(())
    }

    /// Number of items currently enqueued.
    pub fn len(&self) -> u64 {
        self.inner.lock().sub.len()
    }

    /// `true` iff the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().sub.is_empty()
    }

    /// Flushes and closes the backing store, releasing the directory lock.
    /// The handle is unusable afterwards.
    pub fn close(&self) -> Result<()> {
        self.inner.lock().handle.close()
    }

    /// Closes the queue and removes its directory. Subsequent operations
    /// fail with [`Error::DbClosed`].
    pub fn drop_queue(&self) -> Result<()> {
        self.inner.lock().handle.drop_queue()
    }
}
