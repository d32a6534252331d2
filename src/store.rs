//! Store adapter.
//!
//! Wraps the backing ordered key-value engine (sled) behind a narrow trait so
//! the FIFO, LIFO, and priority cores never import `sled` directly. `sled`
//! already provides everything §4.1 asks of "the backing store": sorted byte
//! keys, ordered range iteration, atomic single-key writes, and an exclusive
//! lock held for the lifetime of the open `Db`.
//!
//! Lookups are expressed as explicit inclusive `[lo, hi]` byte bounds rather
//! than "starts with" prefix scans. A `starts_with` scan over an empty or
//! short prefix would also match the reserved kind-marker key (§4.2), which
//! is deliberately shorter than any item key; bounding by value instead of
//! by prefix keeps the marker out of every sub-queue's range by construction
//! (see `fifo::SubQueue::bounds_for`).
pub(crate) trait KvStore: Send {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Smallest key within the inclusive range `[lo, hi]`, if any.
    fn first_key_in_range(&self, lo: &[u8], hi: &[u8]) -> Result<Option<Vec<u8>>>;
    /// Largest key within the inclusive range `[lo, hi]`, if any.
    fn last_key_in_range(&self, lo: &[u8], hi: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Forward iteration over every key within the inclusive range `[lo, hi]`.
    fn iter_range(&self, lo: &[u8], hi: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    fn flush(&self) -> Result<()>;
}

use std::path::Path;

use crate::Result;

/// Concrete sled-backed store. One instance exclusively owns its directory
/// for as long as it is open; a second `SledKvStore::open` on the same path
/// fails because sled itself refuses to open a directory it cannot lock.
pub(crate) struct SledKvStore {
    db: sled::Db,
}

impl SledKvStore {
    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub(crate) fn destroy(path: impl AsRef<Path>) -> Result<()> {
        if path.as_ref().exists() {
            std::fs::remove_dir_all(path).map_err(sled::Error::Io)?;
        }
        Ok(())
    }
}

impl KvStore for SledKvStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|ivec| ivec.to_vec()))
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.db.remove(key)?;
        Ok(())
    }

    fn first_key_in_range(&self, lo: &[u8], hi: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.db.range(lo.to_vec()..=hi.to_vec()).next() {
            Some(res) => Ok(Some(res?.0.to_vec())),
            None => Ok(None),
        }
    }

    fn last_key_in_range(&self, lo: &[u8], hi: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.db.range(lo.to_vec()..=hi.to_vec()).next_back() {
            Some(res) => Ok(Some(res?.0.to_vec())),
            None => Ok(None),
        }
    }

    fn iter_range(&self, lo: &[u8], hi: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut out = Vec::new();
        for res in self.db.range(lo.to_vec()..=hi.to_vec()) {
            let (k, v) = res?;
            out.push((k.to_vec(), v.to_vec()));
        }
        Ok(out)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
