//! Type guard.
//!
//! Every directory records, on first use, which container discipline it was
//! opened under. Reopening it under a different discipline fails rather than
//! silently reinterpreting the bytes.

use crate::store::KvStore;
use crate::{Error, Result};

/// Reserved key for the kind marker: the empty byte string. Every item key
/// produced by the FIFO core (8 bytes) or the priority core (9 bytes) is
/// non-empty, and the empty string sorts strictly before every non-empty
/// key, so the marker can never land inside a sub-queue's `[lo, hi]` scan
/// range (see `store::KvStore`'s doc comment) regardless of priority byte or
/// id value.
pub(crate) const KIND_MARKER_KEY: [u8; 0] = [];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    FifoStack = 1,
    Priority = 2,
}

impl Kind {
    fn from_byte(b: u8) -> Option<Kind> {
        match b {
            1 => Some(Kind::FifoStack),
            2 => Some(Kind::Priority),
            _ => None,
        }
    }
}

/// Reads the marker if present; if absent, writes `declared` and proceeds.
/// Fails with `Error::IncompatibleType` if a different kind is recorded.
pub(crate) fn check_or_record(store: &dyn KvStore, declared: Kind) -> Result<()> {
    match store.get(&KIND_MARKER_KEY)? {
        Some(bytes) => {
            let recorded = bytes
                .first()
                .copied()
                .and_then(Kind::from_byte)
                .ok_or(Error::IncompatibleType)?;
            if recorded == declared {
                Ok(())
            } else {
                Err(Error::IncompatibleType)
            }
        }
        None => {
            store.put(&KIND_MARKER_KEY, &[declared as u8])?;
            Ok(())
        }
    }
}
