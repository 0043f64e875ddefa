#![forbid(unsafe_code)]

//! Opaque registration identities.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTRY: AtomicU64 = AtomicU64::new(1);

/// Unique token minted for every registration.
///
/// Ids are never reused within a process. Because they are drawn from a
/// monotonic counter, comparing two ids from the same tracker compares their
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ENTRY.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging.
    #[inline]
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = EntryId::next();
        let b = EntryId::next();
        let c = EntryId::next();
        assert!(a < b);
        assert!(b < c);
        assert_ne!(a, c);
    }

    #[test]
    fn display_includes_raw_value() {
        let id = EntryId::next();
        assert_eq!(id.to_string(), format!("entry#{}", id.get()));
    }
}
