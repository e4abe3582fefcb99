//! Locally unique socket identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_IDENTIFIER: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier assigned to a socket at construction.
///
/// Unique within the process and stable for the life of the owning object,
/// including after it has been stopped, so it can be used as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(u64);

impl Identifier {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        // Relaxed ordering is sufficient for a simple counter
        Self(NEXT_IDENTIFIER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identifiers_are_unique() {
        let ids: HashSet<Identifier> = (0..1000).map(|_| Identifier::next()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_identifiers_increase() {
        let first = Identifier::next();
        let second = Identifier::next();
        assert!(second > first);
    }
}
