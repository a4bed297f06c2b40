//! Error types for the slotlru library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods on every container).
//! - [`TableFull`]: Returned when a [`SlotTable`](crate::ds::SlotTable) has no
//!   free or tombstoned slot left for a key that is not already present.
//!
//! Contract violations such as promoting a [`NodeId`](crate::ds::NodeId) that
//! belongs to another list are caller errors. They trip `debug_assert!`s in
//! debug builds and are not part of this taxonomy.
//!
//! ## Example Usage
//!
//! ```
//! use slotlru::ds::SlotTable;
//! use slotlru::error::TableFull;
//!
//! let mut table: SlotTable<u32, &str, 2> = SlotTable::new();
//! assert_eq!(table.insert(1, "one"), Ok(None));
//! assert_eq!(table.insert(2, "two"), Ok(None));
//!
//! // Overwriting an existing key always succeeds
//! assert_eq!(table.insert(1, "uno"), Ok(Some("one")));
//!
//! // A new key has nowhere to go
//! assert_eq!(table.insert(3, "three"), Err(TableFull));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal container invariants are violated.
///
/// Produced by `check_invariants` on
/// [`SlotTable`](crate::ds::SlotTable::check_invariants),
/// [`RecencyList`](crate::ds::RecencyList::check_invariants) and
/// [`BoundedCache`](crate::policy::bounded::BoundedCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// TableFull
// ---------------------------------------------------------------------------

/// Error returned when a slot table is at capacity and the key is absent.
///
/// This is the only recoverable failure in the library. The caller decides
/// whether to drop the entry, erase something else, or give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFull;

impl fmt::Display for TableFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("slot table is full")
    }
}

impl std::error::Error for TableFull {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
