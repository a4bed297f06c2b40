//! slotlru: a fixed-capacity, allocation-free LRU cache and its building blocks.
//!
//! - [`ds::SlotTable`]: open-addressing hash table over a `[_; N]` array.
//! - [`ds::RecencyList`]: index-linked MRU/LRU list over a `[_; N]` array.
//! - [`policy::BoundedCache`]: the two combined into an LRU cache.

pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
