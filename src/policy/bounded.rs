//! Fixed-capacity LRU cache with no heap allocation.
//!
//! [`BoundedCache`] pairs a [`SlotTable`] index with a [`RecencyList`] that
//! owns the entries. The table maps each key to the [`NodeId`] of the node
//! holding its `(key, value)` pair; it never owns nodes.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────┐        ┌──────────────────────────────────┐
//!   │ table: SlotTable<K, NodeId>   │        │ list: RecencyList<(K, V)>        │
//!   │                               │        │                                  │
//!   │   "b" ──► NodeId(1) ──────────┼───────►│ head ─► (b, 2) ◄─► (a, 1) ◄─ tail│
//!   │   "a" ──► NodeId(0) ──────────┼───────►│          id 1        id 0        │
//!   └───────────────────────────────┘        └──────────────────────────────────┘
//! ```
//!
//! ## Operations
//! - `find`: table lookup, then promote the node to MRU.
//! - `set` on a hit: promote, then compare and possibly overwrite the value.
//! - `set` on a miss: the list adds `(key, value)`. At capacity it recycles
//!   the LRU node and its evictor erases the outgoing key from the table
//!   before the new key is indexed, so both containers always hold the same
//!   number of entries.
//!
//! Capacity `N` must be a power of two; other values fail to compile:
//!
//! ```compile_fail
//! use slotlru::policy::BoundedCache;
//!
//! let cache: BoundedCache<u32, u32, 3> = BoundedCache::new();
//! ```
//!
//! ## Example
//!
//! ```
//! use slotlru::policy::BoundedCache;
//!
//! let mut cache: BoundedCache<u32, &str, 2> = BoundedCache::new();
//! assert!(!cache.set(1, "one"));
//! assert!(!cache.set(2, "two"));
//!
//! // Reading 1 makes 2 the least recently used entry.
//! assert_eq!(cache.find(&1), Some(&"one"));
//! cache.set(3, "three");
//! assert_eq!(cache.find(&2), None);
//!
//! // Setting an unchanged value reports that nothing changed.
//! assert!(cache.set(3, "three"));
//! ```
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;
use tracing::trace;

use crate::ds::{NodeId, RecencyList, SlotTable};
use crate::error::InvariantError;
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::BoundedCacheMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::BoundedCacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    BoundedCacheMetricsReadRecorder, CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider,
};

/// A least-recently-used cache holding at most `N` entries.
///
/// Keys are stored twice (once in the index, once beside the value), hence
/// the `K: Clone` bound on insertion.
#[derive(Debug)]
pub struct BoundedCache<K, V, const N: usize, S = FxBuildHasher> {
    table: SlotTable<K, NodeId, N, S>,
    list: RecencyList<(K, V), N>,
    #[cfg(feature = "metrics")]
    metrics: BoundedCacheMetrics,
}

impl<K, V, const N: usize> BoundedCache<K, V, N, FxBuildHasher> {
    /// Creates an empty cache using the default Fx hasher.
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }
}

impl<K, V, const N: usize, S> BoundedCache<K, V, N, S> {
    /// Creates an empty cache that hashes keys with `hash_builder`.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: SlotTable::with_hasher(hash_builder),
            list: RecencyList::new(),
            #[cfg(feature = "metrics")]
            metrics: BoundedCacheMetrics::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Returns the least recently used entry without promoting it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|(key, value)| (key, value))
    }

    /// Returns the most recently used entry.
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.list.front().map(|(key, value)| (key, value))
    }

    /// Iterates entries from most to least recently used without promoting
    /// any of them.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + '_ {
        self.list.iter().map(|(key, value)| (key, value))
    }

    /// Removes every entry. Handles and references from before are invalid.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.table.clear();
        self.list.clear();
    }

    #[inline]
    fn debug_assert_consistent(&self) {
        debug_assert_eq!(
            self.table.len(),
            self.list.len(),
            "index and recency list disagree on entry count"
        );
    }
}

impl<K, V, const N: usize, S> BoundedCache<K, V, N, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns the value for `key`, promoting it to most recently used.
    pub fn find<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.promote(key)?;
        self.list.get(id).map(|(_, value)| value)
    }

    /// Mutable variant of [`find`](Self::find); also promotes the entry.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.promote(key)?;
        self.list.get_mut(id).map(|(_, value)| value)
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        let id = *self.table.get(key)?;
        let value = self.list.get(id).map(|(_, value)| value);

        #[cfg(feature = "metrics")]
        if value.is_some() {
            (&self.metrics).record_peek_found();
        }
        value
    }

    /// Returns `true` if `key` is cached. Does not change recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.table.contains_key(key)
    }

    /// Validates both containers and the index-to-node mapping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.table.check_invariants()?;
        self.list.check_invariants()?;
        if self.table.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} entries but recency list holds {}",
                self.table.len(),
                self.list.len()
            )));
        }
        for (key, id) in self.table.iter() {
            match self.list.get(*id) {
                Some((stored, _)) if stored == key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "node {} holds a different key than its index entry",
                        id.index()
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "index entry points at unclaimed node {}",
                        id.index()
                    )));
                },
            }
        }
        Ok(())
    }

    fn promote<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&id) = self.table.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            self.debug_assert_consistent();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.list.touch(id);
        self.debug_assert_consistent();
        Some(id)
    }
}

impl<K, V, const N: usize, S> BoundedCache<K, V, N, S>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
    S: BuildHasher,
{
    /// Caches `key → value` and promotes it to most recently used.
    ///
    /// Returns `true` only when `key` was already cached with an equal value,
    /// in which case nothing but recency changes. Returns `false` when the
    /// entry is new or its value was replaced. A new entry in a full cache
    /// evicts the least recently used one.
    pub fn set(&mut self, key: K, value: V) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_set_call();

        if let Some(&id) = self.table.get(&key) {
            self.list.touch(id);
            let Some((_, stored)) = self.list.get_mut(id) else {
                unreachable!("index entry points at unclaimed node {}", id.index());
            };
            let unchanged = *stored == value;
            if !unchanged {
                *stored = value;
            }

            #[cfg(feature = "metrics")]
            if unchanged {
                self.metrics.record_set_unchanged();
            } else {
                self.metrics.record_set_update();
            }

            self.debug_assert_consistent();
            return unchanged;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_set_new();

        let table = &mut self.table;
        #[cfg(feature = "metrics")]
        let metrics = &mut self.metrics;
        let id = self.list.add((key.clone(), value), |(old_key, _)| {
            if let Some(handle) = table.find(old_key) {
                table.erase(handle);
            }
            #[cfg(feature = "metrics")]
            metrics.record_evicted_entry();
            trace!(capacity = N, "evicting least recently used entry");
        });
        let (_, inserted) = self.table.insert_or_assign(key, id);
        debug_assert!(inserted, "index rejected a key after eviction freed a slot");

        self.debug_assert_consistent();
        false
    }
}

impl<K, V, const N: usize, S: Default> Default for BoundedCache<K, V, N, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, const N: usize, S> BoundedCache<K, V, N, S> {
    pub fn metrics_snapshot(&self) -> BoundedCacheMetricsSnapshot {
        self.metrics.snapshot_with(self.len(), N)
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<K, V, const N: usize, S> MetricsSnapshotProvider<BoundedCacheMetricsSnapshot>
    for BoundedCache<K, V, N, S>
{
    fn snapshot(&self) -> BoundedCacheMetricsSnapshot {
        self.metrics_snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_of<const N: usize>(keys: impl IntoIterator<Item = i32>) -> BoundedCache<i32, i32, N> {
        let mut cache = BoundedCache::new();
        for key in keys {
            cache.set(key, key * 10);
        }
        cache
    }

    fn keys_mru_to_lru<const N: usize>(cache: &BoundedCache<i32, i32, N>) -> Vec<i32> {
        cache.iter().map(|(key, _)| *key).collect()
    }

    // ==============================================
    // Concrete behavior
    // ==============================================

    #[test]
    fn capacity_four_scenario() {
        let mut cache: BoundedCache<i32, i32, 4> = BoundedCache::new();
        assert!(!cache.set(1, 10));
        assert!(!cache.set(2, 20));
        assert!(!cache.set(3, 30));
        assert!(!cache.set(4, 40));
        assert!(!cache.set(5, 50));

        assert_eq!(cache.peek_lru(), Some((&2, &20)));
        assert_eq!(cache.peek_mru(), Some((&5, &50)));

        // Unchanged sets still promote.
        assert!(cache.set(4, 40));
        assert!(cache.set(5, 50));
        assert_eq!(keys_mru_to_lru(&cache), vec![5, 4, 3, 2]);

        assert_eq!(cache.find(&1), None);
        assert_eq!(cache.find(&2), Some(&20));
        assert_eq!(cache.peek_mru(), Some((&2, &20)));
        assert_eq!(cache.find(&3), Some(&30));
        assert_eq!(cache.peek_lru(), Some((&4, &40)));
        assert_eq!(keys_mru_to_lru(&cache), vec![3, 2, 5, 4]);
        assert_eq!(cache.len(), 4);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn set_return_contract() {
        let mut cache: BoundedCache<&str, i32, 4> = BoundedCache::new();
        assert!(!cache.set("a", 1), "new key");
        assert!(cache.set("a", 1), "same value");
        assert!(!cache.set("a", 2), "changed value");
        assert_eq!(cache.peek(&"a"), Some(&2));
        assert!(cache.set("a", 2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction_removes_least_recently_set() {
        let mut cache = cache_of::<4>(1..=4);
        cache.set(5, 50);
        assert!(!cache.contains(&1));
        for key in 2..=5 {
            assert!(cache.contains(&key));
        }
        assert_eq!(keys_mru_to_lru(&cache), vec![5, 4, 3, 2]);
    }

    #[test]
    fn find_promotes_and_spares_entry_from_eviction() {
        let mut cache = cache_of::<4>(1..=4);
        assert_eq!(cache.find(&1), Some(&10));

        for key in 5..=7 {
            cache.set(key, key * 10);
        }
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(!cache.contains(&3));
        assert!(!cache.contains(&4));
        assert_eq!(keys_mru_to_lru(&cache), vec![7, 6, 5, 1]);
    }

    #[test]
    fn set_hit_promotes_even_when_unchanged() {
        let mut cache = cache_of::<4>(1..=4);
        assert!(cache.set(1, 10));
        cache.set(5, 50);
        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
    }

    #[test]
    fn peek_and_contains_leave_recency_alone() {
        let mut cache = cache_of::<4>(1..=4);
        assert_eq!(cache.peek(&1), Some(&10));
        assert!(cache.contains(&1));
        assert_eq!(cache.peek(&9), None);

        cache.set(5, 50);
        assert!(!cache.contains(&1));
    }

    #[test]
    fn find_mut_updates_in_place() {
        let mut cache = cache_of::<4>(1..=3);
        if let Some(value) = cache.find_mut(&1) {
            *value += 1;
        }
        assert_eq!(cache.peek_mru(), Some((&1, &11)));
        assert_eq!(cache.peek_lru(), Some((&2, &20)));
        assert_eq!(cache.find_mut(&42), None);
    }

    #[test]
    fn capacity_one_replaces_every_time() {
        let mut cache: BoundedCache<i32, i32, 1> = BoundedCache::new();
        assert!(!cache.set(1, 1));
        assert!(!cache.set(2, 2));
        assert_eq!(cache.find(&1), None);
        assert_eq!(cache.find(&2), Some(&2));
        assert!(cache.set(2, 2));
        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn string_keys_look_up_by_str() {
        let mut cache: BoundedCache<String, String, 2> = BoundedCache::new();
        cache.set("alpha".to_string(), "a".to_string());
        cache.set("beta".to_string(), "b".to_string());
        assert_eq!(cache.find("alpha").map(String::as_str), Some("a"));

        cache.set("gamma".to_string(), "c".to_string());
        assert!(!cache.contains("beta"));
        assert!(cache.contains("alpha"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn clear_then_reuse() {
        let mut cache = cache_of::<4>(1..=4);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.find(&1), None);
        assert_eq!(cache.peek_lru(), None);

        cache.set(8, 80);
        assert_eq!(cache.find(&8), Some(&80));
        assert_eq!(cache.capacity(), 4);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn churn_keeps_index_and_list_consistent() {
        let mut cache: BoundedCache<u32, u32, 8> = BoundedCache::new();
        for i in 0..500u32 {
            let key = i.wrapping_mul(2_654_435_761) % 23;
            if i % 3 == 0 {
                cache.find(&key);
            } else {
                cache.set(key, i);
            }
            assert!(cache.len() <= 8);
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn iter_reverses_to_lru_order() {
        let cache = cache_of::<4>(1..=3);
        let lru_first: Vec<_> = cache.iter().rev().map(|(key, _)| *key).collect();
        assert_eq!(lru_first, vec![1, 2, 3]);
        assert_eq!(cache.iter().len(), 3);
    }

    // ==============================================
    // Metrics
    // ==============================================

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn counts_hits_misses_and_evictions() {
            let mut cache: BoundedCache<i32, i32, 2> = BoundedCache::new();
            cache.set(1, 10);
            cache.set(2, 20);
            cache.set(2, 20);
            cache.set(2, 21);
            cache.set(3, 30);
            cache.find(&3);
            cache.find(&1);
            cache.peek(&2);
            cache.peek(&9);

            let snapshot = cache.metrics_snapshot();
            assert_eq!(snapshot.set_calls, 5);
            assert_eq!(snapshot.set_new, 3);
            assert_eq!(snapshot.set_unchanged, 1);
            assert_eq!(snapshot.set_updates, 1);
            assert_eq!(snapshot.evicted_entries, 1);
            assert_eq!(snapshot.get_hits, 1);
            assert_eq!(snapshot.get_misses, 1);
            assert_eq!(snapshot.peek_calls, 2);
            assert_eq!(snapshot.peek_found, 1);
            assert_eq!(snapshot.len, 2);
            assert_eq!(snapshot.capacity, 2);
            assert!((snapshot.hit_rate() - 0.5).abs() < f64::EPSILON);
        }

        #[test]
        fn reset_keeps_gauges() {
            let mut cache: BoundedCache<i32, i32, 4> = BoundedCache::new();
            cache.set(1, 1);
            cache.clear();
            cache.set(2, 2);
            assert_eq!(cache.snapshot().clear_calls, 1);

            cache.reset_metrics();
            let snapshot = cache.metrics_snapshot();
            assert_eq!(snapshot.set_calls, 0);
            assert_eq!(snapshot.clear_calls, 0);
            assert_eq!(snapshot.len, 1);
        }
    }
}
