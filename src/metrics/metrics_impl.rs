use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::BoundedCacheMetricsSnapshot;
use crate::metrics::traits::{BoundedCacheMetricsReadRecorder, CoreMetricsRecorder, MetricsReset};

/// Counters owned by a [`BoundedCache`](crate::policy::BoundedCache).
///
/// Every counter is a [`MetricsCell`] so `reset_metrics` and the `&self` read
/// paths can update them without exclusive access.
#[derive(Debug, Default)]
pub struct BoundedCacheMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub set_calls: MetricsCell,
    pub set_new: MetricsCell,
    pub set_updates: MetricsCell,
    pub set_unchanged: MetricsCell,
    pub evicted_entries: MetricsCell,
    pub clear_calls: MetricsCell,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

impl BoundedCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the counters, attaching the caller's `len`/`capacity` gauges.
    pub fn snapshot_with(&self, len: usize, capacity: usize) -> BoundedCacheMetricsSnapshot {
        BoundedCacheMetricsSnapshot {
            get_calls: self.get_calls.get(),
            get_hits: self.get_hits.get(),
            get_misses: self.get_misses.get(),
            set_calls: self.set_calls.get(),
            set_new: self.set_new.get(),
            set_updates: self.set_updates.get(),
            set_unchanged: self.set_unchanged.get(),
            evicted_entries: self.evicted_entries.get(),
            clear_calls: self.clear_calls.get(),
            peek_calls: self.peek_calls.get(),
            peek_found: self.peek_found.get(),
            len,
            capacity,
        }
    }
}

impl CoreMetricsRecorder for BoundedCacheMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    fn record_get_miss(&mut self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }

    fn record_set_call(&mut self) {
        self.set_calls.incr();
    }

    fn record_set_new(&mut self) {
        self.set_new.incr();
    }

    fn record_set_update(&mut self) {
        self.set_updates.incr();
    }

    fn record_set_unchanged(&mut self) {
        self.set_unchanged.incr();
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries.incr();
    }

    fn record_clear(&mut self) {
        self.clear_calls.incr();
    }
}

impl BoundedCacheMetricsReadRecorder for &BoundedCacheMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}

impl MetricsReset for BoundedCacheMetrics {
    fn reset_metrics(&self) {
        for cell in [
            &self.get_calls,
            &self.get_hits,
            &self.get_misses,
            &self.set_calls,
            &self.set_new,
            &self.set_updates,
            &self.set_unchanged,
            &self.evicted_entries,
            &self.clear_calls,
            &self.peek_calls,
            &self.peek_found,
        ] {
            cell.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_and_misses_both_count_as_calls() {
        let mut metrics = BoundedCacheMetrics::new();
        metrics.record_get_hit();
        metrics.record_get_miss();
        metrics.record_get_miss();

        let snapshot = metrics.snapshot_with(0, 8);
        assert_eq!(snapshot.get_calls, 3);
        assert_eq!(snapshot.get_hits, 1);
        assert_eq!(snapshot.get_misses, 2);
        assert_eq!(snapshot.capacity, 8);
    }

    #[test]
    fn read_recorder_works_through_shared_reference() {
        let metrics = BoundedCacheMetrics::new();
        (&metrics).record_peek_call();
        (&metrics).record_peek_found();
        assert_eq!(metrics.peek_calls.get(), 1);
        assert_eq!(metrics.peek_found.get(), 1);
    }

    #[test]
    fn reset_zeroes_every_counter() {
        let mut metrics = BoundedCacheMetrics::new();
        metrics.record_set_call();
        metrics.record_set_new();
        metrics.record_evicted_entry();
        metrics.record_clear();
        (&metrics).record_peek_call();

        metrics.reset_metrics();
        assert_eq!(metrics.snapshot_with(3, 4), BoundedCacheMetricsSnapshot {
            len: 3,
            capacity: 4,
            ..Default::default()
        });
    }
}
