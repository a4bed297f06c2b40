/// Point-in-time copy of a [`BoundedCache`](crate::policy::BoundedCache)'s
/// counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoundedCacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub set_calls: u64,
    pub set_new: u64,
    pub set_updates: u64,
    pub set_unchanged: u64, // set() calls that returned true

    pub evicted_entries: u64,
    pub clear_calls: u64,

    pub peek_calls: u64,
    pub peek_found: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
}

impl BoundedCacheMetricsSnapshot {
    /// Fraction of `find` calls that hit, or `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_no_lookups() {
        let snapshot = BoundedCacheMetricsSnapshot::default();
        assert_eq!(snapshot.hit_rate(), 0.0);

        let snapshot = BoundedCacheMetricsSnapshot {
            get_calls: 4,
            get_hits: 3,
            get_misses: 1,
            ..Default::default()
        };
        assert!((snapshot.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
