//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split into small traits so the cache only
//! writes counters and tests or benches only read them.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────┐     ┌──────────────────────────────────┐
//!   │     CoreMetricsRecorder     │     │ BoundedCacheMetricsReadRecorder  │
//!   │  get_hit/get_miss/set_*     │     │  peek_call/peek_found (&self)    │
//!   │  evicted_entry/clear        │     └────────────────┬─────────────────┘
//!   └──────────────┬──────────────┘                      │
//!                  └──────────────┬──────────────────────┘
//!                                 ▼
//!                     ┌──────────────────────┐
//!                     │ BoundedCacheMetrics  │
//!                     └──────────┬───────────┘
//!                                │
//!   Consumption:                 ▼
//!   ┌──────────────────────────────┐    ┌──────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │   MetricsReset   │
//!   └──────────────────────────────┘    └──────────────────┘
//! ```

/// Counters for the mutating cache paths.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_set_call(&mut self);
    fn record_set_new(&mut self);
    fn record_set_update(&mut self);
    fn record_set_unchanged(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Read-only counters for `&self` methods (uses interior mutability).
pub trait BoundedCacheMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Snapshot the current counters for tests and benches.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
