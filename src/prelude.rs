pub use crate::ds::{NodeId, RecencyList, SlotHandle, SlotState, SlotTable};
pub use crate::error::{InvariantError, TableFull};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::BoundedCacheMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};
pub use crate::policy::BoundedCache;
