pub mod recency_list;
pub mod slot_table;

pub use recency_list::{NodeId, RecencyList};
pub use slot_table::{SlotHandle, SlotState, SlotTable};
