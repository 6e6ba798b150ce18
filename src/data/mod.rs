//! Series normalization
//!
//! - Raw row values and tolerant number parsing
//! - Half-hour slot labels and time normalization
//! - Volume-weighted slot aggregation

pub mod aggregator;
pub mod label;
pub mod row;

pub use aggregator::{aggregate, SlotAggregator, SourceMeta};
pub use label::{normalize, Slot, SLOTS_PER_DAY};
pub use row::{parse_number, RawTuple, RawValue};
