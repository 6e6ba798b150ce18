//! Result storage
//!
//! Nothing is persisted; computed series live only in a short-TTL memo.

pub mod cache;

pub use cache::{CacheKey, CacheStats, Clock, ManualClock, NoopCache, SeriesCache, SystemClock, TtlCache};
