//! DAM Market Series Loader
//!
//! Turns daily day-ahead electricity market exports (a spreadsheet drop and
//! a JSON drop) into one canonical series of half-hour slots with
//! volume-weighted prices.

pub mod config;
pub mod data;
pub mod error;
pub mod ingester;
pub mod request;
pub mod service;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{Result, SeriesError};
pub use service::SeriesService;
pub use types::{SeriesPoint, SeriesResult, SourceKind, SourceMode};
