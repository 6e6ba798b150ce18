//! Source ingestion
//!
//! Locates the export for a date and pulls raw rows out of it:
//! - Spreadsheet drop (fixed header, positional columns, `ALL` category only)
//! - JSON drop (bare array or `{ "rows": [...] }`, case-insensitive keys)

pub mod json;
pub mod resolver;
pub mod xlsx;


pub use json::JsonExtractor;
pub use resolver::SourceResolver;
pub use xlsx::{SpreadsheetExtractor, SpreadsheetLayout};

use crate::data::RawTuple;
use crate::error::Result;
use crate::types::SourceKind;
use std::path::Path;

/// Row extraction for one physical source format
pub trait RowExtractor: Send + Sync {
    /// Source format handled
    fn kind(&self) -> SourceKind;

    /// Decode the file and return its rows that carry a usable volume.
    ///
    /// Ordinals count every data row, including the ones dropped.
    fn extract_file(&self, path: &Path) -> Result<Vec<RawTuple>>;
}

/// Base name used in results and error reports
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
