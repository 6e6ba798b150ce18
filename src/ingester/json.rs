//! JSON source
//!
//! Accepts `[ { "Time": .., "Price": .., "Volume": .. }, ... ]` or the same
//! array under a top-level `rows` key. Field names are matched after
//! trimming, ignoring case.

use super::{file_name, RowExtractor};
use crate::data::{RawTuple, RawValue};
use crate::error::{Result, SeriesError};
use crate::types::SourceKind;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl JsonExtractor {
    /// Row list of a decoded payload, `None` if it has no row array
    pub fn rows(payload: &Value) -> Option<&[Value]> {
        match payload {
            Value::Array(rows) => Some(rows.as_slice()),
            Value::Object(map) => map.get("rows").and_then(Value::as_array).map(Vec::as_slice),
            _ => None,
        }
    }

    /// Pull rows that carry a volume. Non-object entries are skipped but
    /// still advance the ordinal.
    pub fn extract(&self, rows: &[Value]) -> Vec<RawTuple> {
        rows.iter()
            .enumerate()
            .filter_map(|(ordinal, row)| {
                let fields = row.as_object()?;
                let row = RawTuple::new(
                    field(fields, "time"),
                    field(fields, "price"),
                    field(fields, "volume"),
                    ordinal,
                );
                row.has_usable_volume().then_some(row)
            })
            .collect()
    }
}

impl RowExtractor for JsonExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Json
    }

    fn extract_file(&self, path: &Path) -> Result<Vec<RawTuple>> {
        let file = file_name(path);
        let raw = fs::read_to_string(path)
            .map_err(|e| SeriesError::parse(SourceKind::Json, &file, format!("failed to read: {}", e)))?;

        let payload: Value = serde_json::from_str(raw.trim_start_matches('\u{feff}'))
            .map_err(|e| SeriesError::parse(SourceKind::Json, &file, e))?;

        let rows = Self::rows(&payload).ok_or_else(|| {
            SeriesError::parse(
                SourceKind::Json,
                &file,
                "expected an array of rows or an object with a \"rows\" array",
            )
        })?;
        if rows.is_empty() {
            return Err(SeriesError::no_rows(SourceKind::Json, file, "JSON contains no rows"));
        }

        let tuples = self.extract(rows);
        debug!("Extracted {} of {} rows from {}", tuples.len(), rows.len(), file);
        Ok(tuples)
    }
}

/// Field by case-insensitive, whitespace-trimmed name. Keys are kept in
/// document order, so the last spelling in the row wins.
fn field(fields: &Map<String, Value>, name: &str) -> RawValue {
    fields
        .iter()
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| RawValue::from(value))
        .last()
        .unwrap_or(RawValue::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_lookup_ignores_case_and_whitespace() {
        let row = json!({ " TIME ": "09:00", "price": "12,5", "Volume": 3 });
        let fields = row.as_object().unwrap();
        assert_eq!(field(fields, "time"), RawValue::Text("09:00".into()));
        assert_eq!(field(fields, "price"), RawValue::Text("12,5".into()));
        assert_eq!(field(fields, "volume"), RawValue::Number(3.0));
        assert_eq!(field(fields, "category"), RawValue::Empty);
    }

    #[test]
    fn test_field_lookup_last_spelling_in_document_wins() {
        let row: Value = serde_json::from_str(r#"{"volume": 1, "Volume": 2}"#).unwrap();
        assert_eq!(field(row.as_object().unwrap(), "volume"), RawValue::Number(2.0));

        let row: Value = serde_json::from_str(r#"{"VOLUME": 5, " volume": 4}"#).unwrap();
        assert_eq!(field(row.as_object().unwrap(), "volume"), RawValue::Number(4.0));
    }

    #[test]
    fn test_rows_shapes() {
        assert_eq!(JsonExtractor::rows(&json!([{}, {}])).map(|r| r.len()), Some(2));
        assert_eq!(JsonExtractor::rows(&json!({ "rows": [{}] })).map(|r| r.len()), Some(1));
        assert!(JsonExtractor::rows(&json!({ "rows": "nope" })).is_none());
        assert!(JsonExtractor::rows(&json!({ "data": [] })).is_none());
        assert!(JsonExtractor::rows(&json!(42)).is_none());
    }
}
