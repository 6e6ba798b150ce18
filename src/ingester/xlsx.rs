//! Spreadsheet source
//!
//! Layout of the exchange export, first worksheet:
//! rows 1-3 are headers, data starts at row 4.
//! Columns: A = time, B = category (keep only `ALL`), C = price, E = volume.

use super::{file_name, RowExtractor};
use crate::data::{RawTuple, RawValue};
use crate::error::{Result, SeriesError};
use crate::types::SourceKind;
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Fixed positions in the spreadsheet export
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpreadsheetLayout {
    /// Physical rows to skip before data
    pub header_rows: usize,
    pub time_col: usize,
    pub category_col: usize,
    pub price_col: usize,
    pub volume_col: usize,
    /// Only rows whose category matches this (trimmed, case-insensitive) are kept
    pub category: String,
}

impl Default for SpreadsheetLayout {
    fn default() -> Self {
        Self {
            header_rows: 3,
            time_col: 0,
            category_col: 1,
            price_col: 2,
            volume_col: 4,
            category: "ALL".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExtractor {
    layout: SpreadsheetLayout,
}

impl SpreadsheetExtractor {
    pub fn new(layout: SpreadsheetLayout) -> Self {
        Self { layout }
    }

    /// Pull rows out of a decoded sheet, indexed by physical row.
    ///
    /// Blank rows, rows of another category and rows without a volume are
    /// dropped; every data row still advances the ordinal.
    pub fn extract(&self, rows: &[Vec<RawValue>]) -> Vec<RawTuple> {
        let layout = &self.layout;
        let wanted = layout.category.trim().to_uppercase();

        rows.iter()
            .skip(layout.header_rows)
            .enumerate()
            .filter(|(_, cells)| !cells.iter().all(RawValue::is_blank))
            .filter_map(|(ordinal, cells)| {
                let cell = |col: usize| cells.get(col).cloned().unwrap_or(RawValue::Empty);

                let category = cell(layout.category_col)
                    .as_text()
                    .map(|s| s.trim().to_uppercase())
                    .unwrap_or_default();
                if category != wanted {
                    return None;
                }

                let row = RawTuple::new(
                    cell(layout.time_col),
                    cell(layout.price_col),
                    cell(layout.volume_col),
                    ordinal,
                )
                .with_category(category);
                row.has_usable_volume().then_some(row)
            })
            .collect()
    }

    /// Decode the first worksheet into physical rows.
    ///
    /// Leading empty rows and columns that the workbook omits are restored so
    /// positions match what a spreadsheet viewer shows.
    pub fn read_rows(&self, path: &Path) -> Result<Vec<Vec<RawValue>>> {
        let file = file_name(path);
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e| SeriesError::parse(SourceKind::Xlsx, &file, e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SeriesError::parse(SourceKind::Xlsx, &file, "workbook has no worksheets"))?
            .map_err(|e| SeriesError::parse(SourceKind::Xlsx, &file, e))?;

        let (first_row, first_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<RawValue>> = vec![Vec::new(); first_row];
        for cells in range.rows() {
            let mut row = vec![RawValue::Empty; first_col];
            row.extend(cells.iter().map(cell_value));
            rows.push(row);
        }
        Ok(rows)
    }
}

impl RowExtractor for SpreadsheetExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Xlsx
    }

    fn extract_file(&self, path: &Path) -> Result<Vec<RawTuple>> {
        let file = file_name(path);
        let rows = self.read_rows(path)?;

        if rows.is_empty() {
            return Err(SeriesError::no_rows(SourceKind::Xlsx, file, "no rows in workbook"));
        }
        if rows.len() <= self.layout.header_rows {
            return Err(SeriesError::no_rows(
                SourceKind::Xlsx,
                file,
                format!("no rows after row {}", self.layout.header_rows),
            ));
        }

        let tuples = self.extract(&rows);
        debug!(
            "Extracted {} {} rows from {} ({} physical rows)",
            tuples.len(),
            self.layout.category,
            file,
            rows.len()
        );

        if tuples.is_empty() {
            return Err(SeriesError::no_rows(
                SourceKind::Xlsx,
                file,
                format!(
                    "no {} category rows with a volume found after row {}",
                    self.layout.category,
                    self.layout.header_rows + 1
                ),
            ));
        }
        Ok(tuples)
    }
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Float(f) => RawValue::Number(*f),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Bool(b) => RawValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => RawValue::Text(clock_from_serial(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        _ => RawValue::Empty,
    }
}

/// `HH:MM` time of day of an Excel date/time serial, to the nearest minute
fn clock_from_serial(serial: f64) -> String {
    let minutes = (serial.fract().abs() * 1440.0).round() as u32 % 1440;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_from_serial() {
        assert_eq!(clock_from_serial(0.375), "09:00");
        assert_eq!(clock_from_serial(45292.5), "12:00");
        assert_eq!(clock_from_serial(0.999999), "00:00");
        assert_eq!(clock_from_serial(0.0), "00:00");
    }

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value(&Data::Empty), RawValue::Empty);
        assert_eq!(cell_value(&Data::Int(7)), RawValue::Number(7.0));
        assert_eq!(
            cell_value(&Data::String("ALL".into())),
            RawValue::Text("ALL".into())
        );
    }
}
