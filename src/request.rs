//! Inbound request validation
//!
//! Query parameters arrive as loose strings; the service only ever sees a
//! validated `SeriesRequest`.

use crate::error::{Result, SeriesError};
use crate::types::SourceMode;
use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesRequest {
    pub date: NaiveDate,
    pub mode: SourceMode,
}

impl SeriesRequest {
    /// Validate raw `date` / `source` parameters.
    ///
    /// A missing date means today (UTC); a missing source means `default_mode`.
    pub fn from_params(
        date: Option<&str>,
        source: Option<&str>,
        default_mode: SourceMode,
    ) -> Result<Self> {
        let date = match date.map(str::trim).filter(|s| !s.is_empty()) {
            None => Utc::now().date_naive(),
            Some(s) => parse_date(s)?,
        };

        let mode = match source.map(str::trim).filter(|s| !s.is_empty()) {
            None => default_mode,
            Some(s) => s.parse::<SourceMode>().map_err(SeriesError::InvalidRequest)?,
        };

        Ok(Self { date, mode })
    }
}

/// Strict `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if !RE_DATE.is_match(s) {
        return Err(SeriesError::InvalidRequest(format!(
            "date '{}' is not in YYYY-MM-DD form",
            s
        )));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SeriesError::InvalidRequest(format!("date '{}': {}", s, e)))
}
