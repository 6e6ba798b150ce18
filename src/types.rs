//! Core types shared across the loader

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical source a series was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Xlsx,
    Json,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Xlsx => write!(f, "xlsx"),
            SourceKind::Json => write!(f, "json"),
        }
    }
}

/// Source selection requested by a caller.
///
/// `Auto` prefers the spreadsheet drop and only falls back to JSON when the
/// spreadsheet is structurally absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SourceMode {
    Xlsx,
    Json,
    Auto,
}

impl SourceMode {
    /// The single source this mode pins, if any
    pub fn kind(&self) -> Option<SourceKind> {
        match self {
            SourceMode::Xlsx => Some(SourceKind::Xlsx),
            SourceMode::Json => Some(SourceKind::Json),
            SourceMode::Auto => None,
        }
    }
}

impl Default for SourceMode {
    fn default() -> Self {
        SourceMode::Auto
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Xlsx => write!(f, "xlsx"),
            SourceMode::Json => write!(f, "json"),
            SourceMode::Auto => write!(f, "auto"),
        }
    }
}

impl From<SourceKind> for SourceMode {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Xlsx => SourceMode::Xlsx,
            SourceKind::Json => SourceMode::Json,
        }
    }
}

impl FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(SourceMode::Xlsx),
            "json" => Ok(SourceMode::Json),
            "auto" => Ok(SourceMode::Auto),
            other => Err(format!("unknown source '{}' (expected auto, xlsx or json)", other)),
        }
    }
}

impl TryFrom<String> for SourceMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Canonical half-hour series for one trading day.
///
/// `labels`, `price` and `volume` are index-aligned; labels are unique and
/// strictly increasing. Serializes to the outbound shape
/// `{ date, labels, PRICE, VOLUME, source, file }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub date: NaiveDate,
    pub labels: Vec<String>,
    /// VWAP per slot, rounded to 2 decimals
    #[serde(rename = "PRICE")]
    pub price: Vec<f64>,
    /// Summed volume per slot, rounded to 2 decimals
    #[serde(rename = "VOLUME")]
    pub volume: Vec<f64>,
    #[serde(rename = "source")]
    pub source_kind: SourceKind,
    /// Base name of the file the series was read from
    #[serde(rename = "file")]
    pub source_file: String,
}

/// One slot of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint<'a> {
    pub label: &'a str,
    pub price: f64,
    pub volume: f64,
}

impl SeriesResult {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate slots in chronological order
    pub fn points(&self) -> impl Iterator<Item = SeriesPoint<'_>> + '_ {
        self.labels
            .iter()
            .zip(self.price.iter().zip(self.volume.iter()))
            .map(|(label, (&price, &volume))| SeriesPoint {
                label: label.as_str(),
                price,
                volume,
            })
    }

    /// Slot with the highest price (earliest on ties)
    pub fn high(&self) -> Option<SeriesPoint<'_>> {
        self.points().fold(None, |best, p| match best {
            Some(b) if b.price >= p.price => Some(b),
            _ => Some(p),
        })
    }

    /// Slot with the lowest price (earliest on ties)
    pub fn low(&self) -> Option<SeriesPoint<'_>> {
        self.points().fold(None, |best, p| match best {
            Some(b) if b.price <= p.price => Some(b),
            _ => Some(p),
        })
    }
}
