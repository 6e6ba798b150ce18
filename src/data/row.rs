//! Raw row values as pulled out of a source, before normalization

use rust_decimal::Decimal;
use serde_json::Value;
use std::borrow::Cow;
use std::str::FromStr;
use tracing::warn;

/// A single untyped cell or field
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
}

impl RawValue {
    /// Empty cell or empty string. Whitespace-only text is not blank.
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Empty => true,
            RawValue::Text(s) => s.is_empty(),
            RawValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            RawValue::Number(n) => Some(Cow::Owned(n.to_string())),
        }
    }

    /// Tolerant numeric read; `None` for empty or non-numeric values.
    ///
    /// Numbers beyond the `Decimal` range (about 7.9e28) are also `None`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) => parse_number(s),
            RawValue::Number(n) => {
                let value = parse_number(&n.to_string());
                if value.is_none() && n.is_finite() {
                    warn!("Number {} is outside the decimal range, treating it as absent", n);
                }
                value
            }
        }
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => RawValue::Text(s.clone()),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Empty),
            // null, booleans and nested structures carry no usable scalar
            _ => RawValue::Empty,
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// Parse a number written with either `.` or `,` as decimal separator.
///
/// Accepts surrounding whitespace, a sign and scientific notation. Empty or
/// non-numeric input yields `None`, never zero.
pub fn parse_number(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalized = s.replace(',', ".");
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// One row pulled out of a source.
///
/// `ordinal` is the zero-based position of the row among the source's data
/// rows and stands in for the time when the time value is unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTuple {
    pub time: RawValue,
    pub category: Option<String>,
    pub price: RawValue,
    pub volume: RawValue,
    pub ordinal: usize,
}

impl RawTuple {
    pub fn new(time: RawValue, price: RawValue, volume: RawValue, ordinal: usize) -> Self {
        Self {
            time,
            category: None,
            price,
            volume,
            ordinal,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price.to_decimal()
    }

    pub fn volume(&self) -> Option<Decimal> {
        self.volume.to_decimal()
    }

    /// Rows without a non-negative volume never reach a slot
    pub fn has_usable_volume(&self) -> bool {
        matches!(self.volume(), Some(v) if v >= Decimal::ZERO)
    }
}
