//! Half-hour slot labels and the time-label normalizer
//!
//! Any raw time representation is snapped onto one of the 48 `HH:MM`
//! half-hour slots of a trading day:
//! 1. a one or two digit integer is a 1-based slot index, clamped to the day
//! 2. an embedded `H:MM` / `HH:MM` is snapped to the nearest half hour
//! 3. a date-time string is converted to UTC and snapped the same way
//! 4. anything else falls back to the row ordinal

use super::row::RawValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const SLOTS_PER_DAY: usize = 48;

static RE_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{1,2}):([0-9]{2})(?:[^0-9A-Za-z_]|$)").unwrap());

/// One half-hour bucket, `00:00..=23:30`.
///
/// Ordering is chronological, which matches the lexicographic order of the
/// zero-padded labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {
    /// Slot at a zero-based index, wrapping past the end of the day
    pub fn from_index(index: usize) -> Self {
        Slot((index % SLOTS_PER_DAY) as u8)
    }

    /// Snap a clock time to its half-hour bucket.
    ///
    /// Hour is clamped to `0..=23`. Minutes `< 15` round down to `:00`,
    /// `15..45` to `:30`, and `>= 45` up to the next hour (wrapping at midnight).
    pub fn snapped(hour: u32, minute: u32) -> Self {
        let hour = hour.min(23) as usize;
        match minute {
            0..=14 => Slot::from_index(hour * 2),
            15..=44 => Slot::from_index(hour * 2 + 1),
            _ => Slot::from_index(((hour + 1) % 24) * 2),
        }
    }

    pub fn hour(&self) -> u8 {
        self.0 / 2
    }

    pub fn minute(&self) -> u8 {
        (self.0 % 2) * 30
    }

    /// Every slot of the day in order
    pub fn all() -> impl Iterator<Item = Slot> {
        (0..SLOTS_PER_DAY).map(Slot::from_index)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Map a raw time value to its slot. Never fails.
pub fn normalize(raw: &RawValue, ordinal: usize) -> Slot {
    slot_index(raw)
        .or_else(|| clock_time(raw))
        .or_else(|| date_time(raw))
        .unwrap_or_else(|| Slot::from_index(ordinal))
}

fn slot_index(raw: &RawValue) -> Option<Slot> {
    let index = match raw {
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse::<usize>().ok()?
        }
        RawValue::Number(n) if n.fract() == 0.0 && (0.0..=99.0).contains(n) => *n as usize,
        _ => return None,
    };

    // 1-based; 0 clamps to the first slot and anything past 48 to the last
    Some(Slot(index.saturating_sub(1).min(SLOTS_PER_DAY - 1) as u8))
}

fn clock_time(raw: &RawValue) -> Option<Slot> {
    let RawValue::Text(s) = raw else {
        return None;
    };
    let caps = RE_CLOCK.captures(s)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    Some(Slot::snapped(hour, minute))
}

fn date_time(raw: &RawValue) -> Option<Slot> {
    let RawValue::Text(s) = raw else {
        return None;
    };
    let s = s.trim();
    if let Some(time) = twelve_hour(s) {
        return Some(Slot::snapped(time.hour(), time.minute()));
    }
    let ts = parse_utc(s)?;
    Some(Slot::snapped(ts.hour(), ts.minute()))
}

/// `9:05pm`, `11:50AM`
fn twelve_hour(s: &str) -> Option<NaiveTime> {
    ["%I:%M%p", "%I:%M %p"]
        .into_iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Some(secs) = s.strip_prefix('@') {
        return DateTime::from_timestamp(secs.parse().ok()?, 0);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y%m%dT%H%M%SZ", "%Y%m%dT%H%M%S", "%Y%m%dT%H%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
