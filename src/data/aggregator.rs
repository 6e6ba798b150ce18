//! Half-hour slot aggregation
//!
//! Folds raw rows into per-slot accumulators and emits the canonical series
//! with a volume-weighted average price (VWAP) per slot.

use super::label::{normalize, Slot};
use super::row::RawTuple;
use crate::error::{Result, SeriesError};
use crate::types::{SeriesResult, SourceKind};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Where an aggregated series came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    pub date: NaiveDate,
    pub kind: SourceKind,
    /// Base name of the source file
    pub file: String,
}

/// Running sums for one slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SlotAccumulator {
    volume_sum: Decimal,
    price_volume_sum: Decimal,
}

impl SlotAccumulator {
    /// Accumulator after adding one contribution, `None` on overflow
    fn with(&self, price: Option<Decimal>, volume: Decimal) -> Option<Self> {
        let price_volume_sum = match price {
            Some(p) => self.price_volume_sum.checked_add(p.checked_mul(volume)?)?,
            None => self.price_volume_sum,
        };
        Some(Self {
            volume_sum: self.volume_sum.checked_add(volume)?,
            price_volume_sum,
        })
    }

    fn vwap(&self) -> Decimal {
        if self.volume_sum > Decimal::ZERO {
            self.price_volume_sum / self.volume_sum
        } else {
            Decimal::ZERO
        }
    }
}

/// Slot aggregator for a single extraction pass
#[derive(Debug, Default)]
pub struct SlotAggregator {
    slots: BTreeMap<Slot, SlotAccumulator>,
    rows_used: usize,
    rows_skipped: usize,
}

impl SlotAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row. Returns whether it contributed to a slot.
    ///
    /// Rows without a usable volume never create a slot. A missing price
    /// still counts the volume but adds nothing to the weighted sum.
    pub fn push(&mut self, row: &RawTuple) -> bool {
        let Some(volume) = row.volume().filter(|v| *v >= Decimal::ZERO) else {
            self.rows_skipped += 1;
            return false;
        };
        let price = row.price();
        let slot = normalize(&row.time, row.ordinal);

        let current = self.slots.get(&slot).copied().unwrap_or_default();
        match current.with(price, volume) {
            Some(next) => {
                self.slots.insert(slot, next);
                self.rows_used += 1;
                true
            }
            None => {
                warn!(
                    "Dropping row {} for slot {}: price {:?} x volume {} overflows",
                    row.ordinal, slot, price, volume
                );
                self.rows_skipped += 1;
                false
            }
        }
    }

    pub fn extend<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a RawTuple>,
    {
        for row in rows {
            self.push(row);
        }
    }

    /// Emit the ordered series, failing with `NoUsableRows` if no slot was filled
    pub fn finish(self, meta: SourceMeta) -> Result<SeriesResult> {
        if self.slots.is_empty() {
            return Err(SeriesError::no_rows(
                meta.kind,
                meta.file,
                "no rows with a usable volume",
            ));
        }

        debug!(
            "Aggregated {} rows into {} slots ({} skipped) from {}",
            self.rows_used,
            self.slots.len(),
            self.rows_skipped,
            meta.file
        );

        let mut labels = Vec::with_capacity(self.slots.len());
        let mut price = Vec::with_capacity(self.slots.len());
        let mut volume = Vec::with_capacity(self.slots.len());

        for (slot, acc) in &self.slots {
            labels.push(slot.to_string());
            volume.push(round2(acc.volume_sum));
            price.push(round2(acc.vwap()));
        }

        Ok(SeriesResult {
            date: meta.date,
            labels,
            price,
            volume,
            source_kind: meta.kind,
            source_file: meta.file,
        })
    }
}

/// Aggregate a full set of rows in one go
pub fn aggregate(rows: &[RawTuple], meta: SourceMeta) -> Result<SeriesResult> {
    let mut aggregator = SlotAggregator::new();
    aggregator.extend(rows);
    aggregator.finish(meta)
}

fn round2(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::RawValue;
    use rust_decimal_macros::dec;

    fn meta() -> SourceMeta {
        SourceMeta {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            kind: SourceKind::Json,
            file: "20240101.json".to_string(),
        }
    }

    fn row(time: &str, price: RawValue, volume: RawValue, ordinal: usize) -> RawTuple {
        RawTuple::new(time.into(), price, volume, ordinal)
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        let rows = vec![
            row("10:00", 100.0.into(), 2.0.into(), 0),
            row("10:00", 200.0.into(), 1.0.into(), 1),
        ];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.labels, vec!["10:00"]);
        assert_eq!(series.volume, vec![3.0]);
        assert_eq!(series.price, vec![133.33]);
    }

    #[test]
    fn test_zero_volume_slot_has_zero_price() {
        let rows = vec![
            row("10:00", 100.0.into(), 0.0.into(), 0),
            row("10:00", 250.0.into(), "0,0".into(), 1),
        ];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.volume, vec![0.0]);
        assert_eq!(series.price, vec![0.0]);
    }

    #[test]
    fn test_absent_volume_never_creates_slot() {
        let rows = vec![
            row("10:00", 100.0.into(), 5.0.into(), 0),
            row("11:00", 999.0.into(), RawValue::Empty, 1),
            row("11:30", 999.0.into(), "n/a".into(), 2),
            row("10:00", 999.0.into(), "".into(), 3),
        ];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.labels, vec!["10:00"]);
        assert_eq!(series.price, vec![100.0]);
        assert_eq!(series.volume, vec![5.0]);
    }

    #[test]
    fn test_absent_price_still_counts_volume() {
        let rows = vec![
            row("08:00", 60.0.into(), 1.0.into(), 0),
            row("08:10", RawValue::Empty, 1.0.into(), 1),
        ];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.volume, vec![2.0]);
        // 60*1 / 2
        assert_eq!(series.price, vec![30.0]);
    }

    #[test]
    fn test_negative_volume_dropped() {
        let rows = vec![
            row("08:00", 60.0.into(), (-4.0).into(), 0),
            row("08:30", 70.0.into(), 4.0.into(), 1),
        ];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.labels, vec!["08:30"]);
    }

    #[test]
    fn test_labels_sorted_and_unique() {
        let rows = vec![
            row("23:30", 1.0.into(), 1.0.into(), 0),
            row("00:00", 2.0.into(), 1.0.into(), 1),
            row("12:10", 3.0.into(), 1.0.into(), 2),
            row("00:05", 4.0.into(), 1.0.into(), 3),
        ];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.labels, vec!["00:00", "12:00", "23:30"]);
        assert_eq!(series.price, vec![3.0, 3.0, 1.0]);
        assert_eq!(series.len(), series.price.len());
        assert_eq!(series.len(), series.volume.len());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let rows = vec![row("10:00", "10.005".into(), "1.125".into(), 0)];

        let series = aggregate(&rows, meta()).unwrap();
        assert_eq!(series.price, vec![10.01]);
        assert_eq!(series.volume, vec![1.13]);
    }

    #[test]
    fn test_empty_input_fails_with_no_usable_rows() {
        let rows = vec![row("10:00", 100.0.into(), RawValue::Empty, 0)];

        let err = aggregate(&rows, meta()).unwrap_err();
        assert!(matches!(err, SeriesError::NoUsableRows { .. }));
        assert_eq!(err.file(), Some("20240101.json"));
    }

    #[test]
    fn test_overflowing_row_is_skipped() {
        let mut aggregator = SlotAggregator::new();
        let huge = RawValue::Text(Decimal::MAX.to_string());
        assert!(aggregator.push(&row("10:00", 100.0.into(), 1.0.into(), 0)));
        assert!(!aggregator.push(&row("10:00", huge.clone(), huge, 1)));

        let series = aggregator.finish(meta()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.price, vec![100.0]);
        assert_eq!(series.volume, vec![1.0]);
    }

    #[test]
    fn test_accumulator_sums() {
        let acc = SlotAccumulator::default()
            .with(Some(dec!(100)), dec!(2))
            .and_then(|a| a.with(None, dec!(2)))
            .unwrap();
        assert_eq!(acc.volume_sum, dec!(4));
        assert_eq!(acc.price_volume_sum, dec!(200));
        assert_eq!(acc.vwap(), dec!(50));
    }
}
