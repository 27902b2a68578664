//! Bar data model
//!
//! A [`BarSeries`] is built once from raw exchange rows ([`RawBar`]) or typed
//! [`Bar`]s and is read-only afterwards. Slots whose fields cannot be coerced
//! or that break the OHLC invariant are kept as *missing* so that indices stay
//! aligned with the caller's timestamps.
//!
//! [`IndicatorSeries`] is the time-aligned output of every indicator.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{OHLCVExt, Result, SignalError, OHLCV};

// ============================================================
// BAR
// ============================================================

/// One well-formed OHLCV observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }
}

// ============================================================
// RAW INPUT
// ============================================================

/// A field as delivered by a market data feed: a JSON number or a numeric string
///
/// `null` (how pandas-style feeds write NaN) and booleans deserialize as
/// [`RawValue::Missing`] and [`RawValue::Flag`] so that one bad field costs a
/// slot rather than the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Missing,
}

impl RawValue {
    /// Coerce to a finite number, `None` if the value is not numeric
    pub fn coerce(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Flag(_) | RawValue::Missing => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Untyped bar row prior to ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: i64,
    pub open: RawValue,
    pub high: RawValue,
    pub low: RawValue,
    pub close: RawValue,
    pub volume: RawValue,
}

impl RawBar {
    pub fn new(
        timestamp: i64,
        open: impl Into<RawValue>,
        high: impl Into<RawValue>,
        low: impl Into<RawValue>,
        close: impl Into<RawValue>,
        volume: impl Into<RawValue>,
    ) -> Self {
        Self {
            timestamp,
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume: volume.into(),
        }
    }

    /// Coerce every field, failing with the name of the first bad one
    fn coerce(&self) -> std::result::Result<Bar, &'static str> {
        let field = |value: &RawValue, name: &'static str| value.coerce().ok_or(name);
        Ok(Bar {
            timestamp: self.timestamp,
            open: field(&self.open, "non-numeric open")?,
            high: field(&self.high, "non-numeric high")?,
            low: field(&self.low, "non-numeric low")?,
            close: field(&self.close, "non-numeric close")?,
            volume: field(&self.volume, "non-numeric volume")?,
        })
    }
}

// ============================================================
// BAR SERIES
// ============================================================

/// Ordered, immutable sequence of bars, oldest first
///
/// Malformed rows occupy a slot but read back as `None` from [`BarSeries::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    timestamps: Vec<i64>,
    bars: Vec<Option<Bar>>,
}

impl BarSeries {
    /// Ingest raw rows, coercing malformed ones to missing slots
    pub fn ingest(rows: &[RawBar]) -> Result<Self> {
        let mut series = Self::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let bar = match row.coerce() {
                Ok(bar) => series.checked(bar, index),
                Err(reason) => {
                    warn!(index, reason, "coercing malformed bar to missing");
                    None
                }
            };
            series.push_slot(index, row.timestamp, bar)?;
        }
        Ok(series)
    }

    /// Build from typed bars, coercing invariant violations to missing slots
    pub fn from_bars(bars: impl IntoIterator<Item = Bar>) -> Result<Self> {
        let mut series = Self::default();
        for (index, bar) in bars.into_iter().enumerate() {
            let slot = series.checked(bar, index);
            series.push_slot(index, bar.timestamp, slot)?;
        }
        Ok(series)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            bars: Vec::with_capacity(capacity),
        }
    }

    fn checked(&self, bar: Bar, index: usize) -> Option<Bar> {
        match bar.validate(index) {
            Ok(()) => Some(bar),
            Err(error) => {
                warn!(%error, "coercing malformed bar to missing");
                None
            }
        }
    }

    fn push_slot(&mut self, index: usize, timestamp: i64, bar: Option<Bar>) -> Result<()> {
        if let Some(&previous) = self.timestamps.last() {
            if timestamp <= previous {
                return Err(SignalError::NonMonotonicTimestamp {
                    index,
                    previous,
                    current: timestamp,
                });
            }
        }
        self.timestamps.push(timestamp);
        self.bars.push(bar);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bar at `index`, `None` when out of bounds or missing
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index).and_then(Option::as_ref)
    }

    #[inline]
    pub fn timestamp(&self, index: usize) -> Option<i64> {
        self.timestamps.get(index).copied()
    }

    /// Number of slots holding a well-formed bar
    pub fn present(&self) -> usize {
        self.bars.iter().filter(|b| b.is_some()).count()
    }

    /// Iterate over all slots in order
    pub fn slots(&self) -> impl ExactSizeIterator<Item = Option<&Bar>> + '_ {
        self.bars.iter().map(Option::as_ref)
    }

    #[inline]
    pub fn close(&self, index: usize) -> Option<f64> {
        self.get(index).map(|b| b.close)
    }

    /// Close of the most recent slot, `None` if that slot is missing
    pub fn latest_close(&self) -> Option<f64> {
        self.len().checked_sub(1).and_then(|i| self.close(i))
    }

    /// All bars in `[start, end)` if every slot is present
    pub fn window(&self, start: usize, end: usize) -> Option<Vec<&Bar>> {
        self.bars.get(start..end)?.iter().map(Option::as_ref).collect()
    }
}

// ============================================================
// INDICATOR SERIES
// ============================================================

/// Named indicator output aligned with a [`BarSeries`]
///
/// Only indices `start..start + len()` are stored; earlier entries are the
/// indicator's warm-up and are absent rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    name: &'static str,
    start: usize,
    values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn new(name: &'static str, start: usize, values: Vec<Option<f64>>) -> Self {
        Self {
            name,
            start,
            values,
        }
    }

    /// An output with no stored entries
    pub fn empty(name: &'static str) -> Self {
        Self::new(name, 0, Vec::new())
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bar index of the first stored entry
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a bar index of the source series
    pub fn get(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(self.start)
            .and_then(|offset| self.values.get(offset).copied().flatten())
    }

    #[inline]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// `(bar index, value)` pairs over the stored range
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        self.values.iter().enumerate().map(move |(offset, v)| (self.start + offset, *v))
    }

    /// Value at the last stored index
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// Most recent defined value
    pub fn latest_defined(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    /// Bar index one past the last stored entry
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.values.len()
    }
}

// ============================================================
// TESTS
// ============================================================
