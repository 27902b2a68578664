//! Common helper functions for candlestick shape tests
//!
//! Thresholds and per-bar predicates shared by the candlestick detectors, plus
//! the whole-series "any bar matches" scans.

use crate::series::{Bar, BarSeries};
use crate::OHLCVExt;

// ============================================================
// THRESHOLDS
// ============================================================

/// Doji: body / range above this ratio
pub const DOJI_RATIO: f64 = 0.1;
/// Long shadow: range > body * SHADOW_FACTOR
pub const SHADOW_FACTOR: f64 = 3.0;
/// Small body: both open and close within this fraction of the range from one end
pub const BODY_POSITION_RATIO: f64 = 0.33;

// ============================================================
// PER-BAR PREDICATES
// ============================================================

/// Body-to-range test used by the doji detector.
///
/// A zero-range bar never matches.
#[inline]
pub fn is_doji(bar: &Bar, ratio: f64) -> bool {
    bar.body_ratio().is_some_and(|r| r > ratio)
}

/// Range exceeds `factor` bodies
#[inline]
pub fn has_long_shadow(bar: &Bar, factor: f64) -> bool {
    bar.range() > factor * bar.body()
}

/// Open and close both sit within `position` of the range above the low
#[inline]
pub fn body_near_low(bar: &Bar, position: f64) -> bool {
    let limit = position * bar.range();
    bar.close - bar.low < limit && bar.open - bar.low < limit
}

/// Open and close both sit within `position` of the range below the high
#[inline]
pub fn body_near_high(bar: &Bar, position: f64) -> bool {
    let limit = position * bar.range();
    bar.high - bar.close < limit && bar.high - bar.open < limit
}

// ============================================================
// SERIES SCANS
// ============================================================

/// True if any present bar satisfies `pred`
pub fn any_bar(series: &BarSeries, pred: impl Fn(&Bar) -> bool) -> bool {
    series.slots().flatten().any(pred)
}

/// True if any consecutive present pair `(previous, current)` satisfies `pred`
pub fn any_pair(series: &BarSeries, pred: impl Fn(&Bar, &Bar) -> bool) -> bool {
    (1..series.len()).any(|i| match (series.get(i - 1), series.get(i)) {
        (Some(prev), Some(curr)) => pred(prev, curr),
        _ => false,
    })
}

/// True if any consecutive present triple (oldest first) satisfies `pred`
pub fn any_triple(series: &BarSeries, pred: impl Fn(&Bar, &Bar, &Bar) -> bool) -> bool {
    (2..series.len()).any(|i| match (series.get(i - 2), series.get(i - 1), series.get(i)) {
        (Some(first), Some(second), Some(third)) => pred(first, second, third),
        _ => false,
    })
}
