//! Multi-bar chart pattern classifiers
//!
//! These are positional shape tests over a short window, not swing-point
//! detection: head and shoulders reads the first three bars, triangles read
//! the last five, double top/bottom count three-bar extrema across the series.

use serde::Serialize;

use super::{DoubleBottom, DoubleTop, HeadAndShoulders, Triangle};
use crate::series::{Bar, BarSeries};
use crate::{PatternDetector, PatternId};

impl_with_defaults!(
    HeadAndShouldersDetector,
    TriangleDetector,
    DoubleTopDetector,
    DoubleBottomDetector,
);

/// Bars in the triangle window
pub const TRIANGLE_BARS: usize = 5;

#[inline]
fn strictly_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

#[inline]
fn strictly_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] > w[1])
}

#[inline]
fn all_equal_first(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Indices `i` where `pick(bar[i])` beats both neighbours under `beats`
fn local_extrema(
    series: &BarSeries,
    pick: impl Fn(&Bar) -> f64,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<usize> {
    (1..series.len().saturating_sub(1))
        .filter(|&i| match series.window(i - 1, i + 2) {
            Some(w) => {
                let (prev, curr, next) = (pick(w[0]), pick(w[1]), pick(w[2]));
                beats(curr, prev) && beats(curr, next)
            }
            None => false,
        })
        .collect()
}

// ============================================================
// HEAD AND SHOULDERS
// ============================================================

/// Head and shoulders: the second of the first three highs is the tallest
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadAndShouldersDetector;

impl PatternDetector for HeadAndShouldersDetector {
    type Verdict = HeadAndShoulders;

    fn id(&self) -> PatternId {
        PatternId("head_and_shoulders")
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn absent(&self) -> HeadAndShoulders {
        HeadAndShoulders::Absent
    }

    fn scan(&self, series: &BarSeries) -> HeadAndShoulders {
        match series.window(0, 3) {
            Some(w) => (w[0].high < w[1].high && w[1].high > w[2].high).into(),
            None => HeadAndShoulders::Absent,
        }
    }
}

// ============================================================
// TRIANGLE
// ============================================================

/// Triangle over the last five bars: ascending, descending, then symmetrical
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleDetector;

impl PatternDetector for TriangleDetector {
    type Verdict = Triangle;

    fn id(&self) -> PatternId {
        PatternId("triangle")
    }

    fn min_bars(&self) -> usize {
        TRIANGLE_BARS
    }

    fn absent(&self) -> Triangle {
        Triangle::NoTriangle
    }

    fn scan(&self, series: &BarSeries) -> Triangle {
        let n = series.len();
        let Some(window) = n
            .checked_sub(TRIANGLE_BARS)
            .and_then(|start| series.window(start, n))
        else {
            return Triangle::NoTriangle;
        };
        let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = window.iter().map(|b| b.low).collect();

        if strictly_increasing(&lows) && all_equal_first(&highs) {
            Triangle::Ascending
        } else if strictly_decreasing(&highs) && all_equal_first(&lows) {
            Triangle::Descending
        } else if strictly_increasing(&lows) && strictly_decreasing(&highs) {
            Triangle::Symmetrical
        } else {
            Triangle::NoTriangle
        }
    }
}

// ============================================================
// DOUBLE TOP / BOTTOM
// ============================================================

/// Double top: exactly two three-bar peaks, the second lower than the first
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleTopDetector;

impl PatternDetector for DoubleTopDetector {
    type Verdict = DoubleTop;

    fn id(&self) -> PatternId {
        PatternId("double_top")
    }

    fn min_bars(&self) -> usize {
        5
    }

    fn absent(&self) -> DoubleTop {
        DoubleTop::Absent
    }

    fn scan(&self, series: &BarSeries) -> DoubleTop {
        let high = |i: usize| series.get(i).map_or(f64::NAN, |b| b.high);
        match local_extrema(series, |b| b.high, |a, b| a > b).as_slice() {
            [first, second] => (high(*second) < high(*first)).into(),
            _ => DoubleTop::Absent,
        }
    }
}

/// Double bottom: exactly two three-bar troughs, the second higher than the first
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleBottomDetector;

impl PatternDetector for DoubleBottomDetector {
    type Verdict = DoubleBottom;

    fn id(&self) -> PatternId {
        PatternId("double_bottom")
    }

    fn min_bars(&self) -> usize {
        5
    }

    fn absent(&self) -> DoubleBottom {
        DoubleBottom::Absent
    }

    fn scan(&self, series: &BarSeries) -> DoubleBottom {
        let low = |i: usize| series.get(i).map_or(f64::NAN, |b| b.low);
        match local_extrema(series, |b| b.low, |a, b| a < b).as_slice() {
            [first, second] => (low(*second) > low(*first)).into(),
            _ => DoubleBottom::Absent,
        }
    }
}

// ============================================================
// CLASSIFIER
// ============================================================

/// All chart verdicts for one series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartReport {
    pub head_and_shoulders: HeadAndShoulders,
    pub triangle: Triangle,
    pub double_top: DoubleTop,
    pub double_bottom: DoubleBottom,
}

/// Run the four chart detectors
pub fn classify_chart(series: &BarSeries) -> ChartReport {
    ChartReport {
        head_and_shoulders: HeadAndShouldersDetector.detect(series),
        triangle: TriangleDetector.detect(series),
        double_top: DoubleTopDetector.detect(series),
        double_bottom: DoubleBottomDetector.detect(series),
    }
}

// ============================================================
// TESTS
// ============================================================
