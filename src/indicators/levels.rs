//! Price levels: Fibonacci retracements and local-extrema support/resistance

use serde::{Deserialize, Serialize};

use crate::series::{BarSeries, IndicatorSeries};

/// Retracement ratios, from the high (0%) down to the low (100%)
pub const FIBONACCI_RATIOS: [f64; 6] = [0.0, 0.236, 0.382, 0.5, 0.618, 1.0];

/// Six retracement levels between the series high and low
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub level_0: f64,
    pub level_236: f64,
    pub level_382: f64,
    pub level_50: f64,
    pub level_618: f64,
    pub level_100: f64,
}

impl FibonacciLevels {
    /// Levels ordered from 0% to 100%
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.level_0,
            self.level_236,
            self.level_382,
            self.level_50,
            self.level_618,
            self.level_100,
        ]
    }
}

/// Fibonacci levels from the global high and low of all present bars
pub fn fibonacci(series: &BarSeries) -> Option<FibonacciLevels> {
    let (max, min) = series
        .slots()
        .flatten()
        .fold(None, |acc: Option<(f64, f64)>, bar| match acc {
            Some((hi, lo)) => Some((hi.max(bar.high), lo.min(bar.low))),
            None => Some((bar.high, bar.low)),
        })?;

    let diff = max - min;
    let [l0, l236, l382, l50, l618, l100] = FIBONACCI_RATIOS.map(|r| max - r * diff);

    Some(FibonacciLevels {
        level_0: l0,
        level_236: l236,
        level_382: l382,
        level_50: l50,
        level_618: l618,
        level_100: l100,
    })
}

/// Support and resistance candidates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportResistance {
    pub support: IndicatorSeries,
    pub resistance: IndicatorSeries,
}

impl SupportResistance {
    /// Most recent support candidate
    pub fn latest_support(&self) -> Option<f64> {
        self.support.latest_defined()
    }

    /// Most recent resistance candidate
    pub fn latest_resistance(&self) -> Option<f64> {
        self.resistance.latest_defined()
    }
}

/// Local extrema over an inclusive `[i - window, i + window]` neighbourhood.
///
/// Evaluated for `window <= i < N - window`. Bar `i`'s low is a support
/// candidate when it equals the neighbourhood minimum low; its high is a
/// resistance candidate when it equals the neighbourhood maximum high.
pub fn support_resistance(series: &BarSeries, window: usize) -> SupportResistance {
    let n = series.len();
    if n <= 2 * window {
        return SupportResistance {
            support: IndicatorSeries::empty("support"),
            resistance: IndicatorSeries::empty("resistance"),
        };
    }

    let (support, resistance): (Vec<_>, Vec<_>) = (window..n - window)
        .map(|i| {
            let Some(neighbourhood) = series.window(i - window, i + window + 1) else {
                return (None, None);
            };
            let bar = neighbourhood[window];
            let lowest = neighbourhood.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let highest = neighbourhood.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            (
                (bar.low == lowest).then_some(bar.low),
                (bar.high == highest).then_some(bar.high),
            )
        })
        .unzip();

    SupportResistance {
        support: IndicatorSeries::new("support", window, support),
        resistance: IndicatorSeries::new("resistance", window, resistance),
    }
}
