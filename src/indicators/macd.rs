//! MACD line, signal line and crossover

use serde::Serialize;

use super::moving_average::{ema, ema_of};
use crate::series::{BarSeries, IndicatorSeries};
use crate::Period;

/// Crossover between the MACD line and its signal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cross {
    Bullish,
    Bearish,
}

/// MACD output; both lines are aligned from bar 0 with equal length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macd {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
}

impl Macd {
    /// The last two aligned `(macd, signal)` points, oldest first
    pub fn last_two(&self) -> Option<[(f64, f64); 2]> {
        let end = self.line.end().min(self.signal.end());
        let last = end.checked_sub(1)?;
        let prev = last.checked_sub(1)?;
        let point = |i| Some((self.line.get(i)?, self.signal.get(i)?));
        Some([point(prev)?, point(last)?])
    }

    /// Strict crossover between the two most recent points
    pub fn cross(&self) -> Option<Cross> {
        self.last_two().and_then(cross_between)
    }

    /// `line - signal` at every bar
    pub fn histogram(&self) -> IndicatorSeries {
        let values = self
            .line
            .iter()
            .map(|(i, m)| Some(m? - self.signal.get(i)?))
            .collect();
        IndicatorSeries::new("macd_histogram", self.line.start(), values)
    }
}

/// Cross between `[previous, latest]` `(macd, signal)` points.
///
/// Equality on either bar is not a cross.
pub fn cross_between(points: [(f64, f64); 2]) -> Option<Cross> {
    let [(prev_macd, prev_signal), (macd, signal)] = points;
    if macd > signal && prev_macd < prev_signal {
        Some(Cross::Bullish)
    } else if macd < signal && prev_macd > prev_signal {
        Some(Cross::Bearish)
    } else {
        None
    }
}

/// `macd = ema(fast) - ema(slow)`, `signal = ema(macd, signal)`
pub fn macd(series: &BarSeries, fast: Period, slow: Period, signal: Period) -> Macd {
    let fast_line = ema(series, fast);
    let slow_line = ema(series, slow);

    let values = fast_line
        .iter()
        .map(|(i, f)| Some(f? - slow_line.get(i)?))
        .collect();
    let line = IndicatorSeries::new("macd_line", 0, values);
    let signal = ema_of(&line, signal, "macd_signal");

    Macd { line, signal }
}
