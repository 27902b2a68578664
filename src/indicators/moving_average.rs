//! Simple and exponential moving averages of the close

use crate::series::{BarSeries, IndicatorSeries};
use crate::{Period, Result, SignalError};

/// Smoothing factor for an EMA of `period`
#[inline]
pub fn ema_alpha(period: Period) -> f64 {
    2.0 / (period.get() as f64 + 1.0)
}

/// Simple moving average of the close over a trailing window.
///
/// Stored from bar `period - 1`; a window touching a missing bar is `None`.
pub fn sma(series: &BarSeries, period: Period) -> Result<IndicatorSeries> {
    let p = period.get();
    let n = series.len();
    if p > n {
        return Err(SignalError::InsufficientData { need: p, got: n });
    }

    let values = (p - 1..n)
        .map(|i| {
            let window = series.window(i + 1 - p, i + 1)?;
            let sum: f64 = window.iter().map(|b| b.close).sum();
            Some(sum / p as f64)
        })
        .collect();

    Ok(IndicatorSeries::new("sma", p - 1, values))
}

/// Exponential moving average of the close, seeded by the first present close.
pub fn ema(series: &BarSeries, period: Period) -> IndicatorSeries {
    let closes = (0..series.len()).map(|i| series.close(i));
    IndicatorSeries::new("ema", 0, ema_recurrence(closes, period))
}

/// Apply the EMA recurrence to another indicator, keeping its alignment.
pub fn ema_of(input: &IndicatorSeries, period: Period, name: &'static str) -> IndicatorSeries {
    let values = ema_recurrence(input.values().iter().copied(), period);
    IndicatorSeries::new(name, input.start(), values)
}

/// `ema[i] = x[i] * a + ema[i-1] * (1 - a)`, skipping absent inputs.
///
/// An absent input yields an absent output; the next present input continues
/// from the last computed value.
pub(crate) fn ema_recurrence(
    input: impl Iterator<Item = Option<f64>>,
    period: Period,
) -> Vec<Option<f64>> {
    let alpha = ema_alpha(period);
    let mut prev: Option<f64> = None;

    input
        .map(|x| {
            let x = x?;
            let next = match prev {
                Some(p) => x * alpha + p * (1.0 - alpha),
                None => x,
            };
            prev = Some(next);
            Some(next)
        })
        .collect()
}
