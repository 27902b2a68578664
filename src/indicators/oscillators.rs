//! RSI and Stochastic oscillators

use serde::Serialize;

use super::moving_average::ema_of;
use crate::series::{BarSeries, IndicatorSeries};
use crate::Period;

/// Relative Strength Index of the close.
///
/// Deltas start at bar 1, so the first value is at bar `period`. A window with
/// no losses reads 100. With `smoothed` the raw line is passed through an EMA
/// of the same period.
pub fn rsi(series: &BarSeries, period: Period, smoothed: bool) -> IndicatorSeries {
    let p = period.get();
    let n = series.len();
    if n <= p {
        return IndicatorSeries::empty("rsi");
    }

    let deltas: Vec<Option<f64>> = (1..n)
        .map(|i| Some(series.close(i)? - series.close(i - 1)?))
        .collect();

    // deltas[j] belongs to bar j + 1
    let values = (p..n)
        .map(|i| {
            let window = &deltas[i - p..i];
            let mut gain = 0.0;
            let mut loss = 0.0;
            for d in window {
                let d = (*d)?;
                if d > 0.0 {
                    gain += d;
                } else {
                    loss -= d;
                }
            }
            Some(rsi_value(gain / p as f64, loss / p as f64))
        })
        .collect();

    let raw = IndicatorSeries::new("rsi", p, values);
    if smoothed {
        ema_of(&raw, period, "rsi_smoothed")
    } else {
        raw
    }
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Stochastic %K and %D lines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stochastic {
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

/// Stochastic oscillator.
///
/// %K is stored from bar `k_period - 1` and is `None` for a flat high/low
/// range. %D is the trailing mean of %K over `d_period`.
pub fn stochastic(series: &BarSeries, k_period: Period, d_period: Period) -> Stochastic {
    let kp = k_period.get();
    let dp = d_period.get();
    let n = series.len();

    if kp > n {
        return Stochastic {
            k: IndicatorSeries::empty("stochastic_k"),
            d: IndicatorSeries::empty("stochastic_d"),
        };
    }

    let k_values: Vec<Option<f64>> = (kp - 1..n)
        .map(|i| {
            let window = series.window(i + 1 - kp, i + 1)?;
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let denom = highest - lowest;
            if denom <= 0.0 {
                return None;
            }
            Some(100.0 * (series.close(i)? - lowest) / denom)
        })
        .collect();

    let d_values: Vec<Option<f64>> = if dp > k_values.len() {
        Vec::new()
    } else {
        k_values
            .windows(dp)
            .map(|w| {
                let sum = w.iter().copied().sum::<Option<f64>>()?;
                Some(sum / dp as f64)
            })
            .collect()
    };

    Stochastic {
        k: IndicatorSeries::new("stochastic_k", kp - 1, k_values),
        d: IndicatorSeries::new("stochastic_d", kp + dp - 2, d_values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Bar;

    fn closes(values: &[f64]) -> BarSeries {
        BarSeries::from_bars(
            values
                .iter()
                .enumerate()
                .map(|(i, &c)| Bar::new(i as i64, c, c + 1.0, c - 1.0, c, 1.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let r = rsi(&closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), Period::new(3).unwrap(), false);
        assert_eq!(r.start(), 3);
        assert_eq!(r.values(), &[Some(100.0), Some(100.0)]);
    }

    #[test]
    fn test_rsi_balanced_is_50() {
        let r = rsi(&closes(&[10.0, 11.0, 10.0]), Period::new(2).unwrap(), false);
        assert_eq!(r.latest(), Some(50.0));
    }

    #[test]
    fn test_rsi_too_short_is_empty() {
        let r = rsi(&closes(&[1.0, 2.0]), Period::new(14).unwrap(), true);
        assert!(r.is_empty());
        assert_eq!(r.latest(), None);
    }

    #[test]
    fn test_stochastic_alignment() {
        let s = stochastic(
            &closes(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            Period::new(3).unwrap(),
            Period::new(2).unwrap(),
        );
        assert_eq!(s.k.start(), 2);
        assert_eq!(s.k.len(), 3);
        assert_eq!(s.d.start(), 3);
        assert_eq!(s.d.len(), 2);
        // window lows 0..2, highs 2..4 => close 3 sits at 75%
        assert_eq!(s.k.get(2), Some(75.0));
    }

    #[test]
    fn test_stochastic_flat_range_is_absent() {
        let flat = BarSeries::from_bars((0..4).map(|i| Bar::new(i, 5.0, 5.0, 5.0, 5.0, 0.0))).unwrap();
        let s = stochastic(&flat, Period::new(2).unwrap(), Period::new(2).unwrap());
        assert!(s.k.values().iter().all(Option::is_none));
        assert!(s.d.values().iter().all(Option::is_none));
    }
}
