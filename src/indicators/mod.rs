//! Indicator library
//!
//! Every indicator is a pure function of a [`BarSeries`] returning an
//! [`IndicatorSeries`] (or a small struct of them) aligned with the input bars.
//!
//! - **Moving averages**: [`sma`], [`ema`], [`ema_of`]
//! - **Oscillators**: [`rsi`], [`stochastic`]
//! - **Momentum**: [`macd`]
//! - **Levels**: [`fibonacci`], [`support_resistance`]
//! - **Volume**: [`volume`]

pub mod levels;
pub mod macd;
pub mod moving_average;
pub mod oscillators;

pub use levels::*;
pub use macd::*;
pub use moving_average::*;
pub use oscillators::*;

use crate::series::{BarSeries, IndicatorSeries};

/// Raw volume line, aligned from bar 0
pub fn volume(series: &BarSeries) -> IndicatorSeries {
    let values = series.slots().map(|b| b.map(|b| b.volume)).collect();
    IndicatorSeries::new("volume", 0, values)
}
