//! # Confluence - technical-analysis signal fusion
//!
//! Turns a window of OHLCV bars into an "up", "down" or "no signal" decision by
//! counting agreeing technical-analysis detectors.
//!
//! ## Quick Start
//!
//! ```rust
//! use confluence::prelude::*;
//!
//! // Rows as delivered by a market data feed
//! let rows: Vec<RawBar> = (0..60)
//!     .map(|i| {
//!         let c = 100.0 + (i as f64 * 0.7).sin() * 5.0;
//!         RawBar::new(i, c, c + 1.0, c - 1.0, c + 0.2, 10.0)
//!     })
//!     .collect();
//! let series = BarSeries::ingest(&rows).unwrap();
//!
//! // Create engine with default indicator settings
//! let engine = EngineBuilder::new().build().unwrap();
//!
//! let evaluation = engine.evaluate(&series);
//! if evaluation.decision.is_confirmed() {
//!     println!("{:?}: {:?}", evaluation.decision.direction, evaluation.decision.reasons);
//! }
//! ```
//!
//! ## Layers
//!
//! - [`series`]: immutable bar input and aligned indicator output
//! - [`indicators`]: SMA, EMA, RSI, MACD, Stochastic, Fibonacci, support/resistance
//! - [`detectors`]: candlestick and chart pattern verdicts
//! - [`fusion`]: confirmation voting
//! - [`risk`]: risk/reward of the resulting trade plan

pub mod config;
pub mod detectors;
pub mod fusion;
pub mod indicators;
pub mod params;
pub mod risk;
pub mod series;

pub mod prelude {
    pub use crate::{
        // Configuration
        config::FusionConfig,
        // Detectors
        detectors::*,
        // Fusion
        fusion::{fuse, ConfirmationVote, Decision, FusionInputs, CONFIRMATION_THRESHOLD},
        // Indicators
        indicators::{
            ema, fibonacci, macd, rsi, sma, stochastic, support_resistance, volume, Cross,
            FibonacciLevels, Macd, Stochastic, SupportResistance,
        },
        // Parameters
        params::{ParamMeta, ParamType, ParameterizedDetector},
        // Parallel
        evaluate_parallel,
        // Risk
        risk::{risk_reward, risk_reward_batch, TradePlan},
        // Data
        series::{Bar, BarSeries, IndicatorSeries, RawBar, RawValue},
        // Engine
        EngineBuilder,
        Evaluation,
        EvaluationError,
        EvaluationResult,
        SignalEngine,
        // Core traits
        Direction,
        OHLCVExt,
        PatternDetector,
        PatternId,
        Period,
        Ratio,
        OHLCV,
        // Errors
        Result,
        SignalError,
    };
}

use serde::Serialize;
use tracing::{debug, trace};

use config::FusionConfig;
use detectors::{classify_chart, CandlestickClassifier, CandlestickReport, ChartReport};
use fusion::{fuse, Decision, FusionInputs};
use indicators::FibonacciLevels;
use series::BarSeries;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors raised by validation and ingestion
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignalError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: &'static str },

    #[error("Timestamp at index {index} not increasing: {current} after {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: i64,
        current: i64,
    },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(SignalError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(SignalError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SignalError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Body as ratio of range. Returns None for a zero range
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > 0.0).then(|| self.body() / range)
    }

    /// Validate OHLCV data consistency; `index` is the bar's position in its series
    fn validate(&self, index: usize) -> Result<()> {
        let fields = [self.open(), self.high(), self.low(), self.close(), self.volume()];
        let malformed = |reason| Err(SignalError::MalformedBar { index, reason });

        if fields.iter().any(|v| v.is_nan()) {
            return malformed("NaN in OHLCV");
        }
        if fields.iter().any(|v| v.is_infinite()) {
            return malformed("Infinite value in OHLCV");
        }
        if fields.iter().any(|v| *v < 0.0) {
            return malformed("negative value in OHLCV");
        }
        if self.high() < self.low() {
            return malformed("high < low");
        }
        if self.open().min(self.close()) < self.low() || self.open().max(self.close()) > self.high() {
            return malformed("body outside high/low range");
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

// ============================================================
// PATTERN TYPES
// ============================================================

/// Unique identifier for a pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Direction of a vote or decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Only upward decisions carry a trade plan
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// Whole-series pattern detector
pub trait PatternDetector: Send + Sync {
    /// Categorical outcome for a series
    type Verdict: Copy;

    fn id(&self) -> PatternId;
    fn min_bars(&self) -> usize;

    /// Verdict reported when the pattern is not found
    fn absent(&self) -> Self::Verdict;

    /// Classify a series that already satisfies `min_bars`
    fn scan(&self, series: &BarSeries) -> Self::Verdict;

    /// Classify any series; too short a series yields [`PatternDetector::absent`]
    fn detect(&self, series: &BarSeries) -> Self::Verdict {
        if series.len() < self.min_bars() {
            trace!(
                pattern = self.id().as_str(),
                need = self.min_bars(),
                got = series.len(),
                "insufficient bars"
            );
            return self.absent();
        }
        self.scan(series)
    }

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// SIGNAL ENGINE
// ============================================================

/// Everything computed for one series in one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub candlesticks: CandlestickReport,
    pub chart: ChartReport,
    pub fibonacci: Option<FibonacciLevels>,
    pub stochastic_k: Option<f64>,
    pub stochastic_d: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Runs every indicator and detector over a series and fuses the result
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    config: FusionConfig,
    candlesticks: CandlestickClassifier,
}

impl SignalEngine {
    #[inline]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Compute the fusion inputs without voting
    pub fn inputs(&self, series: &BarSeries) -> FusionInputs {
        self.analyse(series).0
    }

    /// Evaluate a series. Never fails: missing data yields fewer votes.
    pub fn evaluate(&self, series: &BarSeries) -> Evaluation {
        let (inputs, extras) = self.analyse(series);
        let decision = fuse(&inputs);

        Evaluation {
            decision,
            candlesticks: inputs.candlesticks,
            chart: inputs.chart,
            fibonacci: extras.fibonacci,
            stochastic_k: extras.stochastic_k,
            stochastic_d: extras.stochastic_d,
            macd_histogram: extras.macd_histogram,
            support: inputs.support,
            resistance: inputs.resistance,
        }
    }

    fn analyse(&self, series: &BarSeries) -> (FusionInputs, Extras) {
        let c = &self.config;

        let sma = match indicators::sma(series, c.sma_period) {
            Ok(line) => line.latest(),
            Err(error) => {
                debug!(%error, "SMA unavailable");
                None
            }
        };
        let rsi = indicators::rsi(series, c.rsi_period, c.rsi_smoothed);
        let macd = indicators::macd(series, c.macd_fast, c.macd_slow, c.macd_signal);
        let stochastic = indicators::stochastic(series, c.stochastic_k, c.stochastic_d);
        let levels = indicators::support_resistance(series, c.support_window.get());

        let inputs = FusionInputs {
            close: series.latest_close(),
            sma,
            rsi: rsi.latest(),
            macd: macd.last_two(),
            candlesticks: self.candlesticks.classify(series),
            chart: classify_chart(series),
            support: levels.latest_support(),
            resistance: levels.latest_resistance(),
        };
        if inputs.close.is_none() {
            debug!(bars = series.len(), "latest bar missing, price rules abstain");
        }

        let extras = Extras {
            fibonacci: indicators::fibonacci(series),
            stochastic_k: stochastic.k.latest(),
            stochastic_d: stochastic.d.latest(),
            macd_histogram: macd.histogram().latest(),
        };
        (inputs, extras)
    }
}

/// Values reported alongside the decision but not voted on
struct Extras {
    fibonacci: Option<FibonacciLevels>,
    stochastic_k: Option<f64>,
    stochastic_d: Option<f64>,
    macd_histogram: Option<f64>,
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating SignalEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: FusionConfig,
    candlesticks: CandlestickClassifier,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: FusionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sma_period(mut self, period: Period) -> Self {
        self.config.sma_period = period;
        self
    }

    pub fn rsi(mut self, period: Period, smoothed: bool) -> Self {
        self.config.rsi_period = period;
        self.config.rsi_smoothed = smoothed;
        self
    }

    pub fn macd(mut self, fast: Period, slow: Period, signal: Period) -> Self {
        self.config.macd_fast = fast;
        self.config.macd_slow = slow;
        self.config.macd_signal = signal;
        self
    }

    pub fn stochastic(mut self, k: Period, d: Period) -> Self {
        self.config.stochastic_k = k;
        self.config.stochastic_d = d;
        self
    }

    pub fn support_window(mut self, window: Period) -> Self {
        self.config.support_window = window;
        self
    }

    /// Use custom candlestick thresholds
    pub fn candlesticks(mut self, classifier: CandlestickClassifier) -> Self {
        self.candlesticks = classifier;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<SignalEngine> {
        self.config.validate()?;
        self.candlesticks.validate_config()?;
        Ok(SignalEngine {
            config: self.config,
            candlesticks: self.candlesticks,
        })
    }
}

// ============================================================
// PARALLEL EVALUATION
// ============================================================

use rayon::prelude::*;

/// Result of evaluating a single instrument
#[derive(Debug)]
pub struct EvaluationResult {
    pub symbol: String,
    pub evaluation: Evaluation,
}

/// Error from ingesting a single instrument
#[derive(Debug)]
pub struct EvaluationError {
    pub symbol: String,
    pub error: SignalError,
}

/// Ingest and evaluate many instruments on the rayon pool
pub fn evaluate_parallel<'a, I>(
    engine: &SignalEngine,
    instruments: I,
) -> (Vec<EvaluationResult>, Vec<EvaluationError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a [series::RawBar])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, rows)| {
            BarSeries::ingest(rows)
                .map(|series| EvaluationResult {
                    symbol: symbol.to_string(),
                    evaluation: engine.evaluate(&series),
                })
                .map_err(|error| EvaluationError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
