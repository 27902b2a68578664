//! Candlestick shape classifiers
//!
//! Each detector answers whether its shape occurs on **any** bar of the
//! series. Missing bars never match.
//!
//! Hammer and hanging man share one shape test, as do inverted hammer and
//! shooting star. The names differ only by the trend they are expected in,
//! which these detectors do not classify.

use std::collections::HashMap;

use serde::Serialize;

use super::helpers::{self, any_bar, any_pair, any_triple, body_near_high, body_near_low};
use super::{Doji, Engulfing, Hammer, HangingMan, InvertedHammer, MorningStar, ShootingStar};
use crate::series::BarSeries;
use crate::params::{get_factor, get_ratio, ParamMeta, ParameterizedDetector};
use crate::{OHLCVExt, PatternDetector, PatternId, Ratio, Result, SignalError};

impl_with_defaults!(
    DojiDetector,
    EngulfingDetector,
    HammerDetector,
    HangingManDetector,
    InvertedHammerDetector,
    ShootingStarDetector,
    MorningStarDetector,
);

const DOJI_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "body_ratio",
    helpers::DOJI_RATIO,
    (0.05, 0.5, 0.05),
    "Minimum body / range ratio",
)];

const SHADOW_PARAMS: &[ParamMeta] = &[
    ParamMeta::factor(
        "shadow_factor",
        helpers::SHADOW_FACTOR,
        (2.0, 5.0, 0.5),
        "Range must exceed this many bodies",
    ),
    ParamMeta::ratio(
        "body_position",
        helpers::BODY_POSITION_RATIO,
        (0.2, 0.5, 0.01),
        "Open and close within this fraction of the range from one end",
    ),
];

fn validate_shadow(shadow_factor: f64) -> Result<()> {
    if !shadow_factor.is_finite() || shadow_factor <= 0.0 {
        return Err(SignalError::InvalidValue("shadow_factor must be positive and finite"));
    }
    Ok(())
}

// ============================================================
// DOJI
// ============================================================

/// Doji: body / range above `body_ratio` on some bar
#[derive(Debug, Clone, Copy)]
pub struct DojiDetector {
    pub body_ratio: Ratio,
}

impl Default for DojiDetector {
    fn default() -> Self {
        Self {
            body_ratio: Ratio::new_const(helpers::DOJI_RATIO),
        }
    }
}

impl PatternDetector for DojiDetector {
    type Verdict = Doji;

    fn id(&self) -> PatternId {
        PatternId("doji")
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn absent(&self) -> Doji {
        Doji::Absent
    }

    fn scan(&self, series: &BarSeries) -> Doji {
        let ratio = self.body_ratio.get();
        any_bar(series, |b| helpers::is_doji(b, ratio)).into()
    }
}

impl ParameterizedDetector for DojiDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOJI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            body_ratio: get_ratio(params, "body_ratio", helpers::DOJI_RATIO)?,
        })
    }

    fn pattern_id_str() -> &'static str {
        "doji"
    }
}

// ============================================================
// ENGULFING
// ============================================================

/// Engulfing: a bar closing against the direction of the bar before it
#[derive(Debug, Clone, Copy, Default)]
pub struct EngulfingDetector;

impl PatternDetector for EngulfingDetector {
    type Verdict = Engulfing;

    fn id(&self) -> PatternId {
        PatternId("engulfing")
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn absent(&self) -> Engulfing {
        Engulfing::NoEngulfing
    }

    fn scan(&self, series: &BarSeries) -> Engulfing {
        if any_pair(series, |prev, curr| curr.is_bullish() && prev.is_bearish()) {
            Engulfing::Bullish
        } else if any_pair(series, |prev, curr| curr.is_bearish() && prev.is_bullish()) {
            Engulfing::Bearish
        } else {
            Engulfing::NoEngulfing
        }
    }
}

// ============================================================
// SHADOW FAMILY
// ============================================================

/// Generate a long-shadow detector; `$placement` locates the small body.
macro_rules! shadow_detector {
    ($(#[$meta:meta])* $detector:ident, $verdict:ident, $id:literal, $placement:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $detector {
            /// Range must exceed this many bodies
            pub shadow_factor: f64,
            /// Open and close within this fraction of the range from one end
            pub body_position: Ratio,
        }

        impl Default for $detector {
            fn default() -> Self {
                Self {
                    shadow_factor: helpers::SHADOW_FACTOR,
                    body_position: Ratio::new_const(helpers::BODY_POSITION_RATIO),
                }
            }
        }

        impl PatternDetector for $detector {
            type Verdict = $verdict;

            fn id(&self) -> PatternId {
                PatternId($id)
            }

            fn min_bars(&self) -> usize {
                1
            }

            fn absent(&self) -> $verdict {
                $verdict::Absent
            }

            fn scan(&self, series: &BarSeries) -> $verdict {
                let position = self.body_position.get();
                any_bar(series, |b| {
                    helpers::has_long_shadow(b, self.shadow_factor) && $placement(b, position)
                })
                .into()
            }

            fn validate_config(&self) -> Result<()> {
                validate_shadow(self.shadow_factor)
            }
        }

        impl ParameterizedDetector for $detector {
            fn param_meta() -> &'static [ParamMeta] {
                SHADOW_PARAMS
            }

            fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
                Ok(Self {
                    shadow_factor: get_factor(params, "shadow_factor", helpers::SHADOW_FACTOR)?,
                    body_position: get_ratio(params, "body_position", helpers::BODY_POSITION_RATIO)?,
                })
            }

            fn pattern_id_str() -> &'static str {
                $id
            }
        }
    };
}

shadow_detector!(
    /// Hammer: long range, small body near the low
    HammerDetector, Hammer, "hammer", body_near_low
);
shadow_detector!(
    /// Hanging man: same shape as the hammer
    HangingManDetector, HangingMan, "hanging_man", body_near_low
);
shadow_detector!(
    /// Inverted hammer: long range, small body near the high
    InvertedHammerDetector, InvertedHammer, "inverted_hammer", body_near_high
);
shadow_detector!(
    /// Shooting star: same shape as the inverted hammer
    ShootingStarDetector, ShootingStar, "shooting_star", body_near_high
);

// ============================================================
// MORNING STAR
// ============================================================

/// Morning star: bearish bar, then two bullish bars
#[derive(Debug, Clone, Copy, Default)]
pub struct MorningStarDetector;

impl PatternDetector for MorningStarDetector {
    type Verdict = MorningStar;

    fn id(&self) -> PatternId {
        PatternId("morning_star")
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn absent(&self) -> MorningStar {
        MorningStar::Absent
    }

    fn scan(&self, series: &BarSeries) -> MorningStar {
        any_triple(series, |first, second, third| {
            first.is_bearish() && second.is_bullish() && third.is_bullish()
        })
        .into()
    }
}

// ============================================================
// CLASSIFIER
// ============================================================

/// All candlestick verdicts for one series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandlestickReport {
    pub doji: Doji,
    pub engulfing: Engulfing,
    pub hammer: Hammer,
    pub hanging_man: HangingMan,
    pub morning_star: MorningStar,
    pub inverted_hammer: InvertedHammer,
    pub shooting_star: ShootingStar,
}

impl CandlestickReport {
    /// Bullish engulfing, hammer or morning star
    pub fn has_bullish_shape(&self) -> bool {
        self.engulfing == Engulfing::Bullish
            || self.hammer.is_present()
            || self.morning_star.is_present()
    }

    /// Shooting star or hanging man
    pub fn has_bearish_shape(&self) -> bool {
        self.shooting_star.is_present() || self.hanging_man.is_present()
    }
}

/// The seven candlestick detectors with their thresholds
#[derive(Debug, Clone, Copy, Default)]
pub struct CandlestickClassifier {
    pub doji: DojiDetector,
    pub engulfing: EngulfingDetector,
    pub hammer: HammerDetector,
    pub hanging_man: HangingManDetector,
    pub morning_star: MorningStarDetector,
    pub inverted_hammer: InvertedHammerDetector,
    pub shooting_star: ShootingStarDetector,
}

impl CandlestickClassifier {
    pub fn classify(&self, series: &BarSeries) -> CandlestickReport {
        CandlestickReport {
            doji: self.doji.detect(series),
            engulfing: self.engulfing.detect(series),
            hammer: self.hammer.detect(series),
            hanging_man: self.hanging_man.detect(series),
            morning_star: self.morning_star.detect(series),
            inverted_hammer: self.inverted_hammer.detect(series),
            shooting_star: self.shooting_star.detect(series),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        self.doji.validate_config()?;
        self.hammer.validate_config()?;
        self.hanging_man.validate_config()?;
        self.inverted_hammer.validate_config()?;
        self.shooting_star.validate_config()
    }
}

/// Classify with default thresholds
pub fn classify_candlesticks(series: &BarSeries) -> CandlestickReport {
    CandlestickClassifier::default().classify(series)
}

// ============================================================
// TESTS
// ============================================================
