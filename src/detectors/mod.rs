//! Pattern detectors
//!
//! Whole-series classifiers: each detector looks at the full [`BarSeries`]
//! (or its trailing window) and returns one verdict for the series.
//!
//! # Pattern Families
//!
//! - **Candlestick (7)**: Doji, Engulfing, Hammer, Hanging Man, Inverted Hammer,
//!   Shooting Star, Morning Star
//! - **Chart (4)**: Head and Shoulders, Triangle, Double Top, Double Bottom
//!
//! [`BarSeries`]: crate::series::BarSeries

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

/// Generate a verdict enum whose variants map to fixed snake_case labels.
macro_rules! define_verdict {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Label as emitted in reports
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_str(self.label())
            }
        }
    };
}

/// Generate present/absent verdicts for single-outcome patterns.
macro_rules! define_presence {
    ($($(#[$meta:meta])* $name:ident => $present:literal, $absent:literal;)*) => {
        $(
            define_verdict! {
                $(#[$meta])*
                $name { Present => $present, Absent => $absent }
            }

            impl $name {
                #[inline]
                pub fn is_present(self) -> bool {
                    matches!(self, Self::Present)
                }
            }

            impl From<bool> for $name {
                fn from(present: bool) -> Self {
                    if present {
                        Self::Present
                    } else {
                        Self::Absent
                    }
                }
            }
        )*
    };
}

// ============================================================
// VERDICTS
// ============================================================

define_presence! {
    /// Doji verdict
    Doji => "doji", "no_doji";
    /// Hammer verdict (same shape as hanging man)
    Hammer => "hammer", "no_hammer";
    /// Hanging man verdict (same shape as hammer)
    HangingMan => "hanging_man", "no_hanging_man";
    /// Inverted hammer verdict (same shape as shooting star)
    InvertedHammer => "inverted_hammer", "no_inverted_hammer";
    /// Shooting star verdict (same shape as inverted hammer)
    ShootingStar => "shooting_star", "no_shooting_star";
    /// Morning star verdict
    MorningStar => "morning_star", "no_morning_star";
    /// Head and shoulders verdict
    HeadAndShoulders => "head_and_shoulders", "no_head_and_shoulders";
    /// Double top verdict
    DoubleTop => "double_top", "no_double_top";
    /// Double bottom verdict
    DoubleBottom => "double_bottom", "no_double_bottom";
}

define_verdict! {
    /// Engulfing verdict; bullish wins when both occur in the series
    Engulfing {
        Bullish => "bullish",
        Bearish => "bearish",
        NoEngulfing => "no_engulfing",
    }
}

define_verdict! {
    /// Triangle verdict over the last five bars
    Triangle {
        Ascending => "ascending_triangle",
        Descending => "descending_triangle",
        Symmetrical => "symmetrical_triangle",
        NoTriangle => "no_triangle",
    }
}

pub mod candlestick;
pub mod chart;

pub use candlestick::*;
pub use chart::*;
pub use helpers::*;
