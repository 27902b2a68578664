//! Engine configuration
//!
//! Indicator periods and windows used by [`SignalEngine`](crate::SignalEngine).
//! Defaults follow the classic settings: SMA 14, RSI 14 (smoothed),
//! MACD 12/26/9, Stochastic 14/3, support/resistance window 5.
//!
//! The confirmation threshold, RSI bands and trade-plan multipliers are fixed
//! constants in [`fusion`](crate::fusion) and [`risk`](crate::risk).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::params::{get_period, ParamMeta};
use crate::{Period, Result, SignalError};

const FUSION_PARAMS: &[ParamMeta] = &[
    ParamMeta::period("sma_period", 14.0, (5.0, 50.0, 1.0), "Trend SMA period"),
    ParamMeta::period("rsi_period", 14.0, (5.0, 30.0, 1.0), "RSI period"),
    ParamMeta::period("macd_fast", 12.0, (5.0, 20.0, 1.0), "MACD fast EMA period"),
    ParamMeta::period("macd_slow", 26.0, (15.0, 50.0, 1.0), "MACD slow EMA period"),
    ParamMeta::period("macd_signal", 9.0, (3.0, 15.0, 1.0), "MACD signal EMA period"),
    ParamMeta::period("stochastic_k", 14.0, (5.0, 30.0, 1.0), "Stochastic %K period"),
    ParamMeta::period("stochastic_d", 3.0, (2.0, 10.0, 1.0), "Stochastic %D period"),
    ParamMeta::period("support_window", 5.0, (2.0, 20.0, 1.0), "Support/resistance half-window"),
];

/// Indicator settings for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub sma_period: Period,
    pub rsi_period: Period,
    pub rsi_smoothed: bool,
    pub macd_fast: Period,
    pub macd_slow: Period,
    pub macd_signal: Period,
    pub stochastic_k: Period,
    pub stochastic_d: Period,
    /// Bars on each side of a support/resistance candidate
    pub support_window: Period,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            sma_period: Period::new_const(14),
            rsi_period: Period::new_const(14),
            rsi_smoothed: true,
            macd_fast: Period::new_const(12),
            macd_slow: Period::new_const(26),
            macd_signal: Period::new_const(9),
            stochastic_k: Period::new_const(14),
            stochastic_d: Period::new_const(3),
            support_window: Period::new_const(5),
        }
    }
}

impl FusionConfig {
    /// Metadata for every period, for grid search over configurations
    pub fn param_meta() -> &'static [ParamMeta] {
        FUSION_PARAMS
    }

    /// Build from a flat map, missing keys take their defaults
    pub fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        let config = Self {
            sma_period: get_period(params, "sma_period", d.sma_period.get())?,
            rsi_period: get_period(params, "rsi_period", d.rsi_period.get())?,
            rsi_smoothed: d.rsi_smoothed,
            macd_fast: get_period(params, "macd_fast", d.macd_fast.get())?,
            macd_slow: get_period(params, "macd_slow", d.macd_slow.get())?,
            macd_signal: get_period(params, "macd_signal", d.macd_signal.get())?,
            stochastic_k: get_period(params, "stochastic_k", d.stochastic_k.get())?,
            stochastic_d: get_period(params, "stochastic_d", d.stochastic_d.get())?,
            support_window: get_period(params, "support_window", d.support_window.get())?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.macd_fast >= self.macd_slow {
            return Err(SignalError::InvalidConfig(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast.get(),
                self.macd_slow.get()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FusionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_macd_order_rejected() {
        let config = FusionConfig {
            macd_fast: Period::new_const(26),
            macd_slow: Period::new_const(12),
            ..FusionConfig::default()
        };
        assert!(matches!(config.validate(), Err(SignalError::InvalidConfig(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: FusionConfig =
            serde_json::from_str(r#"{"sma_period": 50, "rsi_smoothed": false}"#).unwrap();
        assert_eq!(config.sma_period.get(), 50);
        assert!(!config.rsi_smoothed);
        assert_eq!(config.macd_slow.get(), 26);
    }

    #[test]
    fn test_deserialize_zero_period_rejected() {
        let result: std::result::Result<FusionConfig, _> =
            serde_json::from_str(r#"{"rsi_period": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_params() {
        let mut params = HashMap::new();
        params.insert("sma_period", 20.0);
        let config = FusionConfig::with_params(&params).unwrap();
        assert_eq!(config.sma_period.get(), 20);

        params.insert("macd_fast", 30.0);
        assert!(FusionConfig::with_params(&params).is_err());
        assert_eq!(FusionConfig::param_meta().len(), 8);
    }

    #[test]
    fn test_with_params_rejects_fractional_period() {
        let mut params = HashMap::new();
        params.insert("sma_period", 20.7);
        assert!(matches!(
            FusionConfig::with_params(&params),
            Err(SignalError::InvalidValue(_))
        ));
    }
}
