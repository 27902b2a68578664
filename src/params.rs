//! Parameter metadata for candlestick detectors
//!
//! Describes the tunable thresholds of the shape detectors so callers can:
//! - Build detectors from a flat `name -> value` map
//! - Enumerate a grid of candidate values
//! - Validate user supplied values
//!
//! # Example
//!
//! ```rust
//! use confluence::params::ParameterizedDetector;
//! use confluence::prelude::*;
//!
//! for param in HammerDetector::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{Period, Ratio, Result, SignalError};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value in 0.0..=1.0
  Ratio,
  /// Positive multiplier, may exceed 1.0
  Factor,
  /// Period value (positive integer)
  Period,
}

/// Metadata for a single detector parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "shadow_factor")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  pub const fn factor(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Factor, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(SignalError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Factor => {
        if value <= 0.0 {
          return Err(SignalError::InvalidValue("Factor must be positive"));
        }
        Ok(())
      },
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(SignalError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Detectors that expose their thresholds as named parameters
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;

  fn pattern_id_str() -> &'static str;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a positive finite multiplier from params with default fallback
pub fn get_factor(params: &HashMap<&str, f64>, key: &'static str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() || value <= 0.0 {
    return Err(SignalError::OutOfRange { field: key, value, min: 0.0, max: f64::MAX });
  }
  Ok(value)
}

/// Helper to get a Period from params with default fallback
///
/// Fractional values are rejected rather than truncated.
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let Some(value) = params.get(key).copied() else {
    return Period::new(default);
  };
  if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
    return Err(SignalError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_param_meta_factor() {
    let meta = ParamMeta::factor("shadow_factor", 3.0, (2.0, 5.0, 0.5), "Shadow multiple");

    assert_eq!(meta.name, "shadow_factor");
    assert_eq!(meta.param_type, ParamType::Factor);
    assert_eq!(meta.default, 3.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.2), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid.len(), 3);
    assert!((grid[0] - 0.3).abs() < f64::EPSILON);
    assert!((grid[1] - 0.5).abs() < f64::EPSILON);
    assert!((grid[2] - 0.7).abs() < f64::EPSILON);
  }

  #[test]
  fn test_validate_ratio() {
    let meta = ParamMeta::ratio("test", 0.5, (0.3, 0.7, 0.1), "Test");

    assert!(meta.validate(0.5).is_ok());
    assert!(meta.validate(0.3).is_ok());
    assert!(meta.validate(0.2).is_err());
    assert!(meta.validate(0.8).is_err());
  }

  #[test]
  fn test_validate_period() {
    let meta = ParamMeta::period("test", 14.0, (10.0, 20.0, 2.0), "Test");

    assert!(meta.validate(14.0).is_ok());
    assert!(meta.validate(14.5).is_err());
    assert!(meta.validate(22.0).is_err());
  }

  #[test]
  fn test_get_helpers() {
    let mut params = HashMap::new();
    params.insert("ratio", 0.8);
    params.insert("factor", 4.0);
    params.insert("bad", -1.0);
    params.insert("period", 20.0);

    assert!((get_ratio(&params, "ratio", 0.5).unwrap().get() - 0.8).abs() < f64::EPSILON);
    assert!((get_ratio(&params, "missing", 0.5).unwrap().get() - 0.5).abs() < f64::EPSILON);
    assert_eq!(get_factor(&params, "factor", 3.0).unwrap(), 4.0);
    assert!(get_factor(&params, "bad", 3.0).is_err());
    assert_eq!(get_period(&params, "period", 14).unwrap().get(), 20);
    assert_eq!(get_period(&params, "missing", 14).unwrap().get(), 14);
  }

  #[test]
  fn test_get_period_rejects_fractions() {
    let mut params = HashMap::new();
    params.insert("fractional", 20.7);
    params.insert("zero", 0.0);
    params.insert("nan", f64::NAN);

    assert!(get_period(&params, "fractional", 14).is_err());
    assert!(get_period(&params, "zero", 14).is_err());
    assert!(get_period(&params, "nan", 14).is_err());
  }
}
