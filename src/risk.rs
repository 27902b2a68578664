//! Risk/reward calculation for a proposed long trade

use serde::{Deserialize, Serialize};

/// Stop placed this fraction of the entry below it
pub const STOP_MULTIPLIER: f64 = 0.98;
/// Target placed this fraction of the entry above it
pub const TARGET_MULTIPLIER: f64 = 1.05;

/// `(target - entry) / (entry - stop)`.
///
/// `None` when any price is non-positive or non-finite, or when entry equals
/// stop.
pub fn risk_reward(entry: f64, stop: f64, target: f64) -> Option<f64> {
    let prices = [entry, stop, target];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return None;
    }
    let risk = entry - stop;
    if risk == 0.0 {
        return None;
    }
    Some((target - entry) / risk)
}

/// Entry, stop and target of a trade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
}

impl TradePlan {
    pub fn new(entry: f64, stop: f64, target: f64) -> Self {
        Self {
            entry,
            stop,
            target,
        }
    }

    /// Long plan with a 2% stop and a 5% target
    pub fn long(entry: f64) -> Self {
        Self::new(entry, entry * STOP_MULTIPLIER, entry * TARGET_MULTIPLIER)
    }

    #[inline]
    pub fn risk_reward(&self) -> Option<f64> {
        risk_reward(self.entry, self.stop, self.target)
    }
}

/// Ratio for each plan, in input order
pub fn risk_reward_batch(plans: &[TradePlan]) -> Vec<Option<f64>> {
    plans.iter().map(TradePlan::risk_reward).collect()
}
