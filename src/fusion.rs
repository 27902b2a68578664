//! Signal fusion
//!
//! Five independent rules each cast at most one directional vote. A decision
//! is confirmed once at least [`CONFIRMATION_THRESHOLD`] rules have voted, in
//! either direction; the reported direction is that of the last rule to vote.
//!
//! | # | Rule        | Up                         | Down                     |
//! |---|-------------|----------------------------|--------------------------|
//! | 1 | Trend       | close > SMA                | close < SMA              |
//! | 2 | Momentum    | RSI < 30                   | RSI > 70                 |
//! | 3 | Crossover   | MACD crosses above signal  | MACD crosses below       |
//! | 4 | Candlestick | engulfing/hammer/morning   | shooting star/hanging man|
//! | 5 | Breakout    | close > resistance         | close < support          |

use serde::Serialize;
use tracing::{debug, info};

use crate::detectors::{CandlestickReport, ChartReport};
use crate::indicators::{cross_between, Cross};
use crate::risk::TradePlan;
use crate::Direction;

/// Votes needed for a confirmed decision
pub const CONFIRMATION_THRESHOLD: usize = 3;
/// RSI below this is oversold
pub const RSI_OVERSOLD: f64 = 30.0;
/// RSI above this is overbought
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Latest indicator and pattern readings for one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionInputs {
    pub close: Option<f64>,
    pub sma: Option<f64>,
    pub rsi: Option<f64>,
    /// `[previous, latest]` `(macd, signal)` points
    pub macd: Option<[(f64, f64); 2]>,
    pub candlesticks: CandlestickReport,
    /// Carried for reporting; no rule votes on chart patterns
    pub chart: ChartReport,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// One rule's directional opinion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationVote {
    pub source: &'static str,
    pub direction: Direction,
    pub reason: String,
}

impl ConfirmationVote {
    fn new(source: &'static str, direction: Direction, reason: &str) -> Self {
        Self {
            source,
            direction,
            reason: reason.to_string(),
        }
    }
}

/// Outcome of one fusion pass
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Decision {
    pub confirmations: usize,
    pub direction: Option<Direction>,
    pub reasons: Vec<String>,
    pub votes: Vec<ConfirmationVote>,
    pub entry: Option<f64>,
    pub stop: Option<f64>,
    pub target: Option<f64>,
    pub risk_reward_ratio: Option<f64>,
}

impl Decision {
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.confirmations >= CONFIRMATION_THRESHOLD
    }

    fn record(&mut self, vote: ConfirmationVote) {
        debug!(source = vote.source, direction = ?vote.direction, reason = %vote.reason, "vote");
        self.confirmations += 1;
        self.direction = Some(vote.direction);
        self.reasons.push(vote.reason.clone());
        self.votes.push(vote);
    }
}

// ============================================================
// RULES
// ============================================================

fn trend_vote(inputs: &FusionInputs) -> Option<ConfirmationVote> {
    let (close, sma) = (inputs.close?, inputs.sma?);
    if close > sma {
        Some(ConfirmationVote::new("trend", Direction::Up, "Price above SMA"))
    } else if close < sma {
        Some(ConfirmationVote::new("trend", Direction::Down, "Price below SMA"))
    } else {
        None
    }
}

fn momentum_vote(inputs: &FusionInputs) -> Option<ConfirmationVote> {
    let rsi = inputs.rsi?;
    if rsi < RSI_OVERSOLD {
        Some(ConfirmationVote::new("momentum", Direction::Up, "RSI oversold"))
    } else if rsi > RSI_OVERBOUGHT {
        Some(ConfirmationVote::new("momentum", Direction::Down, "RSI overbought"))
    } else {
        None
    }
}

fn crossover_vote(inputs: &FusionInputs) -> Option<ConfirmationVote> {
    match cross_between(inputs.macd?)? {
        Cross::Bullish => Some(ConfirmationVote::new(
            "crossover",
            Direction::Up,
            "Bullish MACD crossover",
        )),
        Cross::Bearish => Some(ConfirmationVote::new(
            "crossover",
            Direction::Down,
            "Bearish MACD crossover",
        )),
    }
}

fn candlestick_vote(inputs: &FusionInputs) -> Option<ConfirmationVote> {
    let report = &inputs.candlesticks;
    if report.has_bullish_shape() {
        Some(ConfirmationVote::new(
            "candlestick",
            Direction::Up,
            "Bullish candlestick pattern",
        ))
    } else if report.has_bearish_shape() {
        Some(ConfirmationVote::new(
            "candlestick",
            Direction::Down,
            "Bearish candlestick pattern",
        ))
    } else {
        None
    }
}

fn breakout_vote(inputs: &FusionInputs) -> Option<ConfirmationVote> {
    let (close, support, resistance) = (inputs.close?, inputs.support?, inputs.resistance?);
    if close > resistance {
        Some(ConfirmationVote::new(
            "breakout",
            Direction::Up,
            "Breakout above resistance",
        ))
    } else if close < support {
        Some(ConfirmationVote::new(
            "breakout",
            Direction::Down,
            "Breakdown below support",
        ))
    } else {
        None
    }
}

/// Rules in evaluation order
const RULES: [fn(&FusionInputs) -> Option<ConfirmationVote>; 5] = [
    trend_vote,
    momentum_vote,
    crossover_vote,
    candlestick_vote,
    breakout_vote,
];

// ============================================================
// FUSION
// ============================================================

/// Combine the rule votes into a decision.
///
/// A confirmed upward decision carries a long trade plan; downward decisions
/// never do.
pub fn fuse(inputs: &FusionInputs) -> Decision {
    let mut decision = Decision::default();
    for vote in RULES.iter().filter_map(|rule| rule(inputs)) {
        decision.record(vote);
    }

    if decision.is_confirmed() && decision.direction.is_some_and(Direction::is_up) {
        if let Some(entry) = inputs.close {
            let plan = TradePlan::long(entry);
            decision.entry = Some(plan.entry);
            decision.stop = Some(plan.stop);
            decision.target = Some(plan.target);
            decision.risk_reward_ratio = plan.risk_reward();
        }
    }

    if decision.is_confirmed() {
        info!(
            confirmations = decision.confirmations,
            direction = ?decision.direction,
            entry = ?decision.entry,
            "signal confirmed"
        );
    }

    decision
}
