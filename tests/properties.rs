//! Property tests for indicator and fusion invariants.
//!
//! - SMA length and window mean
//! - EMA recurrence
//! - RSI bounds
//! - Idempotent evaluation
//! - Risk/reward sign

use confluence::prelude::*;
use proptest::prelude::*;

// ============================================================
// STRATEGIES
// ============================================================

fn arb_closes(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1000.0_f64, min..max)
}

/// Well-formed bars built around a random walk of closes
fn arb_series() -> impl Strategy<Value = BarSeries> {
    prop::collection::vec((1.0..500.0_f64, 0.0..5.0_f64, 0.0..5.0_f64, -3.0..3.0_f64), 0..80)
        .prop_map(|rows| {
            BarSeries::from_bars(rows.into_iter().enumerate().map(|(i, (c, up, down, drift))| {
                let o = (c + drift).max(0.5);
                let h = o.max(c) + up;
                let l = (o.min(c) - down).max(0.0);
                Bar::new(i as i64, o, h, l, c, 100.0)
            }))
            .unwrap()
        })
}

fn closes(values: &[f64]) -> BarSeries {
    BarSeries::from_bars(
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64, c, c, c, c, 1.0)),
    )
    .unwrap()
}

// ============================================================
// MOVING AVERAGES
// ============================================================

proptest! {
    #[test]
    fn sma_length_and_mean(values in arb_closes(1, 60), period in 1usize..20) {
        prop_assume!(period <= values.len());
        let line = sma(&closes(&values), Period::new(period).unwrap()).unwrap();

        prop_assert_eq!(line.len(), values.len() - period + 1);
        for (i, v) in line.iter() {
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            prop_assert!((v.unwrap() - mean).abs() < 1e-9 * mean.max(1.0));
        }
    }

    #[test]
    fn ema_recurrence_holds(values in arb_closes(2, 60), period in 1usize..30) {
        let p = Period::new(period).unwrap();
        let line = ema(&closes(&values), p);
        let alpha = 2.0 / (period as f64 + 1.0);

        prop_assert_eq!(line.get(0), Some(values[0]));
        for i in 1..values.len() {
            let expected = values[i] * alpha + line.get(i - 1).unwrap() * (1.0 - alpha);
            prop_assert!((line.get(i).unwrap() - expected).abs() < 1e-9);
        }
    }
}

// ============================================================
// OSCILLATORS
// ============================================================

proptest! {
    #[test]
    fn rsi_within_bounds(values in arb_closes(2, 60), period in 1usize..20, smoothed in any::<bool>()) {
        let line = rsi(&closes(&values), Period::new(period).unwrap(), smoothed);
        for (_, v) in line.iter() {
            let v = v.unwrap();
            prop_assert!((0.0..=100.0 + 1e-9).contains(&v));
        }
    }

    #[test]
    fn rsi_non_decreasing_is_100(start in 1.0..100.0_f64, steps in prop::collection::vec(0.0..5.0_f64, 2..40)) {
        let values: Vec<f64> = steps
            .iter()
            .scan(start, |price, step| {
                *price += step;
                Some(*price)
            })
            .collect();
        let line = rsi(&closes(&values), Period::new(1).unwrap(), false);
        prop_assert!(line.iter().all(|(_, v)| v == Some(100.0)));
    }

    #[test]
    fn stochastic_within_bounds(series in arb_series(), k in 1usize..15, d in 1usize..5) {
        let stoch = stochastic(&series, Period::new(k).unwrap(), Period::new(d).unwrap());
        for (_, v) in stoch.k.iter().chain(stoch.d.iter()) {
            if let Some(v) = v {
                prop_assert!((-1e-9..=100.0 + 1e-9).contains(&v));
            }
        }
    }
}

// ============================================================
// DETECTORS AND FUSION
// ============================================================

proptest! {
    #[test]
    fn evaluation_is_idempotent(series in arb_series()) {
        let engine = EngineBuilder::new().build().unwrap();
        let first = engine.evaluate(&series);
        let second = engine.evaluate(&series);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.decision.votes.len(), first.decision.confirmations);
        prop_assert!(first.decision.confirmations <= 5);
    }

    #[test]
    fn plan_only_when_confirmed_up(series in arb_series()) {
        let decision = EngineBuilder::new().build().unwrap().evaluate(&series).decision;
        if decision.entry.is_some() {
            prop_assert!(decision.is_confirmed());
            prop_assert_eq!(decision.direction, Some(Direction::Up));
            prop_assert!((decision.risk_reward_ratio.unwrap() - 2.5).abs() < 1e-6);
        }
    }

    #[test]
    fn fibonacci_levels_ordered(series in arb_series()) {
        if let Some(levels) = fibonacci(&series) {
            let ordered = levels.as_array();
            prop_assert!(ordered.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn risk_reward_sign(entry in 1.0..1000.0_f64, risk in 0.01..0.5_f64, reward in 0.0..0.5_f64) {
        let stop = entry * (1.0 - risk);
        let target = entry * (1.0 + reward);
        let ratio = risk_reward(entry, stop, target).unwrap();
        prop_assert!(ratio >= 0.0);
    }
}
