//! Integration tests for signal fusion and the evaluation engine.

use confluence::fusion::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use confluence::prelude::*;

fn quiet_candles() -> CandlestickReport {
    CandlestickReport {
        doji: Doji::Absent,
        engulfing: Engulfing::NoEngulfing,
        hammer: Hammer::Absent,
        hanging_man: HangingMan::Absent,
        morning_star: MorningStar::Absent,
        inverted_hammer: InvertedHammer::Absent,
        shooting_star: ShootingStar::Absent,
    }
}

fn quiet_inputs(close: f64) -> FusionInputs {
    FusionInputs {
        close: Some(close),
        sma: None,
        rsi: None,
        macd: None,
        candlesticks: quiet_candles(),
        chart: classify_chart(&BarSeries::default()),
        support: None,
        resistance: None,
    }
}

/// Bullish bars climbing 2 per bar
fn make_uptrend(n: usize) -> Vec<RawBar> {
    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64 * 2.0;
            RawBar::new(i as i64 * 60_000, base - 0.5, base + 1.5, base - 1.5, base + 1.0, 1000.0)
        })
        .collect()
}

/// Bearish bars falling 2 per bar
fn make_downtrend(n: usize) -> Vec<RawBar> {
    (0..n)
        .map(|i| {
            let base = 200.0 - i as f64 * 2.0;
            RawBar::new(i as i64 * 60_000, base + 0.5, base + 1.5, base - 1.5, base - 1.0, 1000.0)
        })
        .collect()
}

// ============================================================
// FUSION RULES
// ============================================================

#[test]
fn test_four_bullish_confirmations() {
    let mut candles = quiet_candles();
    candles.engulfing = Engulfing::Bullish;
    let close = 250.0;

    let decision = fuse(&FusionInputs {
        sma: Some(240.0),
        rsi: Some(25.0),
        macd: Some([(-0.5, 0.1), (0.4, 0.2)]),
        candlesticks: candles,
        ..quiet_inputs(close)
    });

    assert!(decision.confirmations >= 4);
    assert!(decision.is_confirmed());
    assert_eq!(decision.direction, Some(Direction::Up));
    assert_eq!(decision.entry, Some(close));
    assert_eq!(decision.stop, Some(close * 0.98));
    assert_eq!(decision.target, Some(close * 1.05));
    assert!((decision.risk_reward_ratio.unwrap() - 2.5).abs() < 1e-9);
    assert_eq!(
        decision.reasons,
        vec![
            "Price above SMA",
            "RSI oversold",
            "Bullish MACD crossover",
            "Bullish candlestick pattern",
        ]
    );
}

#[test]
fn test_rsi_bands_are_strict() {
    let at_oversold = fuse(&FusionInputs { rsi: Some(RSI_OVERSOLD), ..quiet_inputs(1.0) });
    let at_overbought = fuse(&FusionInputs { rsi: Some(RSI_OVERBOUGHT), ..quiet_inputs(1.0) });
    assert_eq!(at_oversold.confirmations, 0);
    assert_eq!(at_overbought.confirmations, 0);
}

#[test]
fn test_two_votes_not_confirmed() {
    let decision = fuse(&FusionInputs {
        sma: Some(90.0),
        macd: Some([(0.0, 1.0), (2.0, 1.0)]),
        ..quiet_inputs(100.0)
    });
    assert_eq!(decision.confirmations, 2);
    assert!(!decision.is_confirmed());
    assert!(decision.entry.is_none());
}

#[test]
fn test_missing_close_silences_price_rules() {
    let decision = fuse(&FusionInputs {
        close: None,
        sma: Some(90.0),
        support: Some(80.0),
        resistance: Some(85.0),
        rsi: Some(80.0),
        ..quiet_inputs(0.0)
    });
    assert_eq!(decision.confirmations, 1);
    assert_eq!(decision.direction, Some(Direction::Down));
}

#[test]
fn test_decision_serializes() {
    let decision = fuse(&FusionInputs { sma: Some(90.0), ..quiet_inputs(100.0) });
    let json = serde_json::to_value(&decision).unwrap();

    assert_eq!(json["confirmations"], 1);
    assert_eq!(json["direction"], "Up");
    assert_eq!(json["votes"][0]["source"], "trend");
    assert!(json["entry"].is_null());
}

// ============================================================
// ENGINE
// ============================================================

#[test]
fn test_uptrend_votes() {
    let engine = EngineBuilder::new().build().unwrap();
    let series = BarSeries::ingest(&make_uptrend(40)).unwrap();
    let evaluation = engine.evaluate(&series);
    let decision = &evaluation.decision;

    // trend up, then RSI pinned at 100 votes down last
    assert_eq!(decision.reasons, vec!["Price above SMA", "RSI overbought"]);
    assert_eq!(decision.direction, Some(Direction::Down));
    assert!(!decision.is_confirmed());
    assert!(evaluation.support.is_none());
    assert!(evaluation.resistance.is_none());
    assert_eq!(evaluation.candlesticks.doji, Doji::Present);
}

#[test]
fn test_downtrend_votes() {
    let engine = EngineBuilder::new().build().unwrap();
    let series = BarSeries::ingest(&make_downtrend(40)).unwrap();
    let decision = engine.evaluate(&series).decision;

    assert_eq!(decision.reasons, vec!["Price below SMA", "RSI oversold"]);
    assert_eq!(decision.direction, Some(Direction::Up));
    assert_eq!(decision.confirmations, 2);
}

#[test]
fn test_evaluate_matches_fuse_of_inputs() {
    let engine = EngineBuilder::new()
        .sma_period(Period::new(5).unwrap())
        .rsi(Period::new(5).unwrap(), false)
        .macd(Period::new(3).unwrap(), Period::new(6).unwrap(), Period::new(3).unwrap())
        .support_window(Period::new(2).unwrap())
        .build()
        .unwrap();

    let mut rows = make_uptrend(20);
    rows.extend(make_downtrend(20).into_iter().map(|mut r| {
        r.timestamp += 20 * 60_000;
        r
    }));
    let series = BarSeries::ingest(&rows).unwrap();

    let evaluation = engine.evaluate(&series);
    assert_eq!(evaluation.decision, fuse(&engine.inputs(&series)));
    assert_eq!(evaluation.decision.votes.len(), evaluation.decision.confirmations);
    assert!(evaluation.fibonacci.is_some());
    assert!(evaluation.stochastic_k.is_some());
}

#[test]
fn test_short_series_degrades_quietly() {
    let engine = EngineBuilder::new().build().unwrap();
    let series = BarSeries::ingest(&make_uptrend(3)).unwrap();
    let evaluation = engine.evaluate(&series);

    assert_eq!(evaluation.decision.confirmations, 0);
    assert!(evaluation.stochastic_k.is_none());
    assert!(evaluation.macd_histogram.is_some());
}

#[test]
fn test_engine_from_json_config() {
    let config: FusionConfig =
        serde_json::from_str(r#"{"sma_period": 5, "macd_fast": 30}"#).unwrap();
    assert!(EngineBuilder::new().config(config).build().is_err());

    let config: FusionConfig = serde_json::from_str(r#"{"sma_period": 5}"#).unwrap();
    let engine = EngineBuilder::new().config(config).build().unwrap();
    assert_eq!(engine.config().sma_period.get(), 5);
}

#[test]
fn test_parallel_with_text_fields() {
    let engine = EngineBuilder::new().build().unwrap();
    let text_rows: Vec<RawBar> = make_uptrend(30)
        .into_iter()
        .map(|r| {
            let close = r.close.coerce().unwrap().to_string();
            RawBar { close: RawValue::Text(close), ..r }
        })
        .collect();
    let numeric_rows = make_uptrend(30);

    let instruments: Vec<(&str, &[RawBar])> =
        vec![("text", &text_rows[..]), ("numeric", &numeric_rows[..])];
    let (results, errors) = evaluate_parallel(&engine, instruments);

    assert!(errors.is_empty());
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].evaluation.decision, results[1].evaluation.decision);
}
