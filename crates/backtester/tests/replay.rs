//! End-to-end replays over synthetic CSV history.

use backtester::{BacktestError, Backtester, read_slices};
use configuration::Config;
use core_types::StrategyId;
use engine::create_algorithm;
use executor::Broker;
use rust_decimal_macros::dec;
use std::fmt::Write;

// ── Fixtures ──

/// `days` consecutive calendar days from 2020-01-01, one row per symbol.
fn history(days: u32, mut row: impl FnMut(u32) -> Vec<(&'static str, f64)>) -> String {
    let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let mut csv = String::from("date,symbol,open,high,low,close,volume\n");
    for day in 0..days {
        let date = start + chrono::Duration::days(i64::from(day));
        for (symbol, close) in row(day) {
            writeln!(csv, "{date},{symbol},{close},{close},{close},{close},1000").unwrap();
        }
    }
    csv
}

fn combined_config() -> Config {
    let mut config = Config::default();
    config.combined.spy.short_period = 1;
    config.combined.spy.long_period = 2;
    config.validate().unwrap();
    config
}

// ── Combined ──

#[test]
fn combined_enters_both_legs_and_stops_out_of_the_crash() {
    // SPY climbs a point a day; TQQQ climbs then gaps down 36% from its peak on day 120.
    let csv = history(150, |day| {
        let spy = 100.0 + f64::from(day);
        let tqqq = if day < 120 { 50.0 + f64::from(day) * 0.5 } else { 70.0 };
        vec![("SPY", spy), ("TQQQ", tqqq)]
    });
    let slices = read_slices(csv.as_bytes()).unwrap();
    let config = combined_config();
    let algorithm = create_algorithm(StrategyId::Combined, &config).unwrap();
    let mut backtester = Backtester::new(algorithm, &config.simulation);

    let report = backtester.run(&slices).unwrap();

    assert_eq!(report.warmup_days, 42);
    assert_eq!(report.trading_days, 150);
    assert_eq!(report.stats.entries_for("TQQQ"), 1);
    assert_eq!(report.stats.exits_for("TQQQ"), 1);
    assert_eq!(report.stats.exit_reasons.get("drawdown stop"), Some(&1));
    // Feb is the first full month seen after warm-up, Mar the second
    assert_eq!(report.stats.entries_for("SPY"), 1);
    assert_eq!(report.stats.exits_for("SPY"), 0);

    let broker = backtester.broker();
    assert!(broker.is_invested("SPY"));
    assert!(!broker.is_invested("TQQQ"));
    assert_eq!(report.final_value, broker.total_value());
    assert_eq!(backtester.equity_curve().len(), 150);
    assert!(report.max_drawdown_pct > dec!(0));
}

#[test]
fn warm_up_longer_than_history_leaves_cash_untouched() {
    let csv = history(30, |day| vec![("SPY", 100.0 + f64::from(day)), ("TQQQ", 50.0)]);
    let slices = read_slices(csv.as_bytes()).unwrap();
    let config = Config::default();
    let algorithm = create_algorithm(StrategyId::Combined, &config).unwrap();
    let mut backtester = Backtester::new(algorithm, &config.simulation);

    let report = backtester.run(&slices).unwrap();
    assert_eq!(report.fills, 0);
    assert_eq!(report.final_value, config.simulation.initial_capital);
    assert_eq!(report.total_return_pct, dec!(0));
}

// ── Leveraged trend ──

#[test]
fn leveraged_trend_rides_the_trend_and_exits_on_the_trailing_stop() {
    let mut config = Config::default();
    config.leveraged_trend.short_sma_period = 3;
    config.leveraged_trend.long_sma_period = 6;
    config.validate().unwrap();

    // Rise for 40 days, then drop 10% in one day.
    let csv = history(45, |day| {
        let spxl = if day < 40 { 100.0 + f64::from(day) } else { 125.0 };
        vec![("SPXL", spxl), ("VIX", 14.0)]
    });
    let slices = read_slices(csv.as_bytes()).unwrap();
    let algorithm = create_algorithm(StrategyId::LeveragedTrend, &config).unwrap();
    let mut backtester = Backtester::new(algorithm, &config.simulation);

    let report = backtester.run(&slices).unwrap();
    assert_eq!(report.stats.entries_for("SPXL"), 1);
    assert_eq!(report.stats.exit_reasons.get("primary trailing stop"), Some(&1));
    assert!(!backtester.broker().is_invested("SPXL"));
}

// ── Errors ──

#[test]
fn empty_history_is_an_error() {
    let config = Config::default();
    let algorithm = create_algorithm(StrategyId::Classifier, &config).unwrap();
    let mut backtester = Backtester::new(algorithm, &config.simulation);
    assert!(matches!(backtester.run(&[]), Err(BacktestError::DataUnavailable)));
}
