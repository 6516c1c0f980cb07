use chrono::{DateTime, NaiveDate, Utc};
use core_types::StrategyId;
use engine::RunStats;
use rust_decimal::Decimal;
use serde::Serialize;

/// The outcome of one replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub strategy: StrategyId,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub trading_days: usize,
    pub warmup_days: usize,

    pub initial_capital: Decimal,
    pub final_value: Decimal,
    pub total_return_pct: Decimal,
    /// Largest peak-to-trough fall of the equity curve, in percent.
    pub max_drawdown_pct: Decimal,

    pub fills: usize,
    pub stats: RunStats,
}

/// Largest peak-to-trough fall over `curve`, as a percentage of the peak.
pub fn max_drawdown_pct(curve: &[(DateTime<Utc>, Decimal)]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;
    for (_, equity) in curve {
        peak = peak.max(*equity);
        if peak > Decimal::ZERO {
            worst = worst.max((peak - *equity) / peak);
        }
    }
    worst * Decimal::ONE_HUNDRED
}

/// Percentage change from `initial` to `final_value`; zero when nothing was invested.
pub fn total_return_pct(initial: Decimal, final_value: Decimal) -> Decimal {
    if initial.is_zero() {
        return Decimal::ZERO;
    }
    (final_value - initial) / initial * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn drawdown_tracks_the_worst_fall_not_the_last() {
        let t = DateTime::<Utc>::default();
        let curve = [dec!(100), dec!(120), dec!(90), dec!(130), dec!(117)].map(|v| (t, v));
        assert_eq!(max_drawdown_pct(&curve), dec!(25));
        assert_eq!(max_drawdown_pct(&[]), dec!(0));
    }

    #[test]
    fn total_return() {
        assert_eq!(total_return_pct(dec!(100000), dec!(112500)), dec!(12.5));
        assert_eq!(total_return_pct(dec!(0), dec!(5)), dec!(0));
    }
}
