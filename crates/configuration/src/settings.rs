use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing values fall back to
/// the constants the strategies were tuned with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: Logging,
    pub simulation: Simulation,
    pub combined: CombinedParams,
    pub leveraged_trend: LeveragedTrendParams,
    pub classifier: ClassifierParams,
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// An `EnvFilter` directive, e.g. `"info"` or `"strategies=debug,info"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Contains parameters for the replay harness.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// The initial starting capital for the simulation.
    pub initial_capital: Decimal,
    /// Commission charged on every fill, as a fraction of its notional value.
    pub commission_pct: Decimal,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100000),
            commission_pct: dec!(0),
        }
    }
}

/// Whether the running peak absorbs the current tick before or after the
/// drawdown comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakOrdering {
    /// `peak = max(peak, price)` first, then `price < peak * (1 - dd)`.
    #[default]
    UpdateThenTest,
    /// Compare against the peak known before this tick, then ratchet.
    TestThenUpdate,
}

/// Parameters for the drawdown-trailing position controller (TQQQ leg).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DrawdownTrailingParams {
    pub symbol: String,
    /// Fraction of portfolio value to hold when invested.
    pub allocation: Decimal,
    /// Proportional drop from the running peak that forces an exit.
    pub drawdown_threshold: Decimal,
    pub fast_ma_period: usize,
    pub slow_ma_period: usize,
    /// Days to wait after a drawdown exit before reentry is allowed.
    pub cooldown_days: Option<i64>,
    pub peak_ordering: PeakOrdering,
}

impl Default for DrawdownTrailingParams {
    fn default() -> Self {
        Self {
            symbol: "TQQQ".to_string(),
            allocation: dec!(0.5),
            drawdown_threshold: dec!(0.30),
            fast_ma_period: 100,
            slow_ma_period: 300,
            cooldown_days: None,
            peak_ordering: PeakOrdering::UpdateThenTest,
        }
    }
}

/// Parameters for the adaptive monthly MA-crossover engine (SPY leg).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdaptiveCrossoverParams {
    pub symbol: String,
    pub allocation: Decimal,
    /// Short MA period, in months.
    pub short_period: usize,
    /// Long MA period, in months.
    pub long_period: usize,
    pub atr_period: usize,
    pub rsi_period: usize,
    pub base_buy_threshold: Decimal,
    pub base_sell_threshold: Decimal,
    /// Buy threshold multiplier while capital preservation is active.
    pub preservation_buy_mult: Decimal,
    /// Sell threshold multiplier while capital preservation is active.
    pub preservation_sell_mult: Decimal,
}

impl Default for AdaptiveCrossoverParams {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            allocation: dec!(0.5),
            short_period: 1,
            long_period: 3,
            atr_period: 14,
            rsi_period: 14,
            base_buy_threshold: dec!(0.02),
            base_sell_threshold: dec!(0.05),
            preservation_buy_mult: dec!(1.5),
            preservation_sell_mult: dec!(2.0),
        }
    }
}

/// Fixed and trailing stops measured from a crossover entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EntryStopParams {
    pub stop_loss_pct: Decimal,
    pub trailing_stop_pct: Decimal,
}

impl Default for EntryStopParams {
    fn default() -> Self {
        Self {
            stop_loss_pct: dec!(0.15),
            trailing_stop_pct: dec!(0.15),
        }
    }
}

/// Portfolio-level drawdown that switches capital preservation on.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CapitalPreservationParams {
    pub max_drawdown_threshold: Decimal,
    /// Keeps the mode on for this many days after the last breach.
    pub cooldown_days: Option<i64>,
}

impl Default for CapitalPreservationParams {
    fn default() -> Self {
        Self {
            max_drawdown_threshold: dec!(0.20),
            cooldown_days: None,
        }
    }
}

/// The SPY + TQQQ combined allocation strategy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CombinedParams {
    pub spy: AdaptiveCrossoverParams,
    pub spy_stops: EntryStopParams,
    pub tqqq: DrawdownTrailingParams,
    pub capital_preservation: CapitalPreservationParams,
}

impl CombinedParams {
    /// Trading days of warm-up: roughly 21 per month of the long MA.
    pub fn warmup_days(&self) -> usize {
        self.spy.long_period * 21
    }
}

/// The SPXL multi-tier stop strategy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeveragedTrendParams {
    pub symbol: String,
    pub vix_symbol: String,
    pub short_sma_period: usize,
    pub long_sma_period: usize,
    pub primary_trailing_pct: Decimal,
    pub secondary_trailing_pct: Decimal,
    pub profit_target_pct: Decimal,
    /// Entries are skipped entirely above this VIX level.
    pub vix_entry_ceiling: Decimal,
    /// Full size strictly below this VIX level.
    pub vix_full_size_below: Decimal,
    pub full_size: Decimal,
    pub reduced_size: Decimal,
    pub minimum_size: Decimal,
}

impl Default for LeveragedTrendParams {
    fn default() -> Self {
        Self {
            symbol: "SPXL".to_string(),
            vix_symbol: "VIX".to_string(),
            short_sma_period: 50,
            long_sma_period: 200,
            primary_trailing_pct: dec!(0.05),
            secondary_trailing_pct: dec!(0.10),
            profit_target_pct: dec!(0.10),
            vix_entry_ceiling: dec!(20),
            vix_full_size_below: dec!(15),
            full_size: dec!(1),
            reduced_size: dec!(0.75),
            minimum_size: dec!(0.5),
        }
    }
}

impl LeveragedTrendParams {
    pub fn warmup_days(&self) -> usize {
        self.long_sma_period
    }
}

/// The confidence-gated classifier strategy and its model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    pub symbol: String,
    pub vix_symbol: String,
    pub confidence_threshold: f64,
    pub vix_threshold: Decimal,
    pub trend_sma_period: usize,
    pub warmup_days: usize,
    /// Number of trailing days the model is fitted on.
    pub lookback_days: usize,
    /// Refits with fewer usable rows than this are skipped.
    pub min_training_samples: usize,
    pub horizons: Vec<usize>,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_leaf: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            vix_symbol: "VIX".to_string(),
            confidence_threshold: 0.6,
            vix_threshold: dec!(20),
            trend_sma_period: 200,
            warmup_days: 1000,
            lookback_days: 1500,
            min_training_samples: 10,
            horizons: vec![2, 5, 60, 250],
            n_trees: 25,
            max_depth: 5,
            min_samples_leaf: 5,
        }
    }
}

// ---===[ Validation ]===---

fn check_fraction(name: &str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO || value >= Decimal::ONE {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be strictly between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

fn check_allocation(name: &str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be in (0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_periods(name: &str, fast: usize, slow: usize) -> Result<(), ConfigError> {
    if fast == 0 || slow == 0 {
        return Err(ConfigError::ValidationError(format!("{name} periods cannot be zero")));
    }
    if fast > slow {
        return Err(ConfigError::ValidationError(format!(
            "{name}: fast period {fast} must not exceed slow period {slow}"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be greater than 0, got {value}"
        )));
    }
    Ok(())
}

impl Config {
    /// Rejects parameter sets no strategy could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("simulation.initial_capital", self.simulation.initial_capital)?;
        let commission = self.simulation.commission_pct;
        if commission < Decimal::ZERO || commission >= Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "simulation.commission_pct must be in [0, 1), got {commission}"
            )));
        }

        let combined = &self.combined;
        check_allocation("combined.spy.allocation", combined.spy.allocation)?;
        check_allocation("combined.tqqq.allocation", combined.tqqq.allocation)?;
        if combined.spy.allocation + combined.tqqq.allocation > Decimal::ONE {
            return Err(ConfigError::ValidationError(
                "combined spy + tqqq allocations exceed the whole portfolio".to_string(),
            ));
        }
        check_periods("combined.spy", combined.spy.short_period, combined.spy.long_period)?;
        if combined.spy.atr_period == 0 || combined.spy.rsi_period == 0 {
            return Err(ConfigError::ValidationError(
                "combined.spy indicator periods cannot be zero".to_string(),
            ));
        }
        check_positive("combined.spy.base_buy_threshold", combined.spy.base_buy_threshold)?;
        check_positive("combined.spy.base_sell_threshold", combined.spy.base_sell_threshold)?;
        check_positive("combined.spy.preservation_buy_mult", combined.spy.preservation_buy_mult)?;
        check_positive("combined.spy.preservation_sell_mult", combined.spy.preservation_sell_mult)?;
        check_fraction("combined.spy_stops.stop_loss_pct", combined.spy_stops.stop_loss_pct)?;
        check_fraction("combined.spy_stops.trailing_stop_pct", combined.spy_stops.trailing_stop_pct)?;
        check_fraction("combined.tqqq.drawdown_threshold", combined.tqqq.drawdown_threshold)?;
        check_periods("combined.tqqq", combined.tqqq.fast_ma_period, combined.tqqq.slow_ma_period)?;
        check_fraction(
            "combined.capital_preservation.max_drawdown_threshold",
            combined.capital_preservation.max_drawdown_threshold,
        )?;
        for (name, days) in [
            ("combined.tqqq.cooldown_days", combined.tqqq.cooldown_days),
            ("combined.capital_preservation.cooldown_days", combined.capital_preservation.cooldown_days),
        ] {
            if days.is_some_and(|d| d < 0) {
                return Err(ConfigError::ValidationError(format!("{name} cannot be negative")));
            }
        }

        let lt = &self.leveraged_trend;
        check_periods("leveraged_trend", lt.short_sma_period, lt.long_sma_period)?;
        check_fraction("leveraged_trend.primary_trailing_pct", lt.primary_trailing_pct)?;
        check_fraction("leveraged_trend.secondary_trailing_pct", lt.secondary_trailing_pct)?;
        check_positive("leveraged_trend.profit_target_pct", lt.profit_target_pct)?;
        check_allocation("leveraged_trend.full_size", lt.full_size)?;
        check_allocation("leveraged_trend.reduced_size", lt.reduced_size)?;
        check_allocation("leveraged_trend.minimum_size", lt.minimum_size)?;
        if lt.vix_full_size_below > lt.vix_entry_ceiling {
            return Err(ConfigError::ValidationError(
                "leveraged_trend.vix_full_size_below must not exceed vix_entry_ceiling".to_string(),
            ));
        }

        let clf = &self.classifier;
        if !(0.0..1.0).contains(&clf.confidence_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "classifier.confidence_threshold must be in [0, 1), got {}",
                clf.confidence_threshold
            )));
        }
        if clf.trend_sma_period == 0 || clf.lookback_days == 0 || clf.n_trees == 0 {
            return Err(ConfigError::ValidationError(
                "classifier periods and tree count cannot be zero".to_string(),
            ));
        }
        if clf.horizons.is_empty() || clf.horizons.contains(&0) {
            return Err(ConfigError::ValidationError(
                "classifier.horizons must be non-empty and positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
        assert_eq!(CombinedParams::default().warmup_days(), 63);
        assert_eq!(LeveragedTrendParams::default().warmup_days(), 200);
    }

    #[test]
    fn rejects_inverted_periods() {
        let mut config = Config::default();
        config.combined.tqqq.fast_ma_period = 400;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("combined.tqqq"));
    }

    #[test]
    fn rejects_out_of_range_drawdown() {
        let mut config = Config::default();
        config.combined.capital_preservation.max_drawdown_threshold = dec!(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_over_allocation() {
        let mut config = Config::default();
        config.combined.tqqq.allocation = dec!(0.75);
        assert!(config.validate().is_err());
    }
}
