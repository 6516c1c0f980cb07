use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The outcome of a single signal evaluation.
///
/// A `Decision` is pure output: the caller (the execution collaborator) is
/// responsible for turning it into an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Go long with `size` as a fraction of total portfolio value.
    EnterLong { size: Decimal },
    /// Flatten the instrument.
    Exit { reason: ExitReason },
    /// No action this evaluation.
    Hold,
}

impl Decision {
    pub fn is_entry(&self) -> bool {
        matches!(self, Decision::EnterLong { .. })
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Decision::Exit { .. })
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Decision::Hold)
    }
}

/// Why a position was flattened. Carried for logging and run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    /// Price fell too far below the running peak.
    DrawdownStop,
    /// Price fell below the fixed stop measured from the entry price.
    EntryStop,
    /// Price fell below a ratcheting trailing stop.
    TrailingStop,
    PrimaryTrailingStop,
    SecondaryTrailingStop,
    ProfitTarget,
    /// Short-term trend fell to or below the long-term trend.
    TrendReversal,
    /// Monthly MA spread fell below the dynamic sell threshold.
    CrossoverSell,
    /// The classifier was confident of a down move.
    ClassifierDown,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExitReason::DrawdownStop => "drawdown stop",
            ExitReason::EntryStop => "entry stop",
            ExitReason::TrailingStop => "trailing stop",
            ExitReason::PrimaryTrailingStop => "primary trailing stop",
            ExitReason::SecondaryTrailingStop => "secondary trailing stop",
            ExitReason::ProfitTarget => "profit target",
            ExitReason::TrendReversal => "trend reversal",
            ExitReason::CrossoverSell => "crossover sell",
            ExitReason::ClassifierDown => "classifier down",
        };
        f.write_str(label)
    }
}

/// Identifies which strategy family to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyId {
    /// SPY adaptive monthly crossover plus TQQQ drawdown-trailing hold.
    Combined,
    /// SPXL multi-tier trailing stops behind a VIX gate.
    LeveragedTrend,
    /// SPY confidence-gated classifier.
    Classifier,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [
        StrategyId::Combined,
        StrategyId::LeveragedTrend,
        StrategyId::Classifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Combined => "combined",
            StrategyId::LeveragedTrend => "leveraged-trend",
            StrategyId::Classifier => "classifier",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput("strategy".to_string(), s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn strategy_id_parses_its_own_label() {
        for id in StrategyId::ALL {
            assert_eq!(id.as_str().parse::<StrategyId>(), Ok(id));
        }
        assert!("momentum".parse::<StrategyId>().is_err());
    }

    #[test]
    fn decision_predicates_are_exclusive() {
        let enter = Decision::EnterLong { size: dec!(0.5) };
        let exit = Decision::Exit { reason: ExitReason::DrawdownStop };
        assert!(enter.is_entry() && !enter.is_exit() && !enter.is_hold());
        assert!(exit.is_exit() && !exit.is_entry());
        assert!(Decision::Hold.is_hold());
    }
}
