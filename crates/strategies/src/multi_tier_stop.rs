use crate::error::StrategyError;
use configuration::LeveragedTrendParams;
use core_types::{Decision, ExitReason};
use rust_decimal::Decimal;

/// Position state for the multi-tier stop controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TierState {
    #[default]
    Flat,
    /// Held with the tight primary trailing stop active.
    HoldingPrimary { highest_price: Decimal },
    /// Held with the wider secondary trailing stop active.
    HoldingSecondaryArmed { highest_price: Decimal },
}

impl TierState {
    pub fn is_holding(&self) -> bool {
        !matches!(self, TierState::Flat)
    }

    pub fn highest_price(&self) -> Option<Decimal> {
        match self {
            TierState::Flat => None,
            TierState::HoldingPrimary { highest_price }
            | TierState::HoldingSecondaryArmed { highest_price } => Some(*highest_price),
        }
    }
}

/// Trend-filtered leveraged long with tiered trailing stops, a profit target
/// and VIX-scaled sizing.
#[derive(Debug, Clone)]
pub struct MultiTierStopController {
    params: LeveragedTrendParams,
}

impl MultiTierStopController {
    pub fn new(params: LeveragedTrendParams) -> Result<Self, StrategyError> {
        for (name, pct) in [
            ("primary_trailing_pct", params.primary_trailing_pct),
            ("secondary_trailing_pct", params.secondary_trailing_pct),
        ] {
            if pct <= Decimal::ZERO || pct >= Decimal::ONE {
                return Err(StrategyError::InvalidParameters(format!(
                    "{name} must be between 0 and 1"
                )));
            }
        }
        if params.profit_target_pct <= Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(
                "profit_target_pct must be positive".to_string(),
            ));
        }
        if params.vix_full_size_below > params.vix_entry_ceiling {
            return Err(StrategyError::InvalidParameters(
                "vix_full_size_below cannot exceed vix_entry_ceiling".to_string(),
            ));
        }
        Ok(Self { params })
    }

    pub fn symbol(&self) -> &str {
        &self.params.symbol
    }

    pub fn vix_symbol(&self) -> &str {
        &self.params.vix_symbol
    }

    /// Allocation fraction for a VIX level.
    ///
    /// The minimum size only applies at or above the entry ceiling, where the
    /// entry gate already blocks everything but a reading exactly at it.
    pub fn position_size(&self, vix: Decimal) -> Decimal {
        if vix < self.params.vix_full_size_below {
            self.params.full_size
        } else if vix < self.params.vix_entry_ceiling {
            self.params.reduced_size
        } else {
            self.params.minimum_size
        }
    }

    /// Switches a held position to the secondary tier. No-op when flat.
    pub fn arm_secondary(&self, state: &mut TierState) {
        if let TierState::HoldingPrimary { highest_price } = *state {
            *state = TierState::HoldingSecondaryArmed { highest_price };
        }
    }

    /// Evaluates one daily tick.
    ///
    /// Stops and the profit target compare against the highest price seen
    /// before this tick; the highest price is then ratcheted. A trend flip exits
    /// regardless of VIX. New entries need an uptrend and VIX at or below the
    /// ceiling.
    pub fn evaluate(
        &self,
        state: &mut TierState,
        price: Decimal,
        short_sma: Decimal,
        long_sma: Decimal,
        vix: Decimal,
    ) -> Decision {
        let trend_up = short_sma > long_sma;

        match *state {
            TierState::HoldingPrimary { highest_price } | TierState::HoldingSecondaryArmed { highest_price } => {
                let secondary = matches!(*state, TierState::HoldingSecondaryArmed { .. });
                let (trailing_pct, reason) = if secondary {
                    (self.params.secondary_trailing_pct, ExitReason::SecondaryTrailingStop)
                } else {
                    (self.params.primary_trailing_pct, ExitReason::PrimaryTrailingStop)
                };

                let stop = highest_price * (Decimal::ONE - trailing_pct);
                if price < stop {
                    tracing::info!(symbol = %self.params.symbol, %price, %highest_price, %stop, %reason, "Trailing stop triggered.");
                    *state = TierState::Flat;
                    return Decision::Exit { reason };
                }

                let target = highest_price * (Decimal::ONE + self.params.profit_target_pct);
                if price > target {
                    tracing::info!(symbol = %self.params.symbol, %price, %target, "Profit target hit.");
                    *state = TierState::Flat;
                    return Decision::Exit {
                        reason: ExitReason::ProfitTarget,
                    };
                }

                if !trend_up {
                    tracing::info!(symbol = %self.params.symbol, %price, %short_sma, %long_sma, "Trend filter flipped; exiting.");
                    *state = TierState::Flat;
                    return Decision::Exit {
                        reason: ExitReason::TrendReversal,
                    };
                }

                let highest_price = highest_price.max(price);
                *state = if secondary {
                    TierState::HoldingSecondaryArmed { highest_price }
                } else {
                    TierState::HoldingPrimary { highest_price }
                };
                Decision::Hold
            }
            TierState::Flat => {
                if vix > self.params.vix_entry_ceiling {
                    tracing::debug!(symbol = %self.params.symbol, %vix, "VIX above the entry ceiling; no entry.");
                    return Decision::Hold;
                }
                if !trend_up {
                    return Decision::Hold;
                }
                let size = self.position_size(vix);
                *state = TierState::HoldingPrimary { highest_price: price };
                tracing::info!(symbol = %self.params.symbol, %price, %vix, %size, "Trend entry.");
                Decision::EnterLong { size }
            }
        }
    }
}
