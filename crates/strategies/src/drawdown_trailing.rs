use crate::error::StrategyError;
use chrono::{DateTime, Duration, Utc};
use configuration::{DrawdownTrailingParams, PeakOrdering};
use core_types::{Decision, ExitReason, InstrumentState};
use rust_decimal::Decimal;

/// Drawdown-from-peak exit with trend-filtered reentry for a single instrument.
///
/// The controller holds only parameters. The per-instrument [`InstrumentState`]
/// is owned by the caller and passed in on every evaluation.
#[derive(Debug, Clone)]
pub struct DrawdownTrailingController {
    params: DrawdownTrailingParams,
}

impl DrawdownTrailingController {
    pub fn new(params: DrawdownTrailingParams) -> Result<Self, StrategyError> {
        if params.drawdown_threshold <= Decimal::ZERO || params.drawdown_threshold >= Decimal::ONE {
            return Err(StrategyError::InvalidParameters(
                "drawdown_threshold must be between 0 and 1".to_string(),
            ));
        }
        if params.allocation <= Decimal::ZERO || params.allocation > Decimal::ONE {
            return Err(StrategyError::InvalidParameters(
                "allocation must be in (0, 1]".to_string(),
            ));
        }
        if params.cooldown_days.is_some_and(|d| d < 0) {
            return Err(StrategyError::InvalidParameters(
                "cooldown_days cannot be negative".to_string(),
            ));
        }
        Ok(Self { params })
    }

    pub fn symbol(&self) -> &str {
        &self.params.symbol
    }

    pub fn allocation(&self) -> Decimal {
        self.params.allocation
    }

    /// Unconditional entry, used once when warm-up completes.
    pub fn enter_initial(&self, state: &mut InstrumentState, price: Decimal) -> Decision {
        if state.invested || price <= Decimal::ZERO {
            return Decision::Hold;
        }
        state.open(price);
        tracing::info!(symbol = %self.params.symbol, %price, "Initial buy after warm-up.");
        Decision::EnterLong {
            size: self.params.allocation,
        }
    }

    fn cooldown(&self) -> Option<Duration> {
        self.params
            .cooldown_days
            .filter(|&days| days > 0)
            .map(Duration::days)
    }

    /// Evaluates one tick.
    ///
    /// While invested the peak ratchets up and a close below
    /// `peak * (1 - drawdown_threshold)` exits. While flat, `fast_ma > slow_ma`
    /// re-enters once any cooldown has elapsed. If an exit would be immediately
    /// undone by a reentry on the same tick, nothing happens.
    pub fn evaluate(
        &self,
        state: &mut InstrumentState,
        current_price: Decimal,
        fast_ma: Decimal,
        slow_ma: Decimal,
        now: DateTime<Utc>,
    ) -> Decision {
        if current_price <= Decimal::ZERO {
            tracing::warn!(symbol = %self.params.symbol, %current_price, "Ignoring non-positive price.");
            return Decision::Hold;
        }
        let trend_up = fast_ma > slow_ma;

        if !state.invested {
            if state.in_cooldown(now) {
                tracing::debug!(symbol = %self.params.symbol, until = ?state.reentry_cooldown_until, "Reentry blocked by cooldown.");
                return Decision::Hold;
            }
            if !trend_up {
                return Decision::Hold;
            }
            state.open(current_price);
            state.reentry_cooldown_until = None;
            tracing::info!(
                symbol = %self.params.symbol,
                price = %current_price,
                %fast_ma,
                %slow_ma,
                "Reentry on fast/slow MA uptrend."
            );
            return Decision::EnterLong {
                size: self.params.allocation,
            };
        }

        let reference_peak = match self.params.peak_ordering {
            PeakOrdering::UpdateThenTest => {
                state.ratchet_peak(current_price);
                state.peak_price.unwrap_or(current_price)
            }
            PeakOrdering::TestThenUpdate => {
                let peak = state.peak_price.unwrap_or(current_price);
                state.ratchet_peak(current_price);
                peak
            }
        };

        let stop_level = reference_peak * (Decimal::ONE - self.params.drawdown_threshold);
        if current_price >= stop_level {
            return Decision::Hold;
        }

        // Exiting now would re-enter on this same tick unless a cooldown intervenes.
        if trend_up && self.cooldown().is_none() {
            tracing::debug!(
                symbol = %self.params.symbol,
                price = %current_price,
                peak = %reference_peak,
                "Drawdown breached while the reentry trend holds; staying invested."
            );
            return Decision::Hold;
        }

        state.close();
        if let Some(cooldown) = self.cooldown() {
            state.reentry_cooldown_until = Some(now + cooldown);
        }
        tracing::info!(
            symbol = %self.params.symbol,
            price = %current_price,
            peak = %reference_peak,
            stop = %stop_level,
            "Drawdown stop triggered; exiting to flat."
        );
        Decision::Exit {
            reason: ExitReason::DrawdownStop,
        }
    }
}
