use crate::error::StrategyError;
use configuration::EntryStopParams;
use core_types::{Decision, ExitReason, InstrumentState};
use rust_decimal::Decimal;

/// A fixed stop below the entry price plus a trailing stop that only ratchets up.
///
/// Layered over crossover entries; it never enters on its own.
#[derive(Debug, Clone)]
pub struct EntryStopOverlay {
    params: EntryStopParams,
}

impl EntryStopOverlay {
    pub fn new(params: EntryStopParams) -> Result<Self, StrategyError> {
        for (name, pct) in [
            ("stop_loss_pct", params.stop_loss_pct),
            ("trailing_stop_pct", params.trailing_stop_pct),
        ] {
            if pct <= Decimal::ZERO || pct >= Decimal::ONE {
                return Err(StrategyError::InvalidParameters(format!(
                    "{name} must be between 0 and 1"
                )));
            }
        }
        Ok(Self { params })
    }

    /// Records an entry at `entry_price` and arms both stops.
    pub fn arm(&self, state: &mut InstrumentState, entry_price: Decimal) {
        state.open(entry_price);
        state.trailing_stop_price = Some(entry_price * (Decimal::ONE - self.params.trailing_stop_pct));
    }

    /// Checks both stops against `price`, then ratchets the trailing level.
    pub fn evaluate(&self, state: &mut InstrumentState, price: Decimal) -> Decision {
        if !state.invested {
            return Decision::Hold;
        }

        if let Some(entry) = state.entry_price {
            let stop = entry * (Decimal::ONE - self.params.stop_loss_pct);
            if price < stop {
                tracing::info!(%price, %entry, %stop, "Entry stop-loss hit.");
                state.close();
                return Decision::Exit {
                    reason: ExitReason::EntryStop,
                };
            }
        }

        if let Some(trailing) = state.trailing_stop_price {
            if price < trailing {
                tracing::info!(%price, %trailing, "Trailing stop hit.");
                state.close();
                return Decision::Exit {
                    reason: ExitReason::TrailingStop,
                };
            }
        }

        state.ratchet_peak(price);
        let candidate = price * (Decimal::ONE - self.params.trailing_stop_pct);
        state.trailing_stop_price = Some(match state.trailing_stop_price {
            Some(current) => current.max(candidate),
            None => candidate,
        });
        Decision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn overlay() -> EntryStopOverlay {
        EntryStopOverlay::new(EntryStopParams::default()).unwrap()
    }

    #[test]
    fn fixed_stop_fires_below_entry() {
        let overlay = overlay();
        let mut state = InstrumentState::new();
        overlay.arm(&mut state, dec!(100));
        assert_eq!(state.trailing_stop_price, Some(dec!(85)));

        assert_eq!(overlay.evaluate(&mut state, dec!(85)), Decision::Hold);
        let decision = overlay.evaluate(&mut state, dec!(84.9));
        assert_eq!(decision, Decision::Exit { reason: ExitReason::EntryStop });
        assert_eq!(state, InstrumentState::new());
    }

    #[test]
    fn trailing_stop_ratchets_and_fires() {
        let overlay = overlay();
        let mut state = InstrumentState::new();
        overlay.arm(&mut state, dec!(100));

        overlay.evaluate(&mut state, dec!(120));
        assert_eq!(state.trailing_stop_price, Some(dec!(102)));
        // a dip does not lower the trailing level
        overlay.evaluate(&mut state, dec!(110));
        assert_eq!(state.trailing_stop_price, Some(dec!(102)));
        assert_eq!(state.peak_price, Some(dec!(120)));

        let decision = overlay.evaluate(&mut state, dec!(101));
        assert_eq!(decision, Decision::Exit { reason: ExitReason::TrailingStop });
        assert!(!state.invested);
    }

    #[test]
    fn flat_state_is_left_alone() {
        let mut state = InstrumentState::new();
        assert_eq!(overlay().evaluate(&mut state, dec!(1)), Decision::Hold);
        assert_eq!(state.trailing_stop_price, None);
    }
}
