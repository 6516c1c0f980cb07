use crate::algorithm::{Algorithm, RunStats, execute_decision};
use crate::error::EngineError;
use crate::indicators::Sma;
use configuration::LeveragedTrendParams;
use core_types::{MarketSlice, StrategyId};
use executor::Broker;
use rust_decimal::Decimal;
use strategies::{MultiTierStopController, TierState};

/// SPXL held through a 50/200 SMA trend with tiered trailing stops, a profit
/// target and VIX-scaled sizing.
pub struct LeveragedTrendAlgorithm {
    warmup_days: usize,
    controller: MultiTierStopController,
    state: TierState,
    short_sma: Sma,
    long_sma: Sma,
    /// The last VIX close seen; VIX and SPXL do not always print on the same days.
    last_vix: Option<Decimal>,
    stats: RunStats,
}

impl LeveragedTrendAlgorithm {
    pub fn new(params: &LeveragedTrendParams) -> Result<Self, EngineError> {
        Ok(Self {
            warmup_days: params.warmup_days(),
            controller: MultiTierStopController::new(params.clone())?,
            state: TierState::Flat,
            short_sma: Sma::sma(params.short_sma_period)?,
            long_sma: Sma::sma(params.long_sma_period)?,
            last_vix: None,
            stats: RunStats::default(),
        })
    }

    pub fn tier_state(&self) -> TierState {
        self.state
    }
}

impl Algorithm for LeveragedTrendAlgorithm {
    fn id(&self) -> StrategyId {
        StrategyId::LeveragedTrend
    }

    fn symbols(&self) -> Vec<String> {
        vec![
            self.controller.symbol().to_string(),
            self.controller.vix_symbol().to_string(),
        ]
    }

    fn warmup_days(&self) -> usize {
        self.warmup_days
    }

    fn on_data(&mut self, slice: &MarketSlice, warming_up: bool, broker: &mut dyn Broker) -> Result<(), EngineError> {
        if let Some(vix) = slice.close(self.controller.vix_symbol()) {
            self.last_vix = Some(vix);
        }
        let Some(price) = slice.close(self.controller.symbol()) else {
            tracing::debug!(date = %slice.date(), symbol = %self.controller.symbol(), "No data; skipping tick.");
            return Ok(());
        };
        self.short_sma.update(price)?;
        self.long_sma.update(price)?;

        if warming_up {
            return Ok(());
        }
        let (Some(short), Some(long)) = (self.short_sma.value(), self.long_sma.value()) else {
            return Ok(());
        };
        let Some(vix) = self.last_vix else {
            tracing::debug!(date = %slice.date(), "No VIX level seen yet; skipping tick.");
            return Ok(());
        };

        let decision = self.controller.evaluate(&mut self.state, price, short, long, vix);
        execute_decision(decision, self.controller.symbol(), broker, &mut self.stats)
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use configuration::Simulation;
    use core_types::DailyBar;
    use executor::PaperBroker;
    use rust_decimal_macros::dec;

    fn params() -> LeveragedTrendParams {
        LeveragedTrendParams {
            short_sma_period: 2,
            long_sma_period: 3,
            ..LeveragedTrendParams::default()
        }
    }

    fn slice(day: i64, spxl: Decimal, vix: Option<Decimal>) -> MarketSlice {
        let ts = Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap() + Duration::days(day);
        let mut slice = MarketSlice::new(ts).with_bar("SPXL", DailyBar::from_close(spxl));
        if let Some(vix) = vix {
            slice.insert("VIX", DailyBar::from_close(vix));
        }
        slice
    }

    fn feed(algo: &mut LeveragedTrendAlgorithm, broker: &mut PaperBroker, slice: &MarketSlice) {
        broker.mark(slice);
        algo.on_data(slice, false, broker).unwrap();
    }

    #[test]
    fn enters_on_uptrend_sized_by_vix_and_stops_out() {
        let mut algo = LeveragedTrendAlgorithm::new(&params()).unwrap();
        let mut broker = PaperBroker::new(&Simulation::default());

        feed(&mut algo, &mut broker, &slice(0, dec!(100), Some(dec!(17))));
        feed(&mut algo, &mut broker, &slice(1, dec!(101), None));
        assert_eq!(algo.tier_state(), TierState::Flat);

        // short 102.5 over long 101.67, VIX carried forward at 17
        feed(&mut algo, &mut broker, &slice(2, dec!(104), None));
        assert_eq!(algo.tier_state(), TierState::HoldingPrimary { highest_price: dec!(104) });
        let value = broker.total_value();
        let held = broker.holdings("SPXL") * dec!(104);
        assert!(held <= value * dec!(0.75));
        assert!(held > value * dec!(0.74));

        // 104 * 0.95 = 98.8
        feed(&mut algo, &mut broker, &slice(3, dec!(98), Some(dec!(17))));
        assert_eq!(algo.tier_state(), TierState::Flat);
        assert!(!broker.is_invested("SPXL"));
        assert_eq!(algo.stats().exit_reasons.get("primary trailing stop"), Some(&1));
    }

    #[test]
    fn waits_for_a_vix_level() {
        let mut algo = LeveragedTrendAlgorithm::new(&params()).unwrap();
        let mut broker = PaperBroker::new(&Simulation::default());
        for (day, price) in [dec!(100), dec!(101), dec!(104), dec!(106)].into_iter().enumerate() {
            feed(&mut algo, &mut broker, &slice(day as i64, price, None));
        }
        assert_eq!(algo.tier_state(), TierState::Flat);
        assert_eq!(algo.stats().entries_for("SPXL"), 0);
    }

    #[test]
    fn high_vix_blocks_entry() {
        let mut algo = LeveragedTrendAlgorithm::new(&params()).unwrap();
        let mut broker = PaperBroker::new(&Simulation::default());
        for (day, price) in [dec!(100), dec!(101), dec!(104)].into_iter().enumerate() {
            feed(&mut algo, &mut broker, &slice(day as i64, price, Some(dec!(25))));
        }
        assert_eq!(algo.tier_state(), TierState::Flat);
    }
}
