use crate::algorithm::{Algorithm, RunStats, execute_decision};
use crate::error::EngineError;
use crate::indicators::{Atr, Rsi, Sma};
use configuration::CombinedParams;
use core_types::{Decision, InstrumentState, MarketSlice, StrategyId};
use executor::Broker;
use risk::PortfolioDrawdownMonitor;
use rust_decimal::Decimal;
use strategies::{AdaptiveCrossoverEngine, DrawdownTrailingController, EntryStopOverlay, MonthlyResampler};

/// SPY on the adaptive monthly crossover with entry stops, alongside a TQQQ
/// hold guarded by the drawdown-trailing controller.
pub struct CombinedAlgorithm {
    warmup_days: usize,
    // SPY leg
    spy: AdaptiveCrossoverEngine,
    spy_stops: EntryStopOverlay,
    spy_state: InstrumentState,
    resampler: MonthlyResampler,
    atr: Atr,
    rsi: Rsi,
    // TQQQ leg
    tqqq: DrawdownTrailingController,
    tqqq_state: InstrumentState,
    tqqq_fast: Sma,
    tqqq_slow: Sma,
    // Portfolio
    preservation: PortfolioDrawdownMonitor,
    stats: RunStats,
}

impl CombinedAlgorithm {
    pub fn new(params: &CombinedParams, initial_capital: Decimal) -> Result<Self, EngineError> {
        Ok(Self {
            warmup_days: params.warmup_days(),
            spy: AdaptiveCrossoverEngine::new(params.spy.clone())?,
            spy_stops: EntryStopOverlay::new(params.spy_stops.clone())?,
            spy_state: InstrumentState::new(),
            resampler: MonthlyResampler::new(),
            atr: Atr::atr(params.spy.atr_period)?,
            rsi: Rsi::rsi(params.spy.rsi_period)?,
            tqqq: DrawdownTrailingController::new(params.tqqq.clone())?,
            tqqq_state: InstrumentState::new(),
            tqqq_fast: Sma::sma(params.tqqq.fast_ma_period)?,
            tqqq_slow: Sma::sma(params.tqqq.slow_ma_period)?,
            preservation: PortfolioDrawdownMonitor::from_params(&params.capital_preservation, initial_capital)?,
            stats: RunStats::default(),
        })
    }

    pub fn spy_state(&self) -> &InstrumentState {
        &self.spy_state
    }

    pub fn tqqq_state(&self) -> &InstrumentState {
        &self.tqqq_state
    }

    pub fn monthly_history(&self) -> &[core_types::MonthlyBar] {
        self.resampler.history()
    }

    fn evaluate_tqqq(&mut self, slice: &MarketSlice, price: Decimal, broker: &mut dyn Broker) -> Result<(), EngineError> {
        // Without both averages there is no trend: exits still apply, reentry cannot.
        let (fast, slow) = match (self.tqqq_fast.value(), self.tqqq_slow.value()) {
            (Some(fast), Some(slow)) => (fast, slow),
            _ => (Decimal::ZERO, Decimal::ZERO),
        };
        let decision = self.tqqq.evaluate(&mut self.tqqq_state, price, fast, slow, slice.timestamp);
        execute_decision(decision, self.tqqq.symbol(), broker, &mut self.stats)
    }

    fn evaluate_spy_month(&mut self, month_close: Decimal, broker: &mut dyn Broker) -> Result<(), EngineError> {
        let (Some(atr), Some(rsi)) = (self.atr.value(), self.rsi.value()) else {
            tracing::info!(symbol = %self.spy.symbol(), "ATR/RSI not ready; recording the close without deciding.");
            self.spy.observe(month_close);
            return Ok(());
        };
        let decision = self.spy.on_monthly_close(
            month_close,
            atr,
            rsi,
            self.preservation.is_active(),
            self.spy_state.invested,
        );
        match decision {
            Decision::EnterLong { .. } => self.spy_stops.arm(&mut self.spy_state, month_close),
            Decision::Exit { .. } => self.spy_state.close(),
            Decision::Hold => {}
        }
        execute_decision(decision, self.spy.symbol(), broker, &mut self.stats)
    }
}

impl Algorithm for CombinedAlgorithm {
    fn id(&self) -> StrategyId {
        StrategyId::Combined
    }

    fn symbols(&self) -> Vec<String> {
        vec![self.spy.symbol().to_string(), self.tqqq.symbol().to_string()]
    }

    fn warmup_days(&self) -> usize {
        self.warmup_days
    }

    fn on_warmup_finished(&mut self, slice: &MarketSlice, broker: &mut dyn Broker) -> Result<(), EngineError> {
        let Some(price) = slice.close(self.tqqq.symbol()) else {
            tracing::info!(symbol = %self.tqqq.symbol(), "No data at warm-up end; skipping the initial buy.");
            return Ok(());
        };
        let decision = self.tqqq.enter_initial(&mut self.tqqq_state, price);
        execute_decision(decision, self.tqqq.symbol(), broker, &mut self.stats)
    }

    fn on_data(&mut self, slice: &MarketSlice, warming_up: bool, broker: &mut dyn Broker) -> Result<(), EngineError> {
        let spy_bar = slice.bar(self.spy.symbol()).copied();
        let tqqq_close = slice.close(self.tqqq.symbol());

        if let Some(bar) = &spy_bar {
            self.atr.update_bar(bar)?;
            self.rsi.update(bar.close)?;
        }
        if let Some(close) = tqqq_close {
            self.tqqq_fast.update(close)?;
            self.tqqq_slow.update(close)?;
        }

        if warming_up {
            return Ok(());
        }
        let (Some(spy_bar), Some(tqqq_close)) = (spy_bar, tqqq_close) else {
            tracing::debug!(date = %slice.date(), "Missing SPY or TQQQ data; skipping tick.");
            return Ok(());
        };

        self.evaluate_tqqq(slice, tqqq_close, broker)?;

        self.preservation.update_at(broker.total_value(), slice.timestamp);

        if let Some(month) = self.resampler.on_daily_close(spy_bar.close, slice.month(), slice.year()) {
            self.evaluate_spy_month(month.close, broker)?;
        }

        if self.spy_state.invested {
            let decision = self.spy_stops.evaluate(&mut self.spy_state, spy_bar.close);
            execute_decision(decision, self.spy.symbol(), broker, &mut self.stats)?;
        }

        Ok(())
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}
