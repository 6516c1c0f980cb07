use crate::algorithm::{Algorithm, RunStats, execute_decision};
use crate::error::EngineError;
use crate::indicators::Sma;
use chrono::{DateTime, Utc};
use configuration::ClassifierParams;
use core_types::numeric::to_f64;
use core_types::{MarketSlice, StrategyId};
use executor::Broker;
use ml_features::{DailyObservation, build_training_set};
use ml_model::{CommitteeParams, ModelError, TreeCommittee};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use strategies::ConfidenceGatedSignal;

const COMMITTEE_SEED: u64 = 42;

/// SPY traded on a tree-committee direction forecast, vetoed by VIX and the
/// 200-day trend. The model is refitted daily after the close.
pub struct ClassifierAlgorithm {
    symbol: String,
    vix_symbol: String,
    warmup_days: usize,
    lookback_days: usize,
    horizons: Vec<usize>,
    signal: ConfidenceGatedSignal<TreeCommittee>,
    history: VecDeque<DailyObservation>,
    trend: Sma,
    last_vix: Option<Decimal>,
    /// Features for the latest day, produced by the last successful refit.
    current_features: Option<Vec<f64>>,
    stats: RunStats,
}

impl ClassifierAlgorithm {
    pub fn new(params: &ClassifierParams) -> Result<Self, EngineError> {
        let committee = TreeCommittee::new(CommitteeParams {
            n_trees: params.n_trees,
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
            min_samples: params.min_training_samples,
            seed: COMMITTEE_SEED,
        });
        Ok(Self {
            symbol: params.symbol.clone(),
            vix_symbol: params.vix_symbol.clone(),
            warmup_days: params.warmup_days,
            lookback_days: params.lookback_days,
            horizons: params.horizons.clone(),
            signal: ConfidenceGatedSignal::new(params, committee)?,
            history: VecDeque::with_capacity(params.lookback_days),
            trend: Sma::sma(params.trend_sma_period)?,
            last_vix: None,
            current_features: None,
            stats: RunStats::default(),
        })
    }

    pub fn is_model_ready(&self) -> bool {
        self.signal.is_ready()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn record(&mut self, close: Decimal, volume: Decimal) -> Result<(), EngineError> {
        if self.history.len() == self.lookback_days {
            self.history.pop_front();
        }
        self.history.push_back(DailyObservation {
            close: to_f64("close", close)?,
            volume: to_f64("volume", volume)?,
        });
        Ok(())
    }
}

impl Algorithm for ClassifierAlgorithm {
    fn id(&self) -> StrategyId {
        StrategyId::Classifier
    }

    fn symbols(&self) -> Vec<String> {
        vec![self.symbol.clone(), self.vix_symbol.clone()]
    }

    fn warmup_days(&self) -> usize {
        self.warmup_days
    }

    fn on_data(&mut self, slice: &MarketSlice, warming_up: bool, broker: &mut dyn Broker) -> Result<(), EngineError> {
        if let Some(vix) = slice.close(&self.vix_symbol) {
            self.last_vix = Some(vix);
        }
        let Some(bar) = slice.bar(&self.symbol).copied() else {
            tracing::debug!(date = %slice.date(), symbol = %self.symbol, "No data; skipping tick.");
            return Ok(());
        };
        self.record(bar.close, bar.volume)?;
        self.trend.update(bar.close)?;

        if warming_up {
            return Ok(());
        }
        let Some(trend_sma) = self.trend.value() else {
            return Ok(());
        };
        let (Some(vix), Some(features)) = (self.last_vix, self.current_features.as_deref()) else {
            return Ok(());
        };

        let decision = self.signal.decide(features, vix, bar.close, trend_sma);
        execute_decision(decision, &self.symbol, broker, &mut self.stats)
    }

    fn on_schedule(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        let history = self.history.make_contiguous();
        let set = build_training_set(history, &self.horizons);

        match self.signal.refit(&set.features, &set.labels) {
            Ok(()) => {
                tracing::debug!(%now, samples = set.len(), "Classifier refitted.");
                self.current_features = set.latest;
            }
            Err(ModelError::DegenerateTrainingSet { samples, required }) => {
                tracing::info!(%now, samples, required, "Not enough samples to refit; keeping the previous model.");
            }
            Err(e) => {
                tracing::warn!(%now, error = %e, "Classifier refit failed; keeping the previous model.");
            }
        }
        Ok(())
    }

    fn stats(&self) -> &RunStats {
        &self.stats
    }
}
