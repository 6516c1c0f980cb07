//! # Trendguard Backtester
//!
//! The replay harness: plays ordered daily `MarketSlice`s through an
//! `Algorithm`, fills its orders on a `PaperBroker`, and summarizes the run.
//!
//! Per trading day the order is fixed: mark the broker at the day's closes,
//! call `on_warmup_finished` (once, on the first day after warm-up), then
//! `on_data`, then `on_schedule`, then record equity.

use chrono::{DateTime, Utc};
use configuration::Simulation;
use core_types::MarketSlice;
use engine::Algorithm;
use executor::{Broker, PaperBroker};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;

pub mod data;
pub mod error;
pub mod report;

pub use data::{load_slices, read_slices};
pub use error::BacktestError;
pub use report::BacktestReport;

/// Drives one algorithm over historical data.
pub struct Backtester {
    algorithm: Box<dyn Algorithm>,
    broker: PaperBroker,
    initial_capital: Decimal,
    equity_curve: Vec<(DateTime<Utc>, Decimal)>,
    show_progress: bool,
}

impl Backtester {
    pub fn new(algorithm: Box<dyn Algorithm>, simulation: &Simulation) -> Self {
        Self {
            algorithm,
            broker: PaperBroker::new(simulation),
            initial_capital: simulation.initial_capital,
            equity_curve: Vec::new(),
            show_progress: false,
        }
    }

    /// Draws a progress bar on stderr while replaying.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }

    pub fn broker(&self) -> &PaperBroker {
        &self.broker
    }

    pub fn equity_curve(&self) -> &[(DateTime<Utc>, Decimal)] {
        &self.equity_curve
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, BacktestError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        Ok(progress_bar)
    }

    /// Replays `slices`, which must be in ascending date order.
    pub fn run(&mut self, slices: &[MarketSlice]) -> Result<BacktestReport, BacktestError> {
        if slices.is_empty() {
            return Err(BacktestError::DataUnavailable);
        }
        let warmup = self.algorithm.warmup_days();
        if slices.len() <= warmup {
            tracing::warn!(days = slices.len(), warmup, "History is shorter than the warm-up; no decisions will be made.");
        }
        tracing::info!(
            strategy = %self.algorithm.id(),
            days = slices.len(),
            warmup,
            symbols = ?self.algorithm.symbols(),
            "Starting replay."
        );

        self.equity_curve = Vec::with_capacity(slices.len());
        let progress_bar = self.progress_bar(slices.len())?;

        for (index, slice) in slices.iter().enumerate() {
            self.broker.mark(slice);
            let warming_up = index < warmup;

            if index == warmup {
                tracing::info!(date = %slice.date(), "Warm-up finished.");
                self.algorithm.on_warmup_finished(slice, &mut self.broker)?;
            }
            self.algorithm.on_data(slice, warming_up, &mut self.broker)?;
            if !warming_up {
                self.algorithm.on_schedule(slice.timestamp)?;
            }

            self.equity_curve.push((slice.timestamp, self.broker.total_value()));
            progress_bar.inc(1);
        }
        progress_bar.finish_with_message("Replay complete.");

        let final_value = self.broker.total_value();
        let report = BacktestReport {
            strategy: self.algorithm.id(),
            start: slices.first().map(MarketSlice::date),
            end: slices.last().map(MarketSlice::date),
            trading_days: slices.len(),
            warmup_days: warmup,
            initial_capital: self.initial_capital,
            final_value,
            total_return_pct: report::total_return_pct(self.initial_capital, final_value),
            max_drawdown_pct: report::max_drawdown_pct(&self.equity_curve),
            fills: self.broker.fills().len(),
            stats: self.algorithm.stats().clone(),
        };
        tracing::info!(
            final_value = %report.final_value,
            total_return_pct = %report.total_return_pct.round_dp(2),
            max_drawdown_pct = %report.max_drawdown_pct.round_dp(2),
            fills = report.fills,
            "Replay finished."
        );
        Ok(report)
    }
}
