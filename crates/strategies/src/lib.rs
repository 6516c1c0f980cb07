//! # Trendguard Strategy Library
//!
//! The signal-generation and position-state-machine logic. Every component
//! here turns already-computed inputs (prices, indicator values, classifier
//! probabilities) into a [`Decision`].
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no data loading, no order placement, no indicator
//!   recomputation. Indicators arrive as plain values from the caller.
//! - **Caller-owned state:** per-instrument state (`InstrumentState`, `TierState`)
//!   is passed in by `&mut` on each evaluation, so every component can be driven
//!   deterministically in tests.
//! - **Parameters by injection:** each component is built from its section of
//!   the `configuration` crate and validated once in `new`.
//!
//! ## Public API
//!
//! - `DrawdownTrailingController`: drawdown-from-peak exit, trend-filtered reentry.
//! - `MonthlyResampler`: daily closes into monthly bars.
//! - `AdaptiveCrossoverEngine`: monthly MA crossover with adaptive thresholds.
//! - `EntryStopOverlay`: fixed and trailing stops around a crossover entry.
//! - `MultiTierStopController`: tiered trailing stops, profit target, VIX sizing.
//! - `ConfidenceGatedSignal`: classifier output behind regime vetoes.

// Declare all the modules that constitute this crate.
pub mod adaptive_crossover;
pub mod classifier_signal;
pub mod drawdown_trailing;
pub mod entry_stops;
pub mod error;
pub mod monthly_resampler;
pub mod moving_average;
pub mod multi_tier_stop;

// Re-export the key components to create a clean, public-facing API.
pub use adaptive_crossover::AdaptiveCrossoverEngine;
pub use classifier_signal::ConfidenceGatedSignal;
pub use drawdown_trailing::DrawdownTrailingController;
pub use entry_stops::EntryStopOverlay;
pub use error::StrategyError;
pub use monthly_resampler::MonthlyResampler;
pub use moving_average::MovingAverageWindow;
pub use multi_tier_stop::{MultiTierStopController, TierState};

pub use core_types::Decision;
