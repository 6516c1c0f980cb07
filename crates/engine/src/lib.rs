//! # Trendguard Engine
//!
//! This crate wires the pure decision logic of `strategies` to market data and
//! a broker. Each strategy family is an `Algorithm`: it owns its indicators,
//! per-instrument state and counters, and is driven one `MarketSlice` at a time
//! by a host such as the `backtester`.
//!
//! ## Architectural Principles
//!
//! - **Host Agnostic:** algorithms only see a `MarketSlice` and a `&mut dyn Broker`.
//!   Data loading, time and marking belong to the host.
//! - **Indicators at the Boundary:** `ta` indicators are fed here and handed to the
//!   strategies as plain `Decimal` values once they have seen a full period.
//! - **Single Construction Point:** `create_algorithm` builds any family from a
//!   `StrategyId` and the validated `Config`.
//!
//! ## Public API
//!
//! - `Algorithm`: the host-side contract (`on_data`, `on_schedule`, warm-up hooks).
//! - `CombinedAlgorithm`, `LeveragedTrendAlgorithm`, `ClassifierAlgorithm`: the families.
//! - `create_algorithm`: the factory.
//! - `RunStats`: entry and exit counters reported at the end of a run.
//! - `EngineError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod algorithm;
pub mod classifier;
pub mod combined;
pub mod error;
pub mod factory;
pub mod indicators;
pub mod leveraged_trend;

// Re-export the key components to provide a clean, public-facing API.
pub use algorithm::{Algorithm, RunStats, execute_decision};
pub use classifier::ClassifierAlgorithm;
pub use combined::CombinedAlgorithm;
pub use error::EngineError;
pub use factory::create_algorithm;
pub use leveraged_trend::LeveragedTrendAlgorithm;
