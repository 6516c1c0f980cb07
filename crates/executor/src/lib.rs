//! # Trendguard Executor Crate
//!
//! This crate provides the execution and portfolio collaborator the algorithms
//! delegate to. It defines the `Broker` trait and provides a `PaperBroker` for
//! replays, backed by a `Portfolio` that tracks cash and holdings.
//!
//! ## Architectural Principles
//!
//! - **State vs. Logic Decoupling:** the `Portfolio` is the state machine that
//!   applies fills; the `PaperBroker` decides what to fill and at what price.
//! - **Execution Abstraction:** algorithms only see the `Broker` trait, so they are
//!   agnostic about whether orders go to a simulation or anywhere else.
//!
//! ## Public API
//!
//! - `Broker`: target-weight and liquidation commands plus read-only queries.
//! - `PaperBroker`: fills at the latest close with an optional commission.
//! - `Portfolio`, `Fill`, `Side`: the account state and its transitions.
//! - `ExecutorError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod broker;
pub mod error;
pub mod portfolio;

// Re-export the key components to provide a clean, public-facing API.
pub use broker::{Broker, PaperBroker};
pub use error::ExecutorError;
pub use portfolio::{Fill, Holding, Portfolio, Side};
