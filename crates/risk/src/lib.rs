//! Portfolio-level risk state.
//!
//! The only risk overlay that spans instruments is the drawdown monitor that
//! toggles capital-preservation mode; per-instrument stops live in `strategies`.

pub mod drawdown_monitor;
pub mod error;

pub use drawdown_monitor::PortfolioDrawdownMonitor;
pub use error::RiskError;
