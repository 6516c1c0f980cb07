pub mod enums;
pub mod error;
pub mod numeric;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Decision, ExitReason, StrategyId};
pub use error::CoreError;
pub use structs::{DailyBar, InstrumentState, MarketSlice, MonthlyBar, ThresholdPair};
