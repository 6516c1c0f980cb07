use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExecutorError {
    #[error("Not enough cash available to execute trade. Required: {required}, Available: {available}")]
    InsufficientCash { required: String, available: String },

    #[error("Position not found for symbol: {0}")]
    PositionNotFound(String),

    #[error("Invalid order quantity for closing position. Requested: {requested}, Available: {available}")]
    InvalidClosingQuantity { requested: String, available: String },

    #[error("No market price has been seen for symbol: {0}")]
    NoPrice(String),

    #[error("Target allocation for {symbol} must be within [0, 1], got {fraction}")]
    InvalidAllocation { symbol: String, fraction: String },
}
