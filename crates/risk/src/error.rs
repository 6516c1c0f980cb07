use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RiskError {
    #[error("Risk parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("The starting portfolio value ({0}) is zero or negative.")]
    InvalidInitialValue(Decimal),
}
