use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Risk management error: {0}")]
    Risk(#[from] risk::RiskError),

    #[error("Broker error: {0}")]
    Broker(#[from] executor::ExecutorError),

    #[error("Numeric conversion error: {0}")]
    Numeric(#[from] core_types::CoreError),

    #[error("Indicator error: {0}")]
    Indicator(String),
}
