use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Failed to read market data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse market data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid market data on line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("Algorithm error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),

    #[error("Historical data is empty; nothing to replay.")]
    DataUnavailable,
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
