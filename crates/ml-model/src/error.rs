use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Training set is too small: {samples} usable samples, at least {required} required")]
    DegenerateTrainingSet { samples: usize, required: usize },

    #[error("Feature rows ({features}) and labels ({labels}) differ in length")]
    LabelMismatch { features: usize, labels: usize },

    #[error("Expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Model has not been trained yet")]
    NotTrained,

    #[error("Model fitting failed: {0}")]
    Training(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}
