//! # Classifier collaborator
//!
//! The confidence-gated signal only needs two things from a model: fit it on
//! labelled feature rows, and ask it for up/down probabilities. `Classifier`
//! is that seam; `TreeCommittee` is the implementation the replay harness uses.

pub mod committee;
pub mod error;
pub mod scaler;

pub use committee::{CommitteeParams, TreeCommittee};
pub use error::ModelError;
pub use scaler::FeatureScaler;

/// Independent probabilities for the two classes.
///
/// Calibrated collaborators need not make these sum to exactly one, so callers
/// compare each against its threshold separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub down: f64,
    pub up: f64,
}

/// A binary next-day direction classifier (label `1` = up, `0` = down).
pub trait Classifier {
    /// Fits on `features` (one row per sample) and `labels`.
    ///
    /// On error the previously fitted model, if any, must remain usable.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[i32]) -> Result<(), ModelError>;

    fn predict_probability(&self, features: &[f64]) -> Result<ClassProbabilities, ModelError>;

    fn is_trained(&self) -> bool;
}
