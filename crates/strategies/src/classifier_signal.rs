use crate::error::StrategyError;
use configuration::ClassifierParams;
use core_types::{Decision, ExitReason};
use ml_model::{Classifier, ModelError};
use rust_decimal::Decimal;

/// Wraps a direction classifier behind two regime vetoes and a confidence bar.
pub struct ConfidenceGatedSignal<C: Classifier> {
    confidence_threshold: f64,
    vix_threshold: Decimal,
    classifier: C,
}

impl<C: Classifier> ConfidenceGatedSignal<C> {
    pub fn new(params: &ClassifierParams, classifier: C) -> Result<Self, StrategyError> {
        if !(0.0..1.0).contains(&params.confidence_threshold) {
            return Err(StrategyError::InvalidParameters(
                "confidence_threshold must be in [0, 1)".to_string(),
            ));
        }
        Ok(Self {
            confidence_threshold: params.confidence_threshold,
            vix_threshold: params.vix_threshold,
            classifier,
        })
    }

    /// Refits the classifier. On error the previous model stays in use.
    pub fn refit(&mut self, features: &[Vec<f64>], labels: &[i32]) -> Result<(), ModelError> {
        self.classifier.fit(features, labels)
    }

    pub fn is_ready(&self) -> bool {
        self.classifier.is_trained()
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn decide(&self, features: &[f64], vix_level: Decimal, spy_price: Decimal, trend_sma: Decimal) -> Decision {
        if vix_level > self.vix_threshold {
            tracing::debug!(%vix_level, threshold = %self.vix_threshold, "VIX veto.");
            return Decision::Hold;
        }
        if spy_price < trend_sma {
            tracing::debug!(%spy_price, %trend_sma, "Trend veto.");
            return Decision::Hold;
        }
        if !self.classifier.is_trained() {
            return Decision::Hold;
        }

        let probabilities = match self.classifier.predict_probability(features) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "Prediction failed; holding.");
                return Decision::Hold;
            }
        };

        if probabilities.up > self.confidence_threshold {
            tracing::info!(p_up = probabilities.up, "Confident up signal.");
            Decision::EnterLong { size: Decimal::ONE }
        } else if probabilities.down > self.confidence_threshold {
            tracing::info!(p_down = probabilities.down, "Confident down signal.");
            Decision::Exit {
                reason: ExitReason::ClassifierDown,
            }
        } else {
            Decision::Hold
        }
    }
}
