use crate::error::ModelError;
use crate::scaler::FeatureScaler;
use crate::{ClassProbabilities, Classifier};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};

type Tree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Hyperparameters for [`TreeCommittee`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommitteeParams {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_leaf: usize,
    /// Fits on fewer rows than this are refused as degenerate.
    pub min_samples: usize,
    pub seed: u64,
}

impl Default for CommitteeParams {
    fn default() -> Self {
        Self {
            n_trees: 25,
            max_depth: 5,
            min_samples_leaf: 5,
            min_samples: 10,
            seed: 42,
        }
    }
}

enum Fitted {
    /// Every training label was the same class.
    Constant { up: bool },
    Trees(Vec<Tree>),
}

struct Model {
    scaler: FeatureScaler,
    fitted: Fitted,
}

/// A bagged committee of smartcore decision trees over standardized features.
///
/// `up` is the fraction of trees voting for label `1`; `down` is the rest.
pub struct TreeCommittee {
    params: CommitteeParams,
    model: Option<Model>,
}

impl TreeCommittee {
    pub fn new(params: CommitteeParams) -> Self {
        Self {
            params,
            model: None,
        }
    }

    fn fit_tree(&self, x: &[Vec<f64>], y: &[i32], rng: &mut StdRng) -> Result<Tree, ModelError> {
        let n = x.len();
        let mut rows = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        for _ in 0..n {
            let i = rng.gen_range(0..n);
            rows.push(x[i].clone());
            labels.push(y[i]);
        }

        let matrix = DenseMatrix::from_2d_vec(&rows)
            .map_err(|e| ModelError::Training(format!("Failed to create DenseMatrix: {e}")))?;
        let parameters = DecisionTreeClassifierParameters::default()
            .with_max_depth(self.params.max_depth)
            .with_min_samples_leaf(self.params.min_samples_leaf);

        DecisionTreeClassifier::fit(&matrix, &labels, parameters)
            .map_err(|e| ModelError::Training(e.to_string()))
    }
}

impl Classifier for TreeCommittee {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[i32]) -> Result<(), ModelError> {
        if features.len() != labels.len() {
            return Err(ModelError::LabelMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }
        let required = self.params.min_samples.max(2);
        if features.len() < required {
            return Err(ModelError::DegenerateTrainingSet {
                samples: features.len(),
                required,
            });
        }

        let scaler = FeatureScaler::fit(features)?;
        let scaled = features
            .iter()
            .map(|row| scaler.transform(row))
            .collect::<Result<Vec<_>, _>>()?;

        let first = labels[0];
        let fitted = if labels.iter().all(|&label| label == first) {
            Fitted::Constant { up: first == 1 }
        } else {
            let mut rng = StdRng::seed_from_u64(self.params.seed);
            let trees = (0..self.params.n_trees.max(1))
                .map(|_| self.fit_tree(&scaled, labels, &mut rng))
                .collect::<Result<Vec<_>, _>>()?;
            Fitted::Trees(trees)
        };

        tracing::debug!(
            samples = features.len(),
            features = scaler.n_features(),
            "Tree committee refitted."
        );
        // Only replace the previous model once the whole committee fitted.
        self.model = Some(Model { scaler, fitted });
        Ok(())
    }

    fn predict_probability(&self, features: &[f64]) -> Result<ClassProbabilities, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotTrained)?;
        let scaled = model.scaler.transform(features)?;

        let up = match &model.fitted {
            Fitted::Constant { up } => {
                if *up {
                    1.0
                } else {
                    0.0
                }
            }
            Fitted::Trees(trees) => {
                let x = DenseMatrix::from_2d_vec(&vec![scaled])
                    .map_err(|e| ModelError::Prediction(e.to_string()))?;
                let mut votes = 0usize;
                for tree in trees {
                    let prediction = tree
                        .predict(&x)
                        .map_err(|e| ModelError::Prediction(e.to_string()))?;
                    if prediction.first() == Some(&1) {
                        votes += 1;
                    }
                }
                votes as f64 / trees.len() as f64
            }
        };

        Ok(ClassProbabilities { down: 1.0 - up, up })
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}
