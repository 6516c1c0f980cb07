use crate::error::ModelError;

/// Per-feature standardization, fitted on the training rows and reused at inference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl FeatureScaler {
    /// Fits means and sample standard deviations column by column.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ModelError> {
        let n_samples = rows.len();
        let n_features = rows.first().map(Vec::len).unwrap_or(0);
        if n_samples < 2 || n_features == 0 {
            return Err(ModelError::DegenerateTrainingSet {
                samples: n_samples,
                required: 2,
            });
        }

        let mut means = vec![0.0; n_features];
        for row in rows {
            if row.len() != n_features {
                return Err(ModelError::FeatureCount {
                    expected: n_features,
                    got: row.len(),
                });
            }
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n_samples as f64;
        }

        let mut stds = vec![0.0; n_features];
        for row in rows {
            for (j, value) in row.iter().enumerate() {
                let diff = value - means[j];
                stds[j] += diff * diff;
            }
        }
        for std in &mut stds {
            *std = (*std / (n_samples - 1) as f64).sqrt();
            // Constant columns would divide by zero
            if *std < 1e-10 {
                *std = 1.0;
            }
        }

        Ok(Self { means, stds })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.means.len() {
            return Err(ModelError::FeatureCount {
                expected: self.means.len(),
                got: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_columns_and_tolerates_constants() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = FeatureScaler::fit(&rows).unwrap();
        let scaled = scaler.transform(&[3.0, 5.0]).unwrap();
        // mean 2, sample std sqrt(2)
        assert!((scaled[0] - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(scaled[1], 0.0);
    }

    #[test]
    fn rejects_width_mismatch() {
        let scaler = FeatureScaler::fit(&[vec![1.0], vec![2.0]]).unwrap();
        assert_eq!(
            scaler.transform(&[1.0, 2.0]),
            Err(ModelError::FeatureCount { expected: 1, got: 2 })
        );
    }
}
