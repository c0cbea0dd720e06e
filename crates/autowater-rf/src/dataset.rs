//! Validated training data: row-major features with one target per row.

use crate::error::RfError;

/// A validated regression dataset.
///
/// Every row has the same, non-zero number of features, there is exactly
/// one target per row, and every value is finite. Validation happens once
/// in [`Dataset::new`]; everything downstream relies on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
    n_features: usize,
}

impl Dataset {
    /// Build a dataset from row-major features and their targets.
    ///
    /// `features[sample_idx][feature_idx]`, `targets[sample_idx]`.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                  |
    /// |-----------------------------------|---------------------------------------|
    /// | [`RfError::EmptyDataset`]         | `features` is empty                   |
    /// | [`RfError::ZeroFeatures`]         | rows have zero feature columns        |
    /// | [`RfError::TargetCountMismatch`]  | `targets.len() != features.len()`     |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths        |
    /// | [`RfError::NonFiniteValue`]       | any feature is NaN or infinite        |
    /// | [`RfError::NonFiniteTarget`]      | any target is NaN or infinite         |
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self, RfError> {
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let n_features = features[0].len();
        if n_features == 0 {
            return Err(RfError::ZeroFeatures);
        }
        if targets.len() != features.len() {
            return Err(RfError::TargetCountMismatch {
                n_rows: features.len(),
                n_targets: targets.len(),
            });
        }
        for (sample_index, row) in features.iter().enumerate() {
            if row.len() != n_features {
                return Err(RfError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    sample_index,
                });
            }
            if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
        if let Some(sample_index) = targets.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteTarget { sample_index });
        }

        Ok(Self {
            features,
            targets,
            n_features,
        })
    }

    /// Build a sub-dataset from row indices. Indices may repeat.
    ///
    /// Callers guarantee every index is in range; the result inherits
    /// this dataset's validation.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            n_features: self.n_features,
        }
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the target values.
    #[must_use]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Return one feature row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= n_samples()`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.features[index]
    }

    /// Transpose into column-major layout: `columns[feature_idx][sample_idx]`.
    pub(crate) fn columns(&self) -> Vec<Vec<f64>> {
        (0..self.n_features)
            .map(|feat_idx| self.features.iter().map(|row| row[feat_idx]).collect())
            .collect()
    }
}
