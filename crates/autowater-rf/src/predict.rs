//! Prediction methods for the Random Forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForestRegressor;
use crate::tree::check_sample;

impl RandomForestRegressor {
    /// Predict the target for a single sample.
    ///
    /// Returns the arithmetic mean of every tree's prediction.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                            |
    /// |----------------------------------------|---------------------------------|
    /// | [`RfError::NotFitted`]                 | the forest has no trees         |
    /// | [`RfError::PredictionFeatureMismatch`] | `sample.len() != n_features`    |
    /// | [`RfError::NonFinitePredictionInput`]  | a value is NaN or infinite      |
    pub fn predict_one(&self, sample: &[f64]) -> Result<f64, RfError> {
        let n_features = match self.n_features {
            Some(n) if !self.trees.is_empty() => n,
            _ => return Err(RfError::NotFitted),
        };
        check_sample(sample, n_features)?;

        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict_unchecked(sample).ok_or(RfError::NotFitted)?;
        }
        Ok(sum / self.trees.len() as f64)
    }

    /// Predict targets for a batch of samples in parallel.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForestRegressor::predict_one`]; any failing sample fails the batch.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, RfError> {
        if !self.is_fitted() {
            return Err(RfError::NotFitted);
        }
        features
            .into_par_iter()
            .map(|sample| self.predict_one(sample))
            .collect()
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features the forest was trained on, if fitted.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}
