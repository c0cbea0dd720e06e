//! Configuration builder for Random Forest training.

use crate::dataset::Dataset;
use crate::error::RfError;
use crate::forest::RandomForestRegressor;
use crate::tree::TreeParams;

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter              | Default               |
/// |------------------------|-----------------------|
/// | `max_depth`            | 100                   |
/// | `min_samples_split`    | 2                     |
/// | `n_features_per_split` | `None` (all features) |
/// | `seed`                 | 42                    |
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) tree_params: TreeParams,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            tree_params: TreeParams::new(),
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the maximum tree depth (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.tree_params = self.tree_params.with_max_depth(max_depth);
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.tree_params = self.tree_params.with_min_samples_split(min_samples_split);
        self
    }

    /// Set the number of candidate features drawn at each split. `None` means all.
    #[must_use]
    pub fn with_n_features_per_split(mut self, n_features_per_split: Option<usize>) -> Self {
        self.tree_params = self
            .tree_params
            .with_n_features_per_split(n_features_per_split);
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the growth parameters shared by every tree.
    #[must_use]
    pub fn tree_params(&self) -> TreeParams {
        self.tree_params
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check every parameter that can be checked without data.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                |
    /// |--------------------------------------|-------------------------------------|
    /// | [`RfError::InvalidTreeCount`]        | `n_trees` is zero                   |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` is zero         |
    /// | [`RfError::InvalidFeaturesPerSplit`] | `n_features_per_split` is `Some(0)` |
    pub fn validate(&self) -> Result<(), RfError> {
        if self.n_trees == 0 {
            return Err(RfError::InvalidTreeCount {
                n_trees: self.n_trees,
            });
        }
        self.tree_params.validate()
    }

    /// Train a Random Forest on `dataset`.
    ///
    /// # Errors
    ///
    /// See [`RandomForestConfig::validate`].
    pub fn fit(&self, dataset: &Dataset) -> Result<RandomForestRegressor, RfError> {
        let mut forest = RandomForestRegressor::new(self.clone());
        forest.fit(dataset)?;
        Ok(forest)
    }
}
