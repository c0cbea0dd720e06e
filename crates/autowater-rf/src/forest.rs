//! Random Forest training with parallel tree construction.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::bootstrap::Bootstrapper;
use crate::config::RandomForestConfig;
use crate::dataset::Dataset;
use crate::error::RfError;
use crate::tree::RegressionTree;

/// A bagged ensemble of regression trees.
///
/// Unfitted after [`RandomForestRegressor::new`]; [`RandomForestRegressor::fit`]
/// grows `n_trees` trees on independent bootstrap samples.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RandomForestRegressor {
    pub(crate) config: RandomForestConfig,
    pub(crate) trees: Vec<RegressionTree>,
    pub(crate) n_features: Option<usize>,
}

/// Return the random stream owned by tree `tree_index` of an ensemble seeded with `seed`.
///
/// Every tree draws its bootstrap sample and then its split candidates from
/// this generator alone, so a forest is reproducible regardless of thread
/// count or scheduling order.
#[must_use]
pub fn tree_rng(seed: u64, tree_index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(tree_index as u64);
    rng
}

/// Train a Random Forest on row-major `features` and their `targets`.
///
/// # Errors
///
/// Any error from [`Dataset::new`] or [`RandomForestRegressor::fit`].
pub fn train(
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
    config: RandomForestConfig,
) -> Result<RandomForestRegressor, RfError> {
    let dataset = Dataset::new(features, targets)?;
    let mut forest = RandomForestRegressor::new(config);
    forest.fit(&dataset)?;
    Ok(forest)
}

impl RandomForestRegressor {
    /// Create an unfitted forest.
    #[must_use]
    pub fn new(config: RandomForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: None,
        }
    }

    /// Grow the ensemble on `dataset`, replacing any previous trees.
    ///
    /// Trees are grown in parallel, one task per tree index; the result
    /// is collected in index order. On error the forest is left as it was.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                |
    /// |--------------------------------------|-------------------------------------|
    /// | [`RfError::InvalidTreeCount`]        | `n_trees` is zero                   |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` is zero         |
    /// | [`RfError::InvalidFeaturesPerSplit`] | `n_features_per_split` is `Some(0)` |
    #[instrument(skip_all, fields(n_trees = self.config.n_trees, n_samples = dataset.n_samples()))]
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), RfError> {
        self.config.validate()?;

        let params = self.config.tree_params;
        let seed = self.config.seed;

        info!(
            n_trees = self.config.n_trees,
            n_samples = dataset.n_samples(),
            n_features = dataset.n_features(),
            features_per_split = params.resolve_features_per_split(dataset.n_features()),
            max_depth = params.max_depth,
            min_samples_split = params.min_samples_split,
            "training random forest"
        );

        let trees: Vec<RegressionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|tree_index| -> Result<RegressionTree, RfError> {
                let mut rng = tree_rng(seed, tree_index);
                let sample = Bootstrapper::sample(dataset, &mut rng);
                let mut tree = RegressionTree::new(params);
                tree.fit(&sample, &mut rng)?;
                debug!(tree_index, n_nodes = tree.n_nodes(), depth = tree.depth(), "tree grown");
                Ok(tree)
            })
            .collect::<Result<_, _>>()?;

        info!(n_trees = trees.len(), "random forest training complete");

        self.trees = trees;
        self.n_features = Some(dataset.n_features());
        Ok(())
    }

    /// Return the training configuration.
    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }

    /// Return the fitted trees in index order (empty before `fit`).
    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Return `true` once `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
