use rand::Rng;
use tracing::{debug, instrument};

use crate::{
    Dataset, RfError,
    node::{FeatureIndex, Node},
    split::{SplitResult, find_best_split, mean_at, sample_features},
};

/// Growth configuration for a single CART regression tree.
///
/// Construct via [`TreeParams::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter              | Default               |
/// |------------------------|-----------------------|
/// | `max_depth`            | 100                   |
/// | `min_samples_split`    | 2                     |
/// | `n_features_per_split` | `None` (all features) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TreeParams {
    pub(crate) max_depth: usize,
    pub(crate) min_samples_split: usize,
    pub(crate) n_features_per_split: Option<usize>,
}

impl TreeParams {
    /// Create growth parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: 100,
            min_samples_split: 2,
            n_features_per_split: None,
        }
    }

    /// Set the maximum tree depth (root is depth 0).
    ///
    /// `0` yields a single leaf holding the mean target. Growth itself uses
    /// no recursion, but dropping and (de)serializing a tree recurse once
    /// per level, so keep the depth in the low thousands. A tree can never
    /// be deeper than its sample count minus one.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the number of features drawn as split candidates at each node.
    ///
    /// `None` means all features. Values above the dataset's feature count
    /// are capped at fit time; `Some(0)` is rejected.
    #[must_use]
    pub fn with_n_features_per_split(mut self, n_features_per_split: Option<usize>) -> Self {
        self.n_features_per_split = n_features_per_split;
        self
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the requested features per split, if set.
    #[must_use]
    pub fn n_features_per_split(&self) -> Option<usize> {
        self.n_features_per_split
    }

    /// Check the parameters that can be checked without data.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                               |
    /// |-------------------------------------|------------------------------------|
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split` is 0           |
    /// | [`RfError::InvalidFeaturesPerSplit`]| `n_features_per_split` is `Some(0)`|
    pub fn validate(&self) -> Result<(), RfError> {
        if self.min_samples_split < 1 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.n_features_per_split == Some(0) {
            return Err(RfError::InvalidFeaturesPerSplit);
        }
        Ok(())
    }

    /// Resolve the per-split feature count against `n_features`.
    pub(crate) fn resolve_features_per_split(&self, n_features: usize) -> usize {
        self.n_features_per_split
            .map_or(n_features, |k| k.min(n_features))
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Fitted state of a tree: the root and the shape it was trained on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Fitted {
    root: Node,
    n_features: usize,
    n_features_per_split: usize,
}

/// A CART regression tree grown by variance reduction.
///
/// Created unfitted by [`RegressionTree::new`]; [`RegressionTree::fit`]
/// grows the root exactly once.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegressionTree {
    params: TreeParams,
    fitted: Option<Fitted>,
}

/// Read-only state shared by every node expansion.
struct Grower<'a> {
    columns: &'a [Vec<f64>],
    targets: &'a [f64],
    params: &'a TreeParams,
    n_features_per_split: usize,
}

/// A grown node whose children are still addressed by slot index.
enum Slot {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: FeatureIndex,
        threshold: f64,
        n_samples: usize,
        left: usize,
        right: usize,
    },
}

const VACANT: Slot = Slot::Leaf {
    value: 0.0,
    n_samples: 0,
};

impl Grower<'_> {
    /// Split `indices` if a stopping rule doesn't apply and some candidate
    /// reduces variance.
    fn try_split(&self, indices: &[usize], depth: usize, rng: &mut impl Rng) -> Option<SplitResult> {
        let depth_reached = depth >= self.params.max_depth;
        let too_few = indices.len() < self.params.min_samples_split;
        let first = self.targets[indices[0]];
        let constant = indices.iter().all(|&i| self.targets[i] == first);

        if depth_reached || too_few || constant {
            return None;
        }

        let candidates = sample_features(self.columns.len(), self.n_features_per_split, rng);
        find_best_split(self.columns, self.targets, indices, &candidates)
    }

    /// Grow the tree for the partition `indices`.
    ///
    /// Nodes are expanded in pre-order from an explicit work stack, so the
    /// rng is consumed node by node down the left subtree first. Children
    /// always land in higher slots than their parent, which lets the boxed
    /// tree be assembled in one reverse pass.
    fn grow(&self, indices: Vec<usize>, rng: &mut impl Rng) -> Node {
        let mut slots = vec![VACANT];
        let mut work = vec![(0usize, indices, 0usize)];

        while let Some((slot, indices, depth)) = work.pop() {
            let grown = match self.try_split(&indices, depth, rng) {
                None => Slot::Leaf {
                    value: mean_at(self.targets, &indices),
                    n_samples: indices.len(),
                },
                Some(split) => {
                    let left = slots.len();
                    let right = left + 1;
                    slots.push(VACANT);
                    slots.push(VACANT);
                    work.push((right, split.right_indices, depth + 1));
                    work.push((left, split.left_indices, depth + 1));
                    Slot::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        n_samples: indices.len(),
                        left,
                        right,
                    }
                }
            };
            slots[slot] = grown;
        }

        let vacant_node = || Node::Leaf {
            value: 0.0,
            n_samples: 0,
        };
        let mut nodes: Vec<Node> = slots.iter().map(|_| vacant_node()).collect();
        for (i, slot) in slots.into_iter().enumerate().rev() {
            let node = match slot {
                Slot::Leaf { value, n_samples } => Node::Leaf { value, n_samples },
                Slot::Split {
                    feature,
                    threshold,
                    n_samples,
                    left,
                    right,
                } => Node::Split {
                    feature,
                    threshold,
                    left: Box::new(std::mem::replace(&mut nodes[left], vacant_node())),
                    right: Box::new(std::mem::replace(&mut nodes[right], vacant_node())),
                    n_samples,
                },
            };
            nodes[i] = node;
        }
        nodes.swap_remove(0)
    }
}

impl RegressionTree {
    /// Create an unfitted tree with the given growth parameters.
    #[must_use]
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    /// Grow the tree on `dataset`, drawing split candidates from `rng`.
    ///
    /// Each node becomes a leaf (the mean of its targets) when the depth
    /// limit is reached, it holds fewer than `min_samples_split` rows, its
    /// targets are all equal, or no candidate split reduces variance.
    /// Otherwise it splits on the best of a fresh random feature subset.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                  |
    /// |--------------------------------------|---------------------------------------|
    /// | [`RfError::AlreadyFitted`]           | the tree already has a root           |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` is 0              |
    /// | [`RfError::InvalidFeaturesPerSplit`] | `n_features_per_split` is `Some(0)`   |
    #[instrument(skip_all, fields(n_samples = dataset.n_samples(), n_features = dataset.n_features()))]
    pub fn fit(&mut self, dataset: &Dataset, rng: &mut impl Rng) -> Result<(), RfError> {
        if self.fitted.is_some() {
            return Err(RfError::AlreadyFitted);
        }
        self.params.validate()?;

        let n_features = dataset.n_features();
        let n_features_per_split = self.params.resolve_features_per_split(n_features);

        let columns = dataset.columns();
        let grower = Grower {
            columns: &columns,
            targets: dataset.targets(),
            params: &self.params,
            n_features_per_split,
        };
        let root = grower.grow((0..dataset.n_samples()).collect(), rng);

        debug!(
            n_nodes = root.n_nodes(),
            depth = root.depth(),
            n_features_per_split,
            "regression tree grown"
        );

        self.fitted = Some(Fitted {
            root,
            n_features,
            n_features_per_split,
        });
        Ok(())
    }

    /// Predict the target for a single sample.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                           |
    /// |----------------------------------------|--------------------------------|
    /// | [`RfError::NotFitted`]                 | `fit` has not run              |
    /// | [`RfError::PredictionFeatureMismatch`] | `sample.len() != n_features`   |
    /// | [`RfError::NonFinitePredictionInput`]  | a value is NaN or infinite     |
    pub fn predict_one(&self, sample: &[f64]) -> Result<f64, RfError> {
        let fitted = self.fitted.as_ref().ok_or(RfError::NotFitted)?;
        check_sample(sample, fitted.n_features)?;
        Ok(fitted.root.leaf_value(sample))
    }

    /// Predict targets for a batch of samples, preserving order.
    ///
    /// # Errors
    ///
    /// Same as [`RegressionTree::predict_one`], for the first failing sample.
    pub fn predict(&self, samples: &[Vec<f64>]) -> Result<Vec<f64>, RfError> {
        samples.iter().map(|s| self.predict_one(s)).collect()
    }

    /// Traverse without validation; the caller has already checked `sample`.
    pub(crate) fn predict_unchecked(&self, sample: &[f64]) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.root.leaf_value(sample))
    }

    /// Return the growth parameters.
    #[must_use]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Return `true` once `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Return the root node, if fitted.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.fitted.as_ref().map(|f| &f.root)
    }

    /// Return the number of features the tree was trained on, if fitted.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_features)
    }

    /// Return the resolved features-per-split used during growth, if fitted.
    #[must_use]
    pub fn n_features_per_split(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_features_per_split)
    }

    /// Return the maximum depth of the grown tree (0 for a single leaf or unfitted).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root().map_or(0, Node::depth)
    }

    /// Return the number of leaf nodes (0 when unfitted).
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root().map_or(0, Node::n_leaves)
    }

    /// Return the total number of nodes (0 when unfitted).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root().map_or(0, Node::n_nodes)
    }
}

#[cfg(test)]
impl RegressionTree {
    /// Wrap an already-built root as a fitted tree.
    pub(crate) fn from_root(params: TreeParams, root: Node, n_features: usize) -> Self {
        let n_features_per_split = params.resolve_features_per_split(n_features);
        Self {
            params,
            fitted: Some(Fitted {
                root,
                n_features,
                n_features_per_split,
            }),
        }
    }
}

/// Validate a prediction input against the training arity.
pub(crate) fn check_sample(sample: &[f64], n_features: usize) -> Result<(), RfError> {
    if sample.len() != n_features {
        return Err(RfError::PredictionFeatureMismatch {
            expected: n_features,
            got: sample.len(),
        });
    }
    if let Some(feature_index) = sample.iter().position(|v| !v.is_finite()) {
        return Err(RfError::NonFinitePredictionInput { feature_index });
    }
    Ok(())
}
