use std::fmt;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in a regression tree.
///
/// Each split exclusively owns its two subtrees, so a fitted tree is a
/// strict tree and dropping the root drops everything below it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Threshold value: samples with feature <= threshold go left.
        threshold: f64,
        /// Subtree for samples at or below the threshold.
        left: Box<Node>,
        /// Subtree for samples above the threshold.
        right: Box<Node>,
        /// Number of training samples that reached this node.
        n_samples: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Mean target of the training samples that reached this leaf.
        value: f64,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return the longest root-to-leaf path length below this node.
    ///
    /// A leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((&**right, depth + 1));
                    stack.push((&**left, depth + 1));
                }
            }
        }
        deepest
    }

    /// Return the number of leaves in this subtree.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.iter().filter(|node| node.is_leaf()).count()
    }

    /// Return the total number of nodes (splits and leaves) in this subtree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.iter().count()
    }

    /// Iterate over this subtree in pre-order (node, left subtree, right subtree).
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Node::Split { left, right, .. } = node {
                stack.push(right);
                stack.push(left);
            }
            Some(node)
        })
    }

    /// Check that every split references a feature below `n_features` and
    /// that every threshold and leaf value is finite.
    ///
    /// Returns a description of the first offending node.
    pub(crate) fn check_structure(&self, n_features: usize) -> Result<(), String> {
        for node in self.iter() {
            match node {
                Node::Split {
                    feature, threshold, ..
                } => {
                    if feature.index() >= n_features {
                        return Err(format!(
                            "split on feature {feature} but the model has {n_features} features"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("non-finite threshold {threshold} on feature {feature}"));
                    }
                }
                Node::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(format!("non-finite leaf value {value}"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from this node to a leaf and return its value.
    ///
    /// Goes left when `sample[feature] <= threshold`, right otherwise.
    /// The caller guarantees `sample` is long enough for every split feature.
    pub(crate) fn leaf_value(&self, sample: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if sample[feature.index()] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}
