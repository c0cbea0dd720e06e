//! Exhaustive variance-reduction split search.

use rand::Rng;

use crate::node::FeatureIndex;

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Feature used for the split.
    pub(crate) feature: FeatureIndex,
    /// Threshold value; one of the distinct values of the feature column.
    pub(crate) threshold: f64,
    /// Variance reduction achieved by this split. Always positive.
    pub(crate) gain: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Arithmetic mean of `targets` at `indices`. Zero for an empty selection.
pub(crate) fn mean_at(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

/// Population variance (divides by `n`). Zero for fewer than two values.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Variance reduction of splitting a partition into two non-empty sides.
///
/// `var(parent) - (n_l/n)·var(left) - (n_r/n)·var(right)` equals the
/// between-group term `(n_l·n_r/n²)·(mean_l - mean_r)²` for population
/// variance, so it is computed from the side sums alone.
fn variance_reduction(left_sum: f64, n_left: usize, right_sum: f64, n_right: usize) -> f64 {
    let n = (n_left + n_right) as f64;
    let (nl, nr) = (n_left as f64, n_right as f64);
    let diff = left_sum / nl - right_sum / nr;
    (nl * nr) / (n * n) * diff * diff
}

/// Draw `k` distinct feature indices uniformly from `0..n_features`.
///
/// Partial Fisher-Yates; the returned order is the order the split scan
/// visits features in, which decides ties.
pub(crate) fn sample_features(n_features: usize, k: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n_features).collect();
    let take = k.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

/// Find the split with the largest variance reduction.
///
/// For each candidate feature (in the given order), sorts the
/// `(value, target)` pairs and sweeps left to right with a running target
/// sum, scoring one candidate per distinct value in ascending order. A
/// threshold at the column maximum would leave the right side empty and is
/// never scored.
///
/// Only strictly positive gains are accepted and a later candidate must be
/// strictly better to replace the current best, so ties keep the first
/// candidate seen.
///
/// Returns `None` when no candidate improves on the parent.
///
/// # Column-major layout
///
/// `columns[feature_idx][sample_idx]`; `indices` select the partition.
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    candidates: &[usize],
) -> Option<SplitResult> {
    let n_samples = indices.len();
    if n_samples < 2 {
        return None;
    }
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();

    let mut best_gain = 0.0;
    let mut best: Option<(usize, f64)> = None;

    for &feat_idx in candidates {
        let column = &columns[feat_idx];

        let mut sorted: Vec<(f64, f64)> = indices
            .iter()
            .map(|&si| (column[si], targets[si]))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        for i in 0..(n_samples - 1) {
            let (value, target) = sorted[i];
            left_sum += target;

            // Equal neighbours belong to the same side of any threshold.
            if value == sorted[i + 1].0 {
                continue;
            }

            let n_left = i + 1;
            let gain =
                variance_reduction(left_sum, n_left, total_sum - left_sum, n_samples - n_left);
            if gain > best_gain {
                best_gain = gain;
                best = Some((feat_idx, value));
            }
        }
    }

    let (feat_idx, threshold) = best?;

    let column = &columns[feat_idx];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|&&si| column[si] <= threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(feat_idx),
        threshold,
        gain: best_gain,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{find_best_split, mean_at, sample_features, variance, variance_reduction};

    #[test]
    fn variance_is_population_variance() {
        assert!((variance(&[1.0, 2.0, 3.0, 4.0]) - 1.25).abs() < 1e-12);
    }

    #[test]
    fn variance_of_tiny_inputs_is_zero() {
        assert_eq!(variance(&[]), 0.0);
        assert_eq!(variance(&[42.0]), 0.0);
    }

    #[test]
    fn mean_at_selected_indices() {
        let targets = [1.0, 2.0, 3.0, 10.0];
        assert!((mean_at(&targets, &[0, 3, 3]) - 7.0).abs() < 1e-12);
        assert_eq!(mean_at(&targets, &[]), 0.0);
    }

    #[test]
    fn reduction_matches_explicit_variance_difference() {
        let left = [1.0, 4.0, 2.5];
        let right = [7.0, 3.0, 9.5, 8.0];
        let parent: Vec<f64> = left.iter().chain(right.iter()).copied().collect();
        let n = parent.len() as f64;
        let explicit = variance(&parent)
            - (left.len() as f64 / n) * variance(&left)
            - (right.len() as f64 / n) * variance(&right);
        let fast = variance_reduction(
            left.iter().sum(),
            left.len(),
            right.iter().sum(),
            right.len(),
        );
        assert!((explicit - fast).abs() < 1e-10, "{explicit} vs {fast}");
    }

    #[test]
    fn step_function_splits_between_groups() {
        // x = [0, 1, 2, 3], y = [0, 0, 10, 10] → threshold 1.0.
        let columns = vec![vec![0.0, 1.0, 2.0, 3.0]];
        let targets = vec![0.0, 0.0, 10.0, 10.0];
        let indices: Vec<usize> = (0..4).collect();

        let split = find_best_split(&columns, &targets, &indices, &[0]).expect("should split");
        assert_eq!(split.feature.index(), 0);
        assert_eq!(split.threshold, 1.0);
        assert_eq!(split.left_indices, vec![0, 1]);
        assert_eq!(split.right_indices, vec![2, 3]);
        assert!((split.gain - 25.0).abs() < 1e-12);
    }

    #[test]
    fn unsorted_partition_is_scanned_in_value_order() {
        let columns = vec![vec![3.0, 0.0, 2.0, 1.0]];
        let targets = vec![10.0, 0.0, 10.0, 0.0];
        let indices: Vec<usize> = (0..4).collect();

        let split = find_best_split(&columns, &targets, &indices, &[0]).unwrap();
        assert_eq!(split.threshold, 1.0);
        assert_eq!(split.left_indices, vec![1, 3]);
        assert_eq!(split.right_indices, vec![0, 2]);
    }

    #[test]
    fn constant_feature_returns_none() {
        let columns = vec![vec![5.0, 5.0, 5.0, 5.0]];
        let targets = vec![0.0, 1.0, 2.0, 3.0];
        let indices: Vec<usize> = (0..4).collect();
        assert!(find_best_split(&columns, &targets, &indices, &[0]).is_none());
    }

    #[test]
    fn zero_gain_split_is_not_accepted() {
        // Both possible thresholds leave the child means equal to the parent's.
        let columns = vec![vec![0.0, 1.0, 1.0, 2.0]];
        let targets = vec![5.0, 0.0, 10.0, 5.0];
        let indices: Vec<usize> = (0..4).collect();
        assert!(find_best_split(&columns, &targets, &indices, &[0]).is_none());
    }

    #[test]
    fn tie_keeps_first_candidate_feature() {
        // Features 0 and 1 separate the targets identically.
        let columns = vec![vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0, 3.0]];
        let targets = vec![0.0, 0.0, 10.0, 10.0];
        let indices: Vec<usize> = (0..4).collect();

        let split = find_best_split(&columns, &targets, &indices, &[1, 0]).unwrap();
        assert_eq!(split.feature.index(), 1);
        let split = find_best_split(&columns, &targets, &indices, &[0, 1]).unwrap();
        assert_eq!(split.feature.index(), 0);
    }

    #[test]
    fn only_candidate_features_are_considered() {
        // Feature 0 is informative but not a candidate; feature 1 is constant.
        let columns = vec![vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0, 1.0]];
        let targets = vec![0.0, 0.0, 10.0, 10.0];
        let indices: Vec<usize> = (0..4).collect();
        assert!(find_best_split(&columns, &targets, &indices, &[1]).is_none());
    }

    #[test]
    fn single_sample_returns_none() {
        let columns = vec![vec![1.0, 2.0]];
        let targets = vec![0.0, 1.0];
        assert!(find_best_split(&columns, &targets, &[1], &[0]).is_none());
    }

    #[test]
    fn sample_features_distinct_and_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for k in 1..=6 {
            let mut picked = sample_features(6, k, &mut rng);
            assert_eq!(picked.len(), k);
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked.len(), k);
            assert!(picked.iter().all(|&f| f < 6));
        }
    }

    #[test]
    fn sample_features_is_seed_deterministic() {
        let a = sample_features(10, 4, &mut ChaCha8Rng::seed_from_u64(3));
        let b = sample_features(10, 4, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
