//! Bootstrap resampling of a training set.

use rand::Rng;

use crate::dataset::Dataset;

/// Draws same-size resamples of a dataset with replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bootstrapper;

impl Bootstrapper {
    /// Draw `n_samples` row indices uniformly from `0..n_samples`, with replacement.
    pub fn sample_indices(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    }

    /// Draw a bootstrap sample of `dataset`.
    ///
    /// The result has as many rows as `dataset`; rows may repeat and some
    /// original rows may be missing. Advances `rng` by one draw per row.
    pub fn sample(dataset: &Dataset, rng: &mut impl Rng) -> Dataset {
        let indices = Self::sample_indices(dataset.n_samples(), rng);
        dataset.select(&indices)
    }
}
