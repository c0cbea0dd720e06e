//! Domain types for autowater-io.

use autowater_rf::{Dataset, RfError};

/// Sensor columns fed to the model, in feature order.
pub const FEATURE_COLUMNS: [&str; 3] = ["humid", "temp", "light"];

/// Column holding the regression target (watering time in seconds).
pub const TARGET_COLUMN: &str = "water_time";

/// A feature table of sensor readings and watering times.
///
/// Feature rows and targets are stored in parallel vectors;
/// `features[i]` was observed together with `targets[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    /// Feature values: `features[sample_index][feature_index]`.
    features: Vec<Vec<f64>>,
    /// Watering time per sample.
    targets: Vec<f64>,
}

impl FeatureTable {
    /// Create a new table from parallel feature rows and targets.
    pub(crate) fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Self {
        debug_assert_eq!(features.len(), targets.len());
        Self { features, targets }
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[&'static str] {
        &FEATURE_COLUMNS
    }

    /// Return the feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the watering-time targets.
    #[must_use]
    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    /// Convert into a validated training [`Dataset`].
    ///
    /// # Errors
    ///
    /// Any validation error from [`Dataset::new`].
    pub fn into_dataset(self) -> Result<Dataset, RfError> {
        Dataset::new(self.features, self.targets)
    }
}
