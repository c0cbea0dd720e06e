use std::path::PathBuf;

/// Broad category of an [`RfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, empty, or arity-mismatched data, or an invalid configuration.
    Input,
    /// The operation is not valid in the model's current state.
    InvalidState,
    /// Encoding, decoding, or file I/O of a persisted model failed.
    Persistence,
}

/// Errors from Random Forest operations.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when min_samples_split is zero.
    #[error("min_samples_split must be at least 1, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when features-per-split is explicitly set to zero.
    #[error("n_features_per_split must be at least 1 when set, got 0")]
    InvalidFeaturesPerSplit,

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when the number of targets differs from the number of rows.
    #[error("dataset has {n_rows} rows but {n_targets} targets")]
    TargetCountMismatch {
        /// Number of feature rows.
        n_rows: usize,
        /// Number of target values.
        n_targets: usize,
    },

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a training feature value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a training target is NaN or infinite.
    #[error("non-finite target at sample {sample_index}")]
    NonFiniteTarget {
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a prediction input contains NaN or infinity.
    #[error("non-finite prediction input at feature {feature_index}")]
    NonFinitePredictionInput {
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when predicting with a model that has not been fitted.
    #[error("model has not been fitted")]
    NotFitted,

    /// Returned when fitting a tree whose root has already been grown.
    #[error("tree has already been fitted")]
    AlreadyFitted,

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model")]
    DeserializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when decoding a model with an incompatible format version.
    #[error("incompatible model version: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the byte stream.
        found: u32,
    },

    /// Returned when a decoded model is internally inconsistent.
    #[error("corrupt model: {reason}")]
    CorruptModel {
        /// Human-readable description of the inconsistency.
        reason: String,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl RfError {
    /// Return the category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RfError::NotFitted | RfError::AlreadyFitted => ErrorKind::InvalidState,
            RfError::SerializeModel { .. }
            | RfError::DeserializeModel { .. }
            | RfError::IncompatibleModelVersion { .. }
            | RfError::CorruptModel { .. }
            | RfError::WriteModel { .. }
            | RfError::ReadModel { .. } => ErrorKind::Persistence,
            _ => ErrorKind::Input,
        }
    }
}
