//! Model serialization and deserialization via bincode.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::forest::RandomForestRegressor;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Number of trees in the forest.
    n_trees: usize,
    /// Number of features the model was trained on.
    n_features: Option<usize>,
    /// The serialized forest: configuration plus every tree's node structure.
    forest: RandomForestRegressor,
}

/// Encode a forest as bytes.
///
/// Uses bincode encoding wrapped in a versioned envelope.
///
/// # Errors
///
/// Returns [`RfError::SerializeModel`] if bincode encoding fails.
pub fn serialize(forest: &RandomForestRegressor) -> Result<Vec<u8>, RfError> {
    let envelope = ModelEnvelope {
        format_version: FORMAT_VERSION,
        n_trees: forest.trees.len(),
        n_features: forest.n_features,
        forest: forest.clone(),
    };
    bincode::serialize(&envelope).map_err(|e| RfError::SerializeModel { source: e })
}

/// Decode a forest previously produced by [`serialize`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::DeserializeModel`] | bincode decoding failed |
/// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
/// | [`RfError::CorruptModel`] | envelope and forest disagree, or a tree reads a feature past the model's arity or holds a non-finite value |
pub fn deserialize(bytes: &[u8]) -> Result<RandomForestRegressor, RfError> {
    let envelope: ModelEnvelope =
        bincode::deserialize(bytes).map_err(|e| RfError::DeserializeModel { source: e })?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(RfError::IncompatibleModelVersion {
            expected: FORMAT_VERSION,
            found: envelope.format_version,
        });
    }

    let forest = envelope.forest;
    if envelope.n_trees != forest.trees.len() {
        return Err(RfError::CorruptModel {
            reason: format!(
                "envelope declares {} trees, found {}",
                envelope.n_trees,
                forest.trees.len()
            ),
        });
    }
    if envelope.n_features != forest.n_features
        || forest
            .trees
            .iter()
            .any(|t| t.n_features() != forest.n_features)
    {
        return Err(RfError::CorruptModel {
            reason: "trees disagree on feature count".to_string(),
        });
    }
    if let Some(n_features) = forest.n_features {
        for (tree_index, tree) in forest.trees.iter().enumerate() {
            let Some(root) = tree.root() else {
                return Err(RfError::CorruptModel {
                    reason: format!("tree {tree_index} has no root"),
                });
            };
            root.check_structure(n_features)
                .map_err(|reason| RfError::CorruptModel {
                    reason: format!("tree {tree_index}: {reason}"),
                })?;
        }
    }

    debug!(
        n_trees = envelope.n_trees,
        n_features = ?envelope.n_features,
        "model decoded"
    );

    Ok(forest)
}

impl RandomForestRegressor {
    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    /// | [`RfError::WriteModel`] | file write failed |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();
        let bytes = serialize(self)?;

        std::fs::write(path, &bytes).map_err(|e| RfError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = self.trees.len(),
            "model saved"
        );

        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ReadModel`] | file read failed |
    /// | [`RfError::DeserializeModel`] | bincode decoding failed |
    /// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
    /// | [`RfError::CorruptModel`] | envelope and forest disagree |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| RfError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        deserialize(&bytes)
    }
}
