//! Random Forest regression: train, predict, persist.
//!
//! Provides hand-rolled CART regression trees grown by exhaustive
//! variance-reduction split search, bootstrap aggregation into a Random
//! Forest regressor, seed-reproducible parallel training via rayon, and
//! model serialization.

mod bootstrap;
mod config;
mod dataset;
mod error;
mod forest;
mod node;
mod predict;
mod serialize;
mod split;
mod tree;

pub use bootstrap::Bootstrapper;
pub use config::RandomForestConfig;
pub use dataset::Dataset;
pub use error::{ErrorKind, RfError};
pub use forest::{RandomForestRegressor, train, tree_rng};
pub use node::{FeatureIndex, Node};
pub use serialize::{deserialize, serialize};
pub use split::variance;
pub use tree::{RegressionTree, TreeParams};
