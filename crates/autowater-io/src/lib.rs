//! Telemetry ingestion for the autowater pipeline: CSV sensor feeds and
//! synthetic bootstrap data, both delivered as a [`FeatureTable`].

mod domain;
mod error;
mod reader;
mod synthetic;

pub use domain::{FEATURE_COLUMNS, FeatureTable, TARGET_COLUMN};
pub use error::IoError;
pub use reader::TelemetryReader;
pub use synthetic::{generate_synthetic, heuristic_water_time};
