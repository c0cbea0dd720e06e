//! Telemetry CSV reader producing a feature table.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::IoError;
use crate::domain::{FEATURE_COLUMNS, FeatureTable, TARGET_COLUMN};

/// ThingSpeak channel field names accepted in place of the canonical names.
const FIELD_ALIASES: [(&str, &str); 5] = [
    ("humid", "field1"),
    ("temp", "field2"),
    ("light", "field3"),
    ("water_level", "field4"),
    ("water_time", "field5"),
];

/// Reservoir level column. Not a model input, but a row without it is
/// an incomplete reading and is dropped when the column is present.
const WATER_LEVEL_COLUMN: &str = "water_level";

/// Reads sensor telemetry from a CSV file.
///
/// Expected CSV format:
/// - Header row required; column order is free and extra columns are ignored
/// - Columns `humid`, `temp`, `light`, `water_time` (or the channel fields
///   `field1`, `field2`, `field3`, `field5`)
/// - Optional column `water_level` (or `field4`)
///
/// Rows with an empty, non-numeric, or non-finite value in any required
/// column, or in `water_level` when that column exists, are dropped, since
/// partial feeds are normal for intermittent sensors.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent |
/// | [`IoError::EmptyDataset`] | No complete data row |
pub struct TelemetryReader {
    path: PathBuf,
}

impl TelemetryReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the CSV file, returning a [`FeatureTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<FeatureTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so short rows are dropped like incomplete ones
        // instead of failing the whole file.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let columns = self.resolve_columns(&header)?;
        let water_level = find_column(&header, WATER_LEVEL_COLUMN);
        debug!(?columns, ?water_level, "resolved telemetry columns");

        let mut features = Vec::new();
        let mut targets = Vec::new();
        let mut dropped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| self.csv_error(e))?;

            let parsed: Option<Vec<f64>> =
                columns.iter().map(|&col| parse_cell(&record, col)).collect();
            let level_ok = water_level.is_none_or(|col| parse_cell(&record, col).is_some());

            match parsed {
                Some(mut values) if level_ok => {
                    let target = values.pop().unwrap_or_default();
                    features.push(values);
                    targets.push(target);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, "dropped incomplete telemetry rows");
        }

        if targets.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_samples = targets.len(), "telemetry loaded");

        Ok(FeatureTable::new(features, targets))
    }

    /// Map each required column (features, then target) to its header position.
    fn resolve_columns(&self, header: &csv::StringRecord) -> Result<Vec<usize>, IoError> {
        FEATURE_COLUMNS
            .iter()
            .chain(std::iter::once(&TARGET_COLUMN))
            .map(|&name| {
                find_column(header, name).ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column: name,
                })
            })
            .collect()
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Position of `name` in the header, falling back to its channel field alias.
fn find_column(header: &csv::StringRecord, name: &str) -> Option<usize> {
    let alias = FIELD_ALIASES
        .iter()
        .find(|(canonical, _)| *canonical == name)
        .map(|(_, field)| *field);
    header
        .iter()
        .position(|h| h == name)
        .or_else(|| alias.and_then(|a| header.iter().position(|h| h == a)))
}

/// Finite numeric value of cell `col`, or `None` when empty, missing, or unparseable.
fn parse_cell(record: &csv::StringRecord, col: usize) -> Option<f64> {
    record
        .get(col)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
