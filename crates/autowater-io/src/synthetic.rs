//! Synthetic training data for bootstrapping a model without telemetry.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::domain::FeatureTable;

/// Relative humidity (%) above which the soil is wet enough to skip watering.
const WET_HUMIDITY: f64 = 70.0;

/// Upper bound of the light sensor's raw reading.
const LIGHT_MAX: f64 = 4096.0;

/// Watering time (seconds) for one reading under the bootstrap heuristic.
///
/// Zero when humidity exceeds 70%; otherwise dryness, temperature above
/// 15 °C, and light each add to a 30 s scale, truncated to whole seconds.
#[must_use]
pub fn heuristic_water_time(humidity: f64, temperature: f64, light: f64) -> f64 {
    if humidity > WET_HUMIDITY {
        return 0.0;
    }
    let dryness_factor = (WET_HUMIDITY - humidity) / WET_HUMIDITY;
    let temp_factor = (temperature - 15.0) / 25.0;
    let light_factor = light / LIGHT_MAX;
    let seconds = (dryness_factor + temp_factor * 0.5 + light_factor * 0.3) * 30.0;
    seconds.trunc().max(0.0)
}

/// Generate `n_samples` readings labelled by [`heuristic_water_time`].
///
/// Humidity is uniform in [0, 100), temperature in [15, 40) °C, and light
/// in [0, 4096). Identical seeds produce identical tables.
#[instrument]
pub fn generate_synthetic(n_samples: usize, seed: u64) -> FeatureTable {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let humidity = rng.gen_range(0.0..100.0);
        let temperature = rng.gen_range(15.0..40.0);
        let light = rng.gen_range(0.0..LIGHT_MAX);
        targets.push(heuristic_water_time(humidity, temperature, light));
        features.push(vec![humidity, temperature, light]);
    }

    debug!(n_samples, "generated synthetic telemetry");
    FeatureTable::new(features, targets)
}

#[cfg(test)]
mod tests {
    use super::{generate_synthetic, heuristic_water_time};

    #[test]
    fn wet_soil_needs_no_water() {
        assert_eq!(heuristic_water_time(70.1, 40.0, 4000.0), 0.0);
        assert_eq!(heuristic_water_time(99.0, 15.0, 0.0), 0.0);
    }

    #[test]
    fn driest_hottest_brightest_reading() {
        // (1.0 + 0.5 + 0.3 * 4095/4096) * 30 = 53.99... → 53
        assert_eq!(heuristic_water_time(0.0, 40.0, 4095.0), 53.0);
    }

    #[test]
    fn boundary_humidity_is_watered() {
        // Exactly 70% is not "above" the threshold: (0 + 0.5 * 0.4 + 0) * 30 = 6
        assert_eq!(heuristic_water_time(70.0, 25.0, 0.0), 6.0);
    }

    #[test]
    fn values_within_ranges() {
        let table = generate_synthetic(500, 42);
        assert_eq!(table.n_samples(), 500);
        for (row, &target) in table.features().iter().zip(table.targets()) {
            assert!((0.0..100.0).contains(&row[0]));
            assert!((15.0..40.0).contains(&row[1]));
            assert!((0.0..4096.0).contains(&row[2]));
            assert!((0.0..=54.0).contains(&target));
            assert_eq!(target, target.trunc());
        }
    }

    #[test]
    fn same_seed_same_table() {
        assert_eq!(generate_synthetic(50, 9), generate_synthetic(50, 9));
        assert_ne!(generate_synthetic(50, 9), generate_synthetic(50, 10));
    }
}
