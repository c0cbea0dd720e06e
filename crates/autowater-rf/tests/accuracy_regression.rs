//! Accuracy regression tests for autowater-rf.
//!
//! These tests pin the behaviour of tree growth and ensembling on small
//! deterministic datasets so that algorithmic changes cannot silently
//! degrade predictions.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use autowater_rf::{
    Bootstrapper, Dataset, ErrorKind, Node, RandomForestConfig, RandomForestRegressor,
    RegressionTree, RfError, TreeParams, deserialize, serialize, train, tree_rng,
};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic regression dataset
// ---------------------------------------------------------------------------

/// Generate a 300-sample, 6-feature regression dataset.
///
/// Target = 4·x0 − 2·x1 + x2² with small noise; features 3-5 are pure noise.
fn make_regression() -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut features = Vec::with_capacity(300);
    let mut targets = Vec::with_capacity(300);
    for _ in 0..300 {
        let row: Vec<f64> = (0..6).map(|_| rng.r#gen::<f64>() * 10.0).collect();
        let noise = (rng.r#gen::<f64>() - 0.5) * 0.1;
        targets.push(4.0 * row[0] - 2.0 * row[1] + row[2] * row[2] + noise);
        features.push(row);
    }
    Dataset::new(features, targets).unwrap()
}

fn rmse(predictions: &[f64], targets: &[f64]) -> f64 {
    let sse: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t) * (p - t))
        .sum();
    (sse / targets.len() as f64).sqrt()
}

// ---------------------------------------------------------------------------
// a) fit quality
// ---------------------------------------------------------------------------

/// The forest must explain most of the target variance on its training data.
#[test]
fn training_rmse_well_below_target_spread() {
    let dataset = make_regression();
    let forest = RandomForestConfig::new(50).unwrap().fit(&dataset).unwrap();
    let predictions = forest.predict(dataset.features()).unwrap();

    let spread = autowater_rf::variance(dataset.targets()).sqrt();
    let error = rmse(&predictions, dataset.targets());
    assert!(
        error < 0.35 * spread,
        "training rmse {error} not below 0.35 of target std {spread}"
    );
}

/// Averaging bootstrapped trees should generalise better than predicting the mean.
#[test]
fn holdout_rmse_beats_mean_baseline() {
    let dataset = make_regression();
    let (train_rows, test_rows) = dataset.features().split_at(240);
    let (train_targets, test_targets) = dataset.targets().split_at(240);

    let forest = train(
        train_rows.to_vec(),
        train_targets.to_vec(),
        RandomForestConfig::new(40).unwrap().with_n_features_per_split(Some(3)),
    )
    .unwrap();
    let predictions = forest.predict(test_rows).unwrap();

    let mean = train_targets.iter().sum::<f64>() / train_targets.len() as f64;
    let baseline = rmse(&vec![mean; test_targets.len()], test_targets);
    let error = rmse(&predictions, test_targets);
    assert!(error < 0.7 * baseline, "holdout rmse {error} vs baseline {baseline}");
}

// ---------------------------------------------------------------------------
// b) structural properties
// ---------------------------------------------------------------------------

/// max_depth = 0 yields one leaf holding the mean of all targets.
#[test]
fn depth_zero_tree_is_mean_leaf() {
    let dataset = make_regression();
    let mut tree = RegressionTree::new(TreeParams::new().with_max_depth(0));
    tree.fit(&dataset, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();

    let mean = dataset.targets().iter().sum::<f64>() / dataset.n_samples() as f64;
    match tree.root() {
        Some(Node::Leaf { value, n_samples }) => {
            assert!((value - mean).abs() < 1e-9);
            assert_eq!(*n_samples, dataset.n_samples());
        }
        other => panic!("expected a single leaf, got {other:?}"),
    }
}

/// Constant targets give single-leaf trees and a constant forest.
#[test]
fn constant_targets_predict_constant() {
    let features: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 4) as f64]).collect();
    let targets = vec![12.5; 30];
    let forest = train(
        features,
        targets,
        RandomForestConfig::new(10).unwrap().with_max_depth(50),
    )
    .unwrap();

    assert!(forest.trees().iter().all(|t| t.n_leaves() == 1));
    for sample in [[0.0, 0.0], [100.0, -4.0], [15.5, 2.0]] {
        assert_eq!(forest.predict_one(&sample).unwrap(), 12.5);
    }
}

/// With min_samples_split = 1 and unlimited depth, a tree memorises distinct rows.
#[test]
fn unrestricted_tree_has_zero_training_residual() {
    let dataset = make_regression();
    let mut tree = RegressionTree::new(
        TreeParams::new()
            .with_min_samples_split(1)
            .with_max_depth(usize::MAX),
    );
    tree.fit(&dataset, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();

    for (row, target) in dataset.features().iter().zip(dataset.targets()) {
        assert_eq!(tree.predict_one(row).unwrap(), *target);
    }
}

/// The documented step-function scenario.
#[test]
fn step_function_scenario() {
    let dataset = Dataset::new(
        vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
        vec![0.0, 0.0, 10.0, 10.0],
    )
    .unwrap();
    let mut tree = RegressionTree::new(
        TreeParams::new()
            .with_min_samples_split(2)
            .with_max_depth(3)
            .with_n_features_per_split(Some(1)),
    );
    tree.fit(&dataset, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();

    assert_eq!(tree.predict_one(&[0.5]).unwrap(), 0.0);
    assert_eq!(tree.predict_one(&[2.5]).unwrap(), 10.0);
}

// ---------------------------------------------------------------------------
// c) reproducibility
// ---------------------------------------------------------------------------

/// Same config and seed must produce bit-identical forests across two independent runs.
#[test]
fn deterministic_forest_with_same_seed() {
    let dataset = make_regression();
    let config = RandomForestConfig::new(50)
        .unwrap()
        .with_n_features_per_split(Some(2))
        .with_seed(7);

    let forest1 = config.fit(&dataset).unwrap();
    let forest2 = config.fit(&dataset).unwrap();
    assert_eq!(forest1, forest2);
    assert_eq!(serialize(&forest1).unwrap(), serialize(&forest2).unwrap());

    let preds1 = forest1.predict(dataset.features()).unwrap();
    let preds2 = forest2.predict(dataset.features()).unwrap();
    let bits1: Vec<u64> = preds1.iter().map(|p| p.to_bits()).collect();
    let bits2: Vec<u64> = preds2.iter().map(|p| p.to_bits()).collect();
    assert_eq!(bits1, bits2, "predictions differ across runs with the same seed");
}

/// Thread-pool size must not change the grown forest.
#[test]
fn forest_independent_of_thread_count() {
    let dataset = make_regression();
    let config = RandomForestConfig::new(12).unwrap().with_n_features_per_split(Some(2));

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| config.fit(&dataset).unwrap());
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| config.fit(&dataset).unwrap());
    assert_eq!(single, many);
}

/// A one-tree forest equals a standalone tree grown on the same bootstrap stream.
#[test]
fn one_tree_forest_matches_standalone_tree() {
    let dataset = make_regression();
    let config = RandomForestConfig::new(1)
        .unwrap()
        .with_n_features_per_split(Some(2))
        .with_seed(99);
    let forest = config.fit(&dataset).unwrap();

    let mut rng = tree_rng(99, 0);
    let sample = Bootstrapper::sample(&dataset, &mut rng);
    let mut tree = RegressionTree::new(config.tree_params());
    tree.fit(&sample, &mut rng).unwrap();

    let forest_preds = forest.predict(dataset.features()).unwrap();
    let tree_preds = tree.predict(dataset.features()).unwrap();
    assert_eq!(forest_preds, tree_preds);
}

// ---------------------------------------------------------------------------
// d) contract errors and persistence
// ---------------------------------------------------------------------------

#[test]
fn error_kinds_follow_contract() {
    assert_eq!(
        RandomForestConfig::new(0).unwrap_err().kind(),
        ErrorKind::Input
    );
    assert_eq!(
        train(vec![], vec![], RandomForestConfig::new(1).unwrap())
            .unwrap_err()
            .kind(),
        ErrorKind::Input
    );

    let unfitted = RandomForestRegressor::new(RandomForestConfig::new(1).unwrap());
    assert_eq!(
        unfitted.predict(&[vec![1.0]]).unwrap_err().kind(),
        ErrorKind::InvalidState
    );

    let dataset = make_regression();
    let forest = RandomForestConfig::new(2).unwrap().fit(&dataset).unwrap();
    let err = forest.predict_one(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, RfError::PredictionFeatureMismatch { expected: 6, got: 2 }));
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn persisted_forest_predicts_identically() {
    let dataset = make_regression();
    let forest = RandomForestConfig::new(20).unwrap().fit(&dataset).unwrap();
    let restored = deserialize(&serialize(&forest).unwrap()).unwrap();

    assert_eq!(restored.n_trees(), 20);
    assert_eq!(restored.config(), forest.config());
    assert_eq!(
        restored.predict(dataset.features()).unwrap(),
        forest.predict(dataset.features()).unwrap()
    );
}
