use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use autowater_io::{FEATURE_COLUMNS, FeatureTable, TelemetryReader, generate_synthetic};
use autowater_rf::{RandomForestConfig, RandomForestRegressor};

#[derive(Parser)]
#[command(name = "autowater")]
#[command(about = "Random Forest watering-time model for soil sensor telemetry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Train a watering-time model and save it to disk
    Train {
        /// Path to a telemetry CSV file (humid, temp, light, water_time)
        #[arg(long, conflicts_with = "synthetic")]
        data: Option<PathBuf>,

        /// Number of synthetic samples to generate when no CSV is given
        #[arg(long, default_value_t = 200)]
        synthetic: usize,

        /// Output path for the trained model
        #[arg(long, default_value = "water_time_model.bin")]
        model: PathBuf,

        /// Number of trees in the Random Forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Maximum tree depth
        #[arg(long, default_value_t = 100)]
        max_depth: usize,

        /// Minimum node size eligible for splitting
        #[arg(long, default_value_t = 2)]
        min_samples_split: usize,

        /// Features sampled per split (all features if not set)
        #[arg(long)]
        features_per_split: Option<usize>,
    },

    /// Predict watering time for a single sensor reading
    Predict {
        /// Path to the trained model binary
        #[arg(long, default_value = "water_time_model.bin")]
        model: PathBuf,

        /// Relative humidity (%)
        #[arg(long, allow_negative_numbers = true)]
        humid: f64,

        /// Temperature (°C)
        #[arg(long, allow_negative_numbers = true)]
        temp: f64,

        /// Raw light sensor reading
        #[arg(long, allow_negative_numbers = true)]
        light: f64,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    source: String,
    n_samples: usize,
    n_features: usize,
    feature_names: Vec<&'static str>,
    n_trees: usize,
    train_rmse: f64,
    model: PathBuf,
}

#[derive(Serialize)]
struct PredictOutput {
    water_time: i64,
}

fn rmse(predictions: &[f64], targets: &[f64]) -> f64 {
    let sse: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    (sse / targets.len() as f64).sqrt()
}

fn load_table(data: Option<&PathBuf>, synthetic: usize, seed: u64) -> Result<(FeatureTable, String)> {
    match data {
        Some(path) => {
            let table = TelemetryReader::new(path)
                .read()
                .context("failed to read telemetry CSV")?;
            Ok((table, path.display().to_string()))
        }
        None => {
            anyhow::ensure!(synthetic > 0, "--synthetic must be at least 1");
            Ok((generate_synthetic(synthetic, seed), "synthetic".to_string()))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            synthetic,
            model,
            n_trees,
            max_depth,
            min_samples_split,
            features_per_split,
        } => {
            let (table, source) = load_table(data.as_ref(), synthetic, cli.seed)?;
            info!(n_samples = table.n_samples(), %source, "training data ready");

            let dataset = table
                .into_dataset()
                .context("telemetry is not a valid training set")?;

            let forest = RandomForestConfig::new(n_trees)?
                .with_max_depth(max_depth)
                .with_min_samples_split(min_samples_split)
                .with_n_features_per_split(features_per_split)
                .with_seed(cli.seed)
                .fit(&dataset)
                .context("training failed")?;

            let predictions = forest
                .predict(dataset.features())
                .context("failed to score training set")?;
            let train_rmse = rmse(&predictions, dataset.targets());
            info!(train_rmse, "training complete");

            forest
                .save(&model)
                .with_context(|| format!("failed to save model to {}", model.display()))?;

            let output = TrainOutput {
                source,
                n_samples: dataset.n_samples(),
                n_features: dataset.n_features(),
                feature_names: FEATURE_COLUMNS.to_vec(),
                n_trees: forest.n_trees(),
                train_rmse,
                model,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            humid,
            temp,
            light,
        } => {
            let forest = RandomForestRegressor::load(&model)
                .with_context(|| format!("failed to load model from {}", model.display()))?;
            info!(n_trees = forest.n_trees(), "model loaded");

            let prediction = forest
                .predict_one(&[humid, temp, light])
                .context("prediction failed")?;

            let output = PredictOutput {
                water_time: prediction.trunc() as i64,
            };
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    Ok(())
}
