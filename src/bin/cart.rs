use clap::{Parser, Subcommand};
use csv::ReaderBuilder;
use nalgebra::{DMatrix, DVector};
use rusty_cart::data::dataset::Dataset;
use rusty_cart::data::normalize::MinMaxTable;
use rusty_cart::metrics::errors::RegressionMetrics;
use rusty_cart::trees::params::{DEFAULT_MAX_DEPTH, DEFAULT_MIN_SAMPLES_SPLIT};
use rusty_cart::trees::regressor::DecisionTreeRegressor;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cart")]
#[command(about = "Train and query CART regression trees on CSV data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a tree on a CSV file and report its test RMSE
    Train {
        /// CSV file with a header row; every column must be numeric
        data: PathBuf,

        /// Target column name (defaults to the last column)
        #[arg(short, long)]
        target: Option<String>,

        /// Share of the rows used for training
        #[arg(long, default_value_t = 0.8)]
        train_size: f64,

        /// Random seed for the train/test split
        #[arg(long, default_value_t = 41)]
        seed: u64,

        /// Minimum samples a node needs before it may split
        #[arg(long, default_value_t = DEFAULT_MIN_SAMPLES_SPLIT)]
        min_samples_split: u16,

        /// Deepest level at which a node may still split
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: u16,

        /// Print the fitted tree
        #[arg(long)]
        print: bool,

        /// Write the tree as Graphviz DOT
        #[arg(long)]
        dot: Option<PathBuf>,

        /// Save the fitted model as JSON
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Predict one raw sample with a saved model
    Predict {
        /// Model saved by `train --model`
        #[arg(short, long)]
        model: PathBuf,

        /// CSV table with Feature,Min,Max columns
        #[arg(long)]
        min_max: PathBuf,

        /// Raw feature values as name=value, one per training column, any order
        #[arg(required = true)]
        features: Vec<String>,
    },
}

/// Reads a headed CSV, splitting it into features and the `target` column.
fn read_file_regression(
    file_path: &Path,
    target: Option<&str>,
) -> Result<(Dataset<f64>, Vec<String>), Box<dyn Error>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(file_path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let target_idx = match target {
        Some(name) => headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| format!("Missing target column {name:?}"))?,
        None => headers.len().checked_sub(1).ok_or("Empty header row")?,
    };
    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != target_idx)
        .map(|(_, name)| name.clone())
        .collect();

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for result in reader.records() {
        let record = result?;
        for (idx, field) in record.iter().enumerate() {
            let value = field.trim().parse::<f64>()?;
            if idx == target_idx {
                labels.push(value);
            } else {
                features.push(value);
            }
        }
    }
    if labels.is_empty() {
        return Err("No rows in dataset".into());
    }

    let feature_matrix = DMatrix::from_row_slice(labels.len(), feature_names.len(), &features);
    let dataset = Dataset::try_new(feature_matrix, DVector::from_vec(labels))?;
    Ok((dataset, feature_names))
}

#[allow(clippy::too_many_arguments)]
fn train(
    data: &Path,
    target: Option<&str>,
    train_size: f64,
    seed: u64,
    min_samples_split: u16,
    max_depth: u16,
    print: bool,
    dot: Option<&Path>,
    model: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let (dataset, feature_names) = read_file_regression(data, target)?;
    println!(
        "Loaded dataset: {} rows, features {:?}",
        dataset.nrows(),
        feature_names
    );

    let (train_dataset, test_dataset) = dataset.train_test_split(train_size, Some(seed))?;

    let mut regressor = DecisionTreeRegressor::with_params(Some(min_samples_split), Some(max_depth))?;
    regressor.set_feature_names(feature_names);
    let report = regressor.fit(&train_dataset)?;
    println!("{}", report);

    if print {
        print!("{}", regressor.print_tree()?);
    }
    if let Some(path) = dot {
        regressor.export_graph()?.write_dot(path)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = model {
        regressor.save_json(path)?;
        println!("Saved model to {}", path.display());
    }

    if test_dataset.nrows() > 0 {
        let start = Instant::now();
        let predictions = regressor.predict(&test_dataset.x)?;
        println!(
            "Prediction time: {:.4} seconds",
            start.elapsed().as_secs_f64()
        );
        println!("Test RMSE: {}", regressor.rmse(&test_dataset.y, &predictions)?);
    }
    Ok(())
}

fn predict(model: &Path, min_max: &Path, features: &[String]) -> Result<(), Box<dyn Error>> {
    let regressor = DecisionTreeRegressor::<f64>::load_json(model)?;
    let table = MinMaxTable::from_csv_path(min_max)?;

    let mut named_features = Vec::with_capacity(features.len());
    for feature in features {
        let (name, value) = feature
            .split_once('=')
            .ok_or_else(|| format!("Expected name=value, got {feature:?}"))?;
        named_features.push((name.trim(), value.trim().parse::<f64>()?));
    }

    let (prediction, normalized) = regressor.predict_named(&named_features, &table)?;
    println!("Normalized features: {:?}", normalized);
    println!("Prediction: {}", prediction);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            target,
            train_size,
            seed,
            min_samples_split,
            max_depth,
            print,
            dot,
            model,
        } => train(
            &data,
            target.as_deref(),
            train_size,
            seed,
            min_samples_split,
            max_depth,
            print,
            dot.as_deref(),
            model.as_deref(),
        ),
        Commands::Predict {
            model,
            min_max,
            features,
        } => predict(&model, &min_max, &features),
    }
}
