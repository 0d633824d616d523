use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_io::{ExperimentName, RecordReader, ResultWriter};
use arbor_tree::{DEFAULT_TARGET, DecisionTreeConfig, MaxDepth, Schema, train, train_test_split};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "ID3 decision tree classification for bank-marketing records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the train/test shuffle
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for batch prediction (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared tree-building parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Name of the boolean target column
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: String,

    /// Maximum tree depth (the root is depth 0)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    max_depth: i64,
}

#[derive(Subcommand)]
enum Command {
    /// Split a labeled CSV, train a tree, and evaluate it on the held-out part
    Train {
        /// Path to the labeled input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Fraction of records used for training, in (0, 1)
        #[arg(long, default_value_t = 0.8)]
        training_ratio: f64,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the fitted tree to stderr
        #[arg(long, default_value_t = false)]
        show_tree: bool,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Train on all labeled records and predict an unlabeled CSV
    Predict {
        /// Path to the labeled training CSV file
        #[arg(long)]
        data: PathBuf,

        /// Path to the CSV file of records to predict
        #[arg(long)]
        input: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        tree: TreeArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    n_training: usize,
    n_test: usize,
    n_nodes: usize,
    depth: usize,
    accuracy: f64,
    precision: f64,
    recall: f64,
    f1: f64,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_training: usize,
    n_records: usize,
    n_predicted_true: usize,
    model_n_nodes: usize,
    model_depth: usize,
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
            training_ratio,
            experiment,
            output_dir,
            show_tree,
            tree,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Read labeled records
            let dataset = RecordReader::new(&data, Schema::bank_marketing())
                .with_target(Some(tree.target.as_str()))
                .read()
                .context("failed to read training CSV")?;

            // 2. Split
            let (training, test) = train_test_split(dataset.records(), training_ratio, cli.seed)
                .context("failed to split records")?;
            info!(
                n_training = training.len(),
                n_test = test.len(),
                "records split"
            );

            // 3. Train and evaluate
            let result = train(&training, &test, &tree.target, tree.max_depth)
                .context("training failed")?;
            if show_tree {
                eprint!("{}", result.tree());
            }

            // 4. Write artifacts
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_tree(result.tree())?;
            writer.write_evaluation(result.metrics(), result.metadata())?;

            let metrics = result.metrics();
            let output = TrainOutput {
                experiment,
                n_training: result.metadata().n_training,
                n_test: result.metadata().n_test,
                n_nodes: result.metadata().n_nodes,
                depth: result.metadata().depth,
                accuracy: metrics.accuracy,
                precision: metrics.precision,
                recall: metrics.recall,
                f1: metrics.f1,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            data,
            input,
            experiment,
            output_dir,
            tree,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Fit on every labeled record
            let training = RecordReader::new(&data, Schema::bank_marketing())
                .with_target(Some(tree.target.as_str()))
                .read()
                .context("failed to read training CSV")?;
            let max_depth = MaxDepth::try_from(tree.max_depth)?;
            let fitted = DecisionTreeConfig::new()
                .with_target(&tree.target)
                .with_max_depth(max_depth)
                .fit(training.records())
                .context("training failed")?;
            info!(n_nodes = fitted.n_nodes(), depth = fitted.depth(), "tree fitted");

            // 2. Predict
            let records = RecordReader::new(&input, Schema::bank_marketing())
                .read()
                .context("failed to read input CSV")?;
            let predictions = fitted.predict_batch(records.records());

            // 3. Write predictions
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_predictions(records.ids(), &predictions)?;

            let output = PredictOutput {
                experiment,
                n_training: training.len(),
                n_records: records.len(),
                n_predicted_true: predictions.iter().filter(|&&p| p).count(),
                model_n_nodes: fitted.n_nodes(),
                model_depth: fitted.depth(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
