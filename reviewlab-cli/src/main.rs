//! Reviewlab CLI — prepare review datasets and drive the managed
//! text-classification service.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Reviewlab: review-dataset preparation and training driver
#[derive(Parser, Debug)]
#[command(name = "reviewlab", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (where .reviewlab/config.toml is looked up)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path (overrides workspace lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Label, shuffle, and split a JSONL review file into train/validation sets
    Prepare {
        /// Input JSONL file with `text` and `rating` fields per line
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the two output files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Fraction of records allocated to training
        #[arg(long)]
        ratio: Option<f64>,

        /// Shuffle seed, for reproducible splits
        #[arg(long)]
        seed: Option<u64>,

        /// Keep input order instead of shuffling
        #[arg(long)]
        no_shuffle: bool,

        /// Policy for invalid records
        #[arg(long, value_enum)]
        on_invalid: Option<commands::OnInvalid>,

        /// Fail when the split leaves either subset empty
        #[arg(long)]
        deny_empty_split: bool,
    },
    /// Upload prepared train/validation files to remote storage
    Upload {
        /// Prepared training file
        #[arg(long)]
        train: PathBuf,

        /// Prepared validation file
        #[arg(long)]
        validation: PathBuf,

        /// Remote object name prefix (random if omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// Start a training job over two uploaded datasets
    Train {
        /// URI of the uploaded training set
        #[arg(long)]
        train_uri: String,

        /// URI of the uploaded validation set
        #[arg(long)]
        validation_uri: String,

        /// Number of epochs
        #[arg(long)]
        epochs: Option<u32>,

        /// Learning rate
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Word-vector dimension
        #[arg(long)]
        vector_dim: Option<u32>,

        /// Word n-gram order
        #[arg(long)]
        word_ngrams: Option<u32>,

        /// Disable early stopping
        #[arg(long)]
        no_early_stopping: bool,

        /// Poll the job to completion
        #[arg(long)]
        wait: bool,

        /// Poll interval in seconds when waiting
        #[arg(long, default_value = "15")]
        poll_secs: u64,
    },
    /// Deploy a trained artifact behind a prediction endpoint
    Deploy {
        /// Trained model artifact URI
        #[arg(long)]
        artifact: String,

        /// Instance type for the endpoint
        #[arg(long)]
        instance_type: Option<String>,

        /// Number of instances
        #[arg(long)]
        instance_count: Option<u32>,
    },
    /// Classify text against a deployed endpoint
    Predict {
        /// Prediction endpoint URL
        #[arg(long)]
        endpoint: String,

        /// Text instance to classify (repeatable)
        #[arg(long, required = true)]
        text: Vec<String>,

        /// Number of predictions to return per instance
        #[arg(long, default_value = "1")]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => "info".to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "reviewlab", "reviewlab")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "reviewlab.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    tracing::debug!(workspace = %workspace.display(), "resolved workspace");

    // Load configuration
    let config = match &cli.config {
        Some(path) => reviewlab_core::config::load_config_from(path),
        None => reviewlab_core::config::load_config(Some(&workspace), None),
    }
    .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    commands::handle_command(cli.command, config).await
}
