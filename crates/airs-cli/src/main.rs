//! AIRS CLI - train and apply immune-inspired classifiers.

mod commands;
mod config;
mod dataset;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airs")]
#[command(author, version, about = "AIRS - Artificial Immune Recognition System classifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default airs.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Train a model on a CSV file
    Train {
        /// Training data (CSV with header row)
        data: String,

        /// Where to write the model (default: data.model_path from airs.toml)
        #[arg(short, long)]
        output: Option<String>,

        /// Class column name (default: last column)
        #[arg(short, long)]
        class: Option<String>,

        /// airs1 or airs2
        #[arg(long)]
        variant: Option<String>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Neighbours consulted when classifying
        #[arg(short)]
        k: Option<usize>,

        /// Train with AIRS2-Parallel on this many threads
        #[arg(short, long)]
        threads: Option<usize>,

        /// Merge mode for parallel training: concatenate or prune
        #[arg(long)]
        merge: Option<String>,
    },

    /// Classify vectors with a trained model
    Classify {
        /// Model file (default: data.model_path from airs.toml)
        #[arg(short, long)]
        model: Option<String>,

        /// Comma-separated attribute values, class omitted
        #[arg(long, conflicts_with = "input")]
        values: Option<String>,

        /// CSV file of vectors to classify
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Train on part of a CSV file and report accuracy on the rest
    Evaluate {
        /// Labeled data (CSV with header row)
        data: String,

        /// Fraction of rows held out for testing
        #[arg(long)]
        holdout: Option<f64>,

        /// Class column name (default: last column)
        #[arg(short, long)]
        class: Option<String>,

        /// Random seed for the split and for training
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show what a trained model contains
    Inspect {
        /// Model file (default: data.model_path from airs.toml)
        model: Option<String>,

        /// List every memory cell
        #[arg(long)]
        cells: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "warn" })?;

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Train {
            data,
            output,
            class,
            variant,
            seed,
            k,
            threads,
            merge,
        } => commands::train::run(commands::train::TrainArgs {
            data,
            output,
            class,
            variant,
            seed,
            k,
            threads,
            merge,
        }),
        Commands::Classify { model, values, input } => {
            commands::classify::run(model, values, input)
        }
        Commands::Evaluate {
            data,
            holdout,
            class,
            seed,
        } => commands::evaluate::run(&data, holdout, class, seed),
        Commands::Inspect { model, cells } => commands::inspect::run(model, cells),
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` wins over `level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
