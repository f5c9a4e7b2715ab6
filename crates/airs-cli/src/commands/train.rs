//! Train a model on a CSV file.

use airs::prelude::*;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::dataset::load_dataset;

/// Command-line overrides for `airs train`.
pub struct TrainArgs {
    pub data: String,
    pub output: Option<String>,
    pub class: Option<String>,
    pub variant: Option<String>,
    pub seed: Option<u64>,
    pub k: Option<usize>,
    pub threads: Option<usize>,
    pub merge: Option<String>,
}

pub fn run(args: TrainArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(variant) = &args.variant {
        config.training.variant = variant.parse()?;
    }
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    if let Some(k) = args.k {
        config.training.k = k;
    }
    if let Some(threads) = args.threads {
        config.parallel.enabled = true;
        config.parallel.settings.threads = threads;
    }
    if let Some(merge) = &args.merge {
        config.parallel.settings.merge = merge.parse()?;
    }

    let class = args.class.or_else(|| config.data.class_column.clone());
    let dataset = load_dataset(Path::new(&args.data), class.as_deref())?;

    println!(
        "{} Training on {} ({} instances, {} attributes, {} classes)...",
        "→".blue(),
        args.data,
        dataset.len(),
        dataset.schema().len() - 1,
        dataset.num_classes()
    );

    let start = Instant::now();
    let model = train_model(&dataset, &config)?;
    let elapsed = start.elapsed();

    let output = super::model_path(args.output, &config);
    model
        .save(&output)
        .with_context(|| format!("Failed to write model {}", output.display()))?;

    println!();
    println!("{}", model.summary());
    println!();
    println!(
        "{} Saved {} memory cells to {} in {:.2?}",
        "✓".green().bold(),
        model.memory().len().to_string().cyan(),
        output.display(),
        elapsed
    );

    Ok(())
}

/// Train sequentially or in parallel, as configured.
pub(crate) fn train_model(dataset: &Dataset, config: &Config) -> Result<Model> {
    if config.parallel.enabled {
        train_parallel(dataset, &config.training, &config.parallel.settings)
            .context("Parallel training failed")
    } else {
        train(dataset, &config.training).context("Training failed")
    }
}
