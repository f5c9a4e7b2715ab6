//! Holdout evaluation.

use airs::prelude::*;
use anyhow::{bail, Result};
use colored::Colorize;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

use super::train::train_model;
use crate::config::Config;
use crate::dataset::load_dataset;

pub fn run(data: &str, holdout: Option<f64>, class: Option<String>, seed: Option<u64>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(seed) = seed {
        config.training.seed = seed;
    }
    let holdout = holdout.unwrap_or(config.data.holdout);
    let class = class.or_else(|| config.data.class_column.clone());
    let dataset = load_dataset(Path::new(data), class.as_deref())?;

    let (train_set, test_set) = split(&dataset, holdout, config.training.seed)?;
    println!(
        "{} Training on {} rows, testing on {}...",
        "→".blue(),
        train_set.len(),
        test_set.len()
    );

    let model = train_model(&train_set, &config)?;
    let accuracy = model.accuracy(&test_set)?;

    println!();
    println!("{}", model.summary());
    println!();
    println!(
        "{} Holdout accuracy: {}",
        "✓".green().bold(),
        format!("{:.2}%", accuracy * 100.0).cyan().bold()
    );
    Ok(())
}

/// Shuffle with `seed` and hold out `fraction` of the rows, keeping at
/// least one row on each side.
pub(crate) fn split(dataset: &Dataset, fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(fraction > 0.0 && fraction < 1.0) {
        bail!("Holdout fraction must be between 0 and 1, got {fraction}");
    }
    if dataset.len() < 2 {
        bail!("Need at least 2 rows to evaluate, got {}", dataset.len());
    }

    let mut rows = dataset.instances().to_vec();
    rows.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let test = ((rows.len() as f64 * fraction).round() as usize).clamp(1, rows.len() - 1);
    let test_rows = rows.split_off(rows.len() - test);

    Ok((dataset.with_instances(rows), dataset.with_instances(test_rows)))
}
