//! A trained AIRS model: memory cells plus k-nearest-neighbour voting.

use crate::stats::TrainingStats;
use crate::trainer::TrainingRun;
use airs_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    schema: Schema,
    normalizer: Normalizer,
    space: DistanceFunction,
    memory: CellPool,
    k: usize,
    variant: String,
    stats: TrainingStats,
}

impl Model {
    pub fn new(
        schema: Schema,
        normalizer: Normalizer,
        space: DistanceFunction,
        memory: CellPool,
        k: usize,
        variant: impl Into<String>,
        stats: TrainingStats,
    ) -> Self {
        Self {
            schema,
            normalizer,
            space,
            memory,
            k,
            variant: variant.into(),
            stats,
        }
    }

    /// Wrap a finished training run.
    pub fn from_run(
        schema: Schema,
        normalizer: Normalizer,
        run: TrainingRun,
        k: usize,
        variant: impl Into<String>,
    ) -> Self {
        let mut stats = run.stats;
        stats.memory_cells = run.memory.len();
        Self::new(schema, normalizer, run.space, run.memory, k, variant, stats)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn memory(&self) -> &CellPool {
        &self.memory
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// The configured k.
    pub fn k(&self) -> usize {
        self.k
    }

    /// The k actually used: never more than the number of memory cells.
    pub fn effective_k(&self) -> usize {
        self.k.min(self.memory.len())
    }

    /// Classify a raw (unnormalised) vector laid out like the schema.
    ///
    /// The class slot is ignored and may hold anything, NaN included.
    pub fn classify(&self, values: &[f64]) -> Result<ClassId> {
        let mut query = values.to_vec();
        self.normalizer.apply_in_place(&mut query)?;
        self.classify_normalized(&query)
    }

    /// Classify a vector that is already normalised.
    ///
    /// Majority vote among the `effective_k` memory cells of lowest
    /// affinity. Ties in affinity keep memory-pool order; ties in votes go
    /// to the lowest class id.
    pub fn classify_normalized(&self, query: &[f64]) -> Result<ClassId> {
        if self.memory.is_empty() {
            return Err(AirsError::EmptyModel);
        }
        if query.len() != self.space.dimension() {
            return Err(AirsError::DimensionMismatch {
                expected: self.space.dimension(),
                got: query.len(),
            });
        }

        let mut neighbours: Vec<(f64, ClassId)> = self
            .memory
            .iter()
            .map(|cell| (self.space.affinity(cell.attributes(), query), cell.class()))
            .collect();
        neighbours.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut votes: BTreeMap<ClassId, usize> = BTreeMap::new();
        for (_, class) in neighbours.iter().take(self.effective_k()) {
            *votes.entry(*class).or_default() += 1;
        }

        let mut winner: Option<(ClassId, usize)> = None;
        for (class, count) in votes {
            if winner.map_or(true, |(_, best)| count > best) {
                winner = Some((class, count));
            }
        }
        winner.map(|(class, _)| class).ok_or(AirsError::EmptyModel)
    }

    /// Classify and return the class label.
    pub fn classify_label(&self, values: &[f64]) -> Result<&str> {
        let class = self.classify(values)?;
        Ok(self
            .schema
            .class_label(class)
            .unwrap_or("<unknown>"))
    }

    /// Fraction of `dataset` (raw, unnormalised) classified correctly.
    pub fn accuracy(&self, dataset: &Dataset) -> Result<f64> {
        if dataset.is_empty() {
            return Err(AirsError::EmptyDataset);
        }
        let mut correct = 0usize;
        for instance in dataset.instances() {
            if self.classify(&instance.values)? == dataset.class_of(instance) {
                correct += 1;
            }
        }
        Ok(correct as f64 / dataset.len() as f64)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Human-readable training summary.
    pub fn summary(&self) -> String {
        let mut per_class = vec![0usize; self.schema.num_classes()];
        for cell in &self.memory {
            if let Some(n) = per_class.get_mut(cell.class().index()) {
                *n += 1;
            }
        }
        let breakdown: Vec<String> = per_class
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let label = self.schema.class_label(ClassId(i)).unwrap_or("?");
                format!("{label}={n}")
            })
            .collect();

        format!(
            "{} model, k = {} (effective {})\nMemory cells per class: {}\n{}",
            self.variant,
            self.k,
            self.effective_k(),
            breakdown.join(", "),
            self.stats
        )
    }
}
