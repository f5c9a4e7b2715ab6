//! AIRS2-Parallel: fork-join training over disjoint partitions.
//!
//! The affinity threshold and the distance function are computed once on
//! the full training set and shared read-only by every worker. Each
//! worker owns its partition, its pools and its own generator, so nothing
//! mutable crosses a thread boundary.

use crate::merge::{MergeMode, MergeOutcome};
use crate::partition::partition;
use airs_core::prelude::*;
use airs_runtime::config::{AirsConfig, Variant};
use airs_runtime::model::Model;
use airs_runtime::policy::Airs2;
use airs_runtime::stats::TrainingStats;
use airs_runtime::threshold::affinity_threshold;
use airs_runtime::trainer::{Trainer, TrainingRun};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::thread;
use tracing::{debug, info, instrument, warn};

/// Settings specific to parallel training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Worker threads, one partition each.
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub merge: MergeMode,
}

fn default_threads() -> usize { 2 }

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            merge: MergeMode::default(),
        }
    }
}

impl ParallelConfig {
    pub fn new(threads: usize, merge: MergeMode) -> Self {
        Self { threads, merge }
    }

    /// At least two workers, and no more workers than instances.
    pub fn validate(&self, num_instances: usize) -> Result<()> {
        if self.threads < 2 {
            return Err(AirsError::invalid_config(
                "threads",
                self.threads,
                "parallel training needs at least 2 threads",
            ));
        }
        if self.threads > num_instances {
            return Err(AirsError::invalid_config(
                "threads",
                self.threads,
                format!("more threads than training instances ({num_instances})"),
            ));
        }
        Ok(())
    }
}

/// Everything a parallel run produced.
#[derive(Debug, Clone)]
pub struct ParallelRun {
    pub memory: CellPool,
    pub space: DistanceFunction,
    /// Statistics of all partitions combined.
    pub stats: TrainingStats,
    pub affinity_threshold: f64,
    /// Memory pool size of each partition before merging.
    pub partition_sizes: Vec<usize>,
    /// Cells dropped by the merge.
    pub pruned: usize,
}

pub struct ParallelTrainer {
    config: AirsConfig,
    parallel: ParallelConfig,
}

impl ParallelTrainer {
    pub fn new(config: AirsConfig, parallel: ParallelConfig) -> Self {
        Self { config, parallel }
    }

    pub fn config(&self) -> &AirsConfig {
        &self.config
    }

    pub fn parallel(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Train on an already normalised dataset.
    ///
    /// # Errors
    ///
    /// - configuration errors before any worker starts
    /// - `WorkerFailed` if any worker returns an error or panics; the
    ///   other workers' results are discarded
    pub fn train(&self, dataset: &Dataset) -> Result<ParallelRun> {
        self.config.validate()?;
        self.parallel.validate(dataset.len())?;

        let space = DistanceFunction::new(dataset)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let threshold = affinity_threshold(
            dataset,
            &space,
            self.config.affinity_threshold_instances,
            &mut rng,
        );
        let partitions = partition(dataset, self.parallel.threads, &mut rng)?;

        info!(
            threads = partitions.len(),
            instances = dataset.len(),
            affinity_threshold = threshold,
            merge = self.parallel.merge.name(),
            "parallel training started"
        );

        let runs = self.run_workers(&partitions, &space, threshold)?;

        let mut stats = TrainingStats::default();
        let mut partition_sizes = Vec::with_capacity(runs.len());
        let mut pools = Vec::with_capacity(runs.len());
        for run in runs {
            stats.merge(&run.stats);
            partition_sizes.push(run.memory.len());
            pools.push(run.memory);
        }

        let MergeOutcome {
            pool,
            concatenated,
            pruned,
        } = self.parallel.merge.merger().merge(pools, dataset, &space);
        stats.memory_cells = pool.len();

        info!(
            concatenated,
            pruned,
            memory_cells = pool.len(),
            "parallel training finished"
        );

        Ok(ParallelRun {
            memory: pool,
            space,
            stats,
            affinity_threshold: threshold,
            partition_sizes,
            pruned,
        })
    }

    /// Fork one AIRS2 trainer per partition and join them all.
    fn run_workers(
        &self,
        partitions: &[Dataset],
        space: &DistanceFunction,
        threshold: f64,
    ) -> Result<Vec<TrainingRun>> {
        let config = &self.config;
        thread::scope(|scope| -> Result<Vec<TrainingRun>> {
            let mut handles = Vec::with_capacity(partitions.len());
            for (index, part) in partitions.iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("airs-worker-{index}"))
                    .spawn_scoped(scope, move || {
                        let mut rng = worker_rng(config.seed, index);
                        let trainer = Trainer::new(config.clone(), Airs2::new());
                        let run = trainer.train_with(part, space, threshold, &mut rng);
                        debug!(partition = index, antigens = part.len(), ok = run.is_ok(), "worker finished");
                        run
                    })
                    .map_err(|e| AirsError::WorkerFailed {
                        partition: index,
                        reason: e.to_string(),
                    })?;
                handles.push(handle);
            }

            handles
                .into_iter()
                .enumerate()
                .map(|(index, handle)| match handle.join() {
                    Ok(Ok(run)) => Ok(run),
                    Ok(Err(e)) => Err(AirsError::WorkerFailed {
                        partition: index,
                        reason: e.to_string(),
                    }),
                    Err(payload) => Err(AirsError::WorkerFailed {
                        partition: index,
                        reason: panic_message(payload.as_ref()),
                    }),
                })
                .collect()
        })
    }
}

/// A generator for one worker: the master seed on a stream of its own.
///
/// Stream 0 belongs to the coordinating thread.
pub fn worker_rng(seed: u64, partition: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(partition as u64 + 1);
    rng
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Train an AIRS2-Parallel model on a raw (unnormalised) dataset.
#[instrument(skip_all, fields(threads = parallel.threads, instances = raw.len()))]
pub fn train_parallel(raw: &Dataset, config: &AirsConfig, parallel: &ParallelConfig) -> Result<Model> {
    if config.variant == Variant::Airs1 {
        warn!("parallel training always runs AIRS2; ignoring variant = airs1");
    }
    let config = AirsConfig {
        variant: Variant::Airs2,
        ..config.clone()
    };
    config.validate()?;
    parallel.validate(raw.len())?;

    let normalizer = Normalizer::fit(raw);
    let dataset = normalizer.transform(raw)?;
    let run = ParallelTrainer::new(config.clone(), parallel.clone()).train(&dataset)?;

    Ok(Model::new(
        raw.schema().clone(),
        normalizer,
        run.space,
        run.memory,
        config.k,
        "AIRS2-Parallel",
        run.stats,
    ))
}
