//! Convenience re-exports.

pub use crate::merge::{Concatenate, ConcatenateThenPrune, MemoryCellMerger, MergeMode, MergeOutcome};
pub use crate::parallel::{train_parallel, worker_rng, ParallelConfig, ParallelRun, ParallelTrainer};
pub use crate::partition::partition;
