//! Convenience re-exports.

pub use crate::config::{AirsConfig, Variant};
pub use crate::init::{sample_cells, seed_memory_pool};
pub use crate::model::Model;
pub use crate::mutation::{FixedRateMutation, SampleGenerator, StimulationProportionalMutation};
pub use crate::policy::{Airs1, Airs2, RefinementPolicy};
pub use crate::stats::{AntigenOutcome, Refinement, TrainingStats};
pub use crate::threshold::affinity_threshold;
pub use crate::trainer::{MemoryUpdate, Trainer, TrainingRun};
pub use crate::train;
