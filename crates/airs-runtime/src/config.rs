//! Training configuration.
//!
//! Every field has a serde default so a partial `[training]` table in a
//! config file fills in the rest.

use airs_core::error::{AirsError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which refinement policy the trainer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Fixed-rate mutation, per-class stop test.
    Airs1,
    /// Stimulation-proportional mutation, pooled stop test.
    #[default]
    Airs2,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Airs1 => "AIRS1",
            Variant::Airs2 => "AIRS2",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = AirsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "airs1" => Ok(Variant::Airs1),
            "airs2" => Ok(Variant::Airs2),
            other => Err(AirsError::invalid_config("variant", other, "expected airs1 or airs2")),
        }
    }
}

/// Tunable parameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirsConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Scales the affinity threshold into the memory-replacement cutoff.
    #[serde(default = "default_affinity_threshold_scalar")]
    pub affinity_threshold_scalar: f64,
    /// Clones per unit of stimulation, and resources per unit of stimulation.
    #[serde(default = "default_clonal_rate")]
    pub clonal_rate: f64,
    /// Extra clone multiplier when seeding the ARB pool.
    #[serde(default = "default_hypermutation_rate")]
    pub hypermutation_rate: f64,
    /// Fixed mutation rate (AIRS1 only).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Resources shared by all ARBs in one refinement round.
    #[serde(default = "default_total_resources")]
    pub total_resources: f64,
    /// Mean stimulation the ARB pool must reach to stop refining.
    #[serde(default = "default_stimulation_threshold")]
    pub stimulation_threshold: f64,
    /// Antigens sampled for the affinity threshold; 0 uses all of them.
    #[serde(default)]
    pub affinity_threshold_instances: usize,
    /// Training instances seeded into the memory pool.
    #[serde(default = "default_mem_initial_pool_size")]
    pub mem_initial_pool_size: usize,
    /// Training instances seeded into every ARB pool (AIRS1 only).
    #[serde(default = "default_arb_initial_pool_size")]
    pub arb_initial_pool_size: usize,
    /// Neighbours consulted at classification time.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Master seed for every random decision in a run.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Upper bound on ARB refinement rounds per antigen.
    #[serde(default = "default_max_refinement_rounds")]
    pub max_refinement_rounds: usize,
}

// Default value functions
fn default_affinity_threshold_scalar() -> f64 { 0.2 }
fn default_clonal_rate() -> f64 { 10.0 }
fn default_hypermutation_rate() -> f64 { 2.0 }
fn default_mutation_rate() -> f64 { 0.1 }
fn default_total_resources() -> f64 { 150.0 }
fn default_stimulation_threshold() -> f64 { 0.9 }
fn default_mem_initial_pool_size() -> usize { 1 }
fn default_arb_initial_pool_size() -> usize { 1 }
fn default_k() -> usize { 3 }
fn default_seed() -> u64 { 1 }
fn default_max_refinement_rounds() -> usize { 10_000 }

impl Default for AirsConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            affinity_threshold_scalar: default_affinity_threshold_scalar(),
            clonal_rate: default_clonal_rate(),
            hypermutation_rate: default_hypermutation_rate(),
            mutation_rate: default_mutation_rate(),
            total_resources: default_total_resources(),
            stimulation_threshold: default_stimulation_threshold(),
            affinity_threshold_instances: 0,
            mem_initial_pool_size: default_mem_initial_pool_size(),
            arb_initial_pool_size: default_arb_initial_pool_size(),
            k: default_k(),
            seed: default_seed(),
            max_refinement_rounds: default_max_refinement_rounds(),
        }
    }
}

/// Upper bound on the clones one cell may spawn in a single step: at
/// stimulation 1, `clonal_rate` per variation round and
/// `clonal_rate * hypermutation_rate` when seeding an ARB pool.
pub const MAX_CLONES_PER_CELL: f64 = 10_000.0;

impl AirsConfig {
    pub fn airs1() -> Self {
        Self {
            variant: Variant::Airs1,
            ..Self::default()
        }
    }

    pub fn airs2() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Reject parameter values the algorithm cannot run with.
    pub fn validate(&self) -> Result<()> {
        positive("affinity_threshold_scalar", self.affinity_threshold_scalar)?;
        positive("clonal_rate", self.clonal_rate)?;
        positive("hypermutation_rate", self.hypermutation_rate)?;
        positive("total_resources", self.total_resources)?;
        if self.clonal_rate > MAX_CLONES_PER_CELL {
            return Err(AirsError::out_of_range(
                "clonal_rate",
                0.0,
                MAX_CLONES_PER_CELL,
                self.clonal_rate,
            ));
        }
        if self.clonal_rate * self.hypermutation_rate > MAX_CLONES_PER_CELL {
            return Err(AirsError::out_of_range(
                "hypermutation_rate",
                0.0,
                MAX_CLONES_PER_CELL / self.clonal_rate,
                self.hypermutation_rate,
            ));
        }
        if self.variant == Variant::Airs1 {
            unit("mutation_rate", self.mutation_rate)?;
        }
        unit("stimulation_threshold", self.stimulation_threshold)?;
        if self.k == 0 {
            return Err(AirsError::invalid_config("k", self.k, "must be at least 1"));
        }
        if self.max_refinement_rounds == 0 {
            return Err(AirsError::invalid_config(
                "max_refinement_rounds",
                self.max_refinement_rounds,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// A copy with pool sizes clamped to the number of training instances.
    pub fn clamped_to(&self, num_instances: usize) -> Self {
        let mut config = self.clone();
        if config.mem_initial_pool_size > num_instances {
            warn!(
                requested = config.mem_initial_pool_size,
                available = num_instances,
                "clamping initial memory pool size"
            );
            config.mem_initial_pool_size = num_instances;
        }
        if config.arb_initial_pool_size > num_instances {
            warn!(
                requested = config.arb_initial_pool_size,
                available = num_instances,
                "clamping initial ARB pool size"
            );
            config.arb_initial_pool_size = num_instances;
        }
        if config.affinity_threshold_instances > num_instances {
            config.affinity_threshold_instances = num_instances;
        }
        config
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AirsError::invalid_config(field, value, "must be a positive number"))
    }
}

fn unit(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AirsError::out_of_range(field, 0.0, 1.0, value))
    }
}
