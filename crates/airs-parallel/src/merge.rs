//! Merging the memory pools of parallel workers.

use airs_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How partition memory pools become one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Union of all partition pools.
    #[default]
    Concatenate,
    /// Union, then drop every cell that is nobody's nearest neighbour.
    Prune,
}

impl MergeMode {
    pub fn name(&self) -> &'static str {
        match self {
            MergeMode::Concatenate => "concatenate",
            MergeMode::Prune => "prune",
        }
    }

    pub fn merger(&self) -> Box<dyn MemoryCellMerger> {
        match self {
            MergeMode::Concatenate => Box::new(Concatenate),
            MergeMode::Prune => Box::new(ConcatenateThenPrune),
        }
    }
}

impl std::str::FromStr for MergeMode {
    type Err = AirsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "concatenate" | "concat" => Ok(MergeMode::Concatenate),
            "prune" => Ok(MergeMode::Prune),
            other => Err(AirsError::invalid_config("merge", other, "expected concatenate or prune")),
        }
    }
}

/// Result of a merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub pool: CellPool,
    /// Cells in the plain union.
    pub concatenated: usize,
    /// Cells dropped after the union.
    pub pruned: usize,
}

pub trait MemoryCellMerger: Send + Sync {
    /// Merge partition pools. `training` is the full normalised training
    /// set and `space` the distance function it was trained with.
    fn merge(&self, pools: Vec<CellPool>, training: &Dataset, space: &DistanceFunction) -> MergeOutcome;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Concatenate;

impl MemoryCellMerger for Concatenate {
    fn merge(&self, pools: Vec<CellPool>, _training: &Dataset, _space: &DistanceFunction) -> MergeOutcome {
        let pool: CellPool = pools.into_iter().flatten().collect();
        MergeOutcome {
            concatenated: pool.len(),
            pool,
            pruned: 0,
        }
    }
}

/// Concatenate, then keep only cells that are the nearest memory cell
/// (of any class) to at least one training antigen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenateThenPrune;

impl MemoryCellMerger for ConcatenateThenPrune {
    fn merge(&self, pools: Vec<CellPool>, training: &Dataset, space: &DistanceFunction) -> MergeOutcome {
        let mut pool: CellPool = pools.into_iter().flatten().collect();
        let concatenated = pool.len();
        for cell in pool.iter_mut() {
            cell.reset();
        }

        for antigen in training.instances() {
            if let Some(index) = nearest(&pool, space, &antigen.values) {
                if let Some(cell) = pool.get_mut(index) {
                    cell.usage += 1;
                }
            }
        }
        pool.retain(|cell| cell.usage > 0);

        MergeOutcome {
            pruned: concatenated - pool.len(),
            concatenated,
            pool,
        }
    }
}

/// Index of the cell with the lowest affinity to `antigen`; the earliest
/// wins ties.
fn nearest(pool: &CellPool, space: &DistanceFunction, antigen: &[f64]) -> Option<usize> {
    pool.iter()
        .map(|cell| space.affinity(cell.attributes(), antigen))
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, a)| match best {
            Some((_, b)) if b.partial_cmp(&a) != Some(Ordering::Greater) => best,
            _ => Some((i, a)),
        })
        .map(|(i, _)| i)
}
