//! Refinement policies: what distinguishes AIRS1 from AIRS2.
//!
//! Both variants run the same trainer. A policy supplies the mutation
//! used for every clone, the stop test of the ARB refinement loop, and
//! whether sampled background ARBs join each fresh ARB pool.

use crate::config::{AirsConfig, Variant};
use crate::mutation::{FixedRateMutation, SampleGenerator, StimulationProportionalMutation};
use airs_core::distance::DistanceFunction;
use airs_core::error::{AirsError, Result};
use airs_core::prelude::{Cell, CellPool};
use rand::RngCore;

pub trait RefinementPolicy: Send + Sync {
    fn variant(&self) -> Variant;

    /// A mutated clone of `parent`.
    fn generate_sample(
        &self,
        parent: &Cell,
        target: &[f64],
        space: &DistanceFunction,
        rng: &mut dyn RngCore,
    ) -> Cell;

    /// Whether the ARB pool is refined enough to stop.
    ///
    /// A NaN mean is an error, never a "keep going".
    fn should_stop(&self, arbs: &CellPool, threshold: f64) -> Result<bool>;

    /// Whether background ARBs sampled at initialisation join every ARB pool.
    fn uses_arb_seeds(&self) -> bool {
        false
    }
}

/// AIRS1: fixed-rate mutation; every class in the ARB pool must reach the
/// stimulation threshold on its own.
#[derive(Debug, Clone)]
pub struct Airs1 {
    mutation: FixedRateMutation,
}

impl Airs1 {
    pub fn new(mutation_rate: f64) -> Self {
        Self {
            mutation: FixedRateMutation::new(mutation_rate),
        }
    }

    pub fn from_config(config: &AirsConfig) -> Self {
        Self::new(config.mutation_rate)
    }
}

impl RefinementPolicy for Airs1 {
    fn variant(&self) -> Variant {
        Variant::Airs1
    }

    fn generate_sample(
        &self,
        parent: &Cell,
        target: &[f64],
        space: &DistanceFunction,
        rng: &mut dyn RngCore,
    ) -> Cell {
        self.mutation.generate_sample(parent, target, space, rng)
    }

    fn should_stop(&self, arbs: &CellPool, threshold: f64) -> Result<bool> {
        if arbs.is_empty() {
            return Err(AirsError::NanMeanStimulation {
                scope: "empty ARB pool".into(),
            });
        }
        for class in arbs.classes() {
            let mean = arbs.mean_stimulation_of(class).unwrap_or(f64::NAN);
            if mean.is_nan() {
                return Err(AirsError::NanMeanStimulation {
                    scope: class.to_string(),
                });
            }
            if mean < threshold {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn uses_arb_seeds(&self) -> bool {
        true
    }
}

/// AIRS2: stimulation-proportional mutation; the pooled mean stimulation
/// of all ARBs must reach the threshold.
#[derive(Debug, Clone, Default)]
pub struct Airs2 {
    mutation: StimulationProportionalMutation,
}

impl Airs2 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefinementPolicy for Airs2 {
    fn variant(&self) -> Variant {
        Variant::Airs2
    }

    fn generate_sample(
        &self,
        parent: &Cell,
        target: &[f64],
        space: &DistanceFunction,
        rng: &mut dyn RngCore,
    ) -> Cell {
        self.mutation.generate_sample(parent, target, space, rng)
    }

    fn should_stop(&self, arbs: &CellPool, threshold: f64) -> Result<bool> {
        match arbs.mean_stimulation() {
            Some(mean) if !mean.is_nan() => Ok(mean >= threshold),
            _ => Err(AirsError::NanMeanStimulation {
                scope: "pooled ARB stimulation".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airs_core::types::ClassId;

    fn pool(cells: &[(usize, f64)]) -> CellPool {
        cells
            .iter()
            .map(|&(class, s)| {
                let mut c = Cell::new(vec![0.0, class as f64], ClassId(class));
                c.stimulation = s;
                c
            })
            .collect()
    }

    #[test]
    fn airs2_uses_pooled_mean() {
        let arbs = pool(&[(0, 1.0), (0, 0.9), (1, 0.8)]);
        assert!(Airs2::new().should_stop(&arbs, 0.9).unwrap());
        assert!(!Airs2::new().should_stop(&arbs, 0.95).unwrap());
    }

    #[test]
    fn airs1_needs_every_class() {
        // Pooled mean is 0.9, but class 1 alone is 0.8.
        let arbs = pool(&[(0, 1.0), (0, 0.9), (1, 0.8)]);
        assert!(!Airs1::new(0.1).should_stop(&arbs, 0.9).unwrap());
        assert!(Airs1::new(0.1).should_stop(&arbs, 0.8).unwrap());
    }

    #[test]
    fn nan_mean_is_fatal() {
        let arbs = pool(&[(0, f64::NAN), (0, 0.5)]);
        assert!(matches!(
            Airs2::new().should_stop(&arbs, 0.9),
            Err(AirsError::NanMeanStimulation { .. })
        ));
        assert!(Airs1::new(0.1).should_stop(&arbs, 0.9).is_err());
        assert!(Airs2::new().should_stop(&CellPool::new(), 0.9).is_err());
    }
}
