//! Sample generators: mutated clones of a parent cell.
//!
//! A generator never touches the parent. The clone inherits the parent's
//! class; only the attribute vector changes. Numeric values stay inside
//! the attribute's training range, nominal values stay valid category
//! codes, and missing values stay missing.

use airs_core::distance::{AttributeRange, AttributeRole, DistanceFunction};
use airs_core::prelude::Cell;
use rand::{Rng, RngCore};

/// Produces a mutated clone of `parent` for refinement against `target`.
pub trait SampleGenerator: Send + Sync {
    fn generate_sample(
        &self,
        parent: &Cell,
        target: &[f64],
        space: &DistanceFunction,
        rng: &mut dyn RngCore,
    ) -> Cell;
}

/// AIRS1 mutation: every attribute is perturbed by a fixed fraction of
/// its training range.
///
/// Numeric values move by up to `rate × range` in either direction.
/// Nominal values are replaced by a uniformly random category with
/// probability `rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRateMutation {
    pub rate: f64,
}

impl FixedRateMutation {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl SampleGenerator for FixedRateMutation {
    fn generate_sample(
        &self,
        parent: &Cell,
        _target: &[f64],
        space: &DistanceFunction,
        rng: &mut dyn RngCore,
    ) -> Cell {
        let attributes = mutate_vector(parent.attributes(), space, rng, self.rate, |range, value, rng| {
            let delta = rng.gen_range(-1.0f64..=1.0) * self.rate * range.width();
            range.clamp(value + delta)
        });
        parent.offspring(attributes)
    }
}

/// AIRS2 mutation: the better the parent is stimulated, the smaller the
/// change.
///
/// With `w = 1 - stimulation`, numeric values are redrawn uniformly from
/// a window of width `w × range` centred on the current value, and
/// nominal values are replaced with probability `w`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StimulationProportionalMutation;

impl SampleGenerator for StimulationProportionalMutation {
    fn generate_sample(
        &self,
        parent: &Cell,
        _target: &[f64],
        space: &DistanceFunction,
        rng: &mut dyn RngCore,
    ) -> Cell {
        let w = (1.0 - parent.stimulation).clamp(0.0, 1.0);
        let attributes = mutate_vector(parent.attributes(), space, rng, w, |range, value, rng| {
            let half = w * range.width() / 2.0;
            if half > 0.0 {
                range.clamp(value + rng.gen_range(-half..=half))
            } else {
                value
            }
        });
        parent.offspring(attributes)
    }
}

fn mutate_vector(
    parent: &[f64],
    space: &DistanceFunction,
    rng: &mut dyn RngCore,
    nominal_probability: f64,
    mut numeric: impl FnMut(&AttributeRange, f64, &mut dyn RngCore) -> f64,
) -> Vec<f64> {
    parent
        .iter()
        .zip(space.roles())
        .map(|(&value, role)| {
            if value.is_nan() {
                return value;
            }
            match role {
                AttributeRole::Numeric(range) => numeric(range, value, rng),
                AttributeRole::Nominal { categories } => {
                    if *categories > 0 && rng.gen::<f64>() < nominal_probability {
                        rng.gen_range(0..*categories) as f64
                    } else {
                        value
                    }
                }
                AttributeRole::Class | AttributeRole::Ignored => value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use airs_core::types::ClassId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn space() -> DistanceFunction {
        DistanceFunction::from_roles(vec![
            AttributeRole::Numeric(AttributeRange::new(0.0, 1.0)),
            AttributeRole::Nominal { categories: 4 },
            AttributeRole::Numeric(AttributeRange::new(2.0, 4.0)),
            AttributeRole::Class,
        ])
    }

    #[test]
    fn fixed_rate_stays_in_range_and_keeps_class() {
        let space = space();
        let parent = Cell::new(vec![0.95, 1.0, 2.1, 1.0], ClassId(1));
        let gen = FixedRateMutation::new(0.5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..200 {
            let child = gen.generate_sample(&parent, &[0.0, 0.0, 3.0, 1.0], &space, &mut rng);
            let v = child.attributes();
            assert!((0.0..=1.0).contains(&v[0]));
            assert!((2.0..=4.0).contains(&v[2]));
            assert!(v[1].fract() == 0.0 && (0.0..4.0).contains(&v[1]));
            assert_eq!(v[3], 1.0, "class slot copied");
            assert_eq!(child.class(), ClassId(1));
        }
        assert_eq!(parent.attributes(), &[0.95, 1.0, 2.1, 1.0], "parent untouched");
    }

    #[test]
    fn proportional_mutation_shrinks_with_stimulation() {
        let space = space();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut parent = Cell::new(vec![0.5, 2.0, 3.0, 0.0], ClassId(0));

        parent.stimulation = 0.9;
        for _ in 0..200 {
            let child = StimulationProportionalMutation.generate_sample(&parent, &[], &space, &mut rng);
            assert!((child.attributes()[0] - 0.5).abs() <= 0.05 + 1e-12);
            assert!((child.attributes()[2] - 3.0).abs() <= 0.1 + 1e-12);
        }

        parent.stimulation = 1.0;
        let exact = StimulationProportionalMutation.generate_sample(&parent, &[], &space, &mut rng);
        assert_eq!(exact.attributes(), parent.attributes());
    }

    #[test]
    fn missing_values_stay_missing() {
        let space = space();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let parent = Cell::new(vec![f64::NAN, f64::NAN, 3.0, 0.0], ClassId(0));
        let child = FixedRateMutation::new(1.0).generate_sample(&parent, &[], &space, &mut rng);
        assert!(child.attributes()[0].is_nan());
        assert!(child.attributes()[1].is_nan());
    }
}
