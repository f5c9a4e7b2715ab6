//! Affinity threshold: the mean pairwise affinity of the training set.
//!
//! Computed once per run. The parallel trainer computes it over the
//! whole training set and hands the value to every worker.

use airs_core::prelude::*;
use rand::seq::index;
use rand::RngCore;

/// Mean normalised affinity over all pairs `i < j` of the sampled antigens.
///
/// `sample_size == 0` (or anything at least the dataset size) uses every
/// instance. Fewer than two antigens give 0.0.
pub fn affinity_threshold(
    dataset: &Dataset,
    space: &DistanceFunction,
    sample_size: usize,
    rng: &mut dyn RngCore,
) -> f64 {
    let n = dataset.len();
    let instances = dataset.instances();
    let picked: Vec<&Instance> = if sample_size == 0 || sample_size >= n {
        instances.iter().collect()
    } else {
        index::sample(rng, n, sample_size)
            .into_iter()
            .map(|i| &instances[i])
            .collect()
    };

    if picked.len() < 2 {
        return 0.0;
    }

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for (i, a) in picked.iter().enumerate() {
        for b in &picked[i + 1..] {
            sum += space.affinity(&a.values, &b.values);
            pairs += 1;
        }
    }
    sum / pairs as f64
}
