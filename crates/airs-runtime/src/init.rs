//! Model initialisation: seeding pools from the training set.

use airs_core::prelude::*;
use rand::seq::index;
use rand::RngCore;

/// Sample `count` distinct training instances as cells.
///
/// `count` is capped at the dataset size.
pub fn sample_cells(dataset: &Dataset, count: usize, rng: &mut dyn RngCore) -> Vec<Cell> {
    let count = count.min(dataset.len());
    if count == 0 {
        return Vec::new();
    }
    index::sample(rng, dataset.len(), count)
        .into_iter()
        .map(|i| {
            let inst = &dataset.instances()[i];
            Cell::from_instance(inst, dataset.class_of(inst))
        })
        .collect()
}

/// The initial memory pool.
pub fn seed_memory_pool(dataset: &Dataset, size: usize, rng: &mut dyn RngCore) -> CellPool {
    sample_cells(dataset, size, rng).into()
}
