//! Splitting a training set across workers.

use airs_core::prelude::*;
use rand::seq::SliceRandom;
use rand::RngCore;

/// Shuffle `dataset` once and cut it into `parts` contiguous slices.
///
/// Every slice holds `len / parts` instances; the last one also takes the
/// remainder. Fails when `parts` is zero or exceeds the number of
/// instances, since every worker needs at least one antigen.
pub fn partition(dataset: &Dataset, parts: usize, rng: &mut dyn RngCore) -> Result<Vec<Dataset>> {
    let len = dataset.len();
    if parts == 0 || parts > len {
        return Err(AirsError::invalid_config(
            "threads",
            parts,
            format!("must be between 1 and the number of instances ({len})"),
        ));
    }

    let mut shuffled: Vec<Instance> = dataset.instances().to_vec();
    shuffled.shuffle(rng);

    let size = len / parts;
    let mut slices = Vec::with_capacity(parts);
    let mut rest = shuffled;
    for _ in 0..parts - 1 {
        let tail = rest.split_off(size);
        slices.push(dataset.with_instances(rest));
        rest = tail;
    }
    slices.push(dataset.with_instances(rest));
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn dataset(n: usize) -> Dataset {
        let schema = Schema::new(
            vec![Attribute::numeric("x"), Attribute::nominal("class", ["a", "b"])],
            1,
        )
        .unwrap();
        let rows = (0..n).map(|i| Instance::new(vec![i as f64, (i % 2) as f64])).collect();
        Dataset::new(schema, rows).unwrap()
    }

    #[test]
    fn last_slice_takes_remainder() {
        let data = dataset(11);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let parts = partition(&data, 3, &mut rng).unwrap();
        let sizes: Vec<usize> = parts.iter().map(Dataset::len).collect();
        assert_eq!(sizes, vec![3, 3, 5]);
    }

    #[test]
    fn slices_cover_every_instance_once() {
        let data = dataset(20);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let parts = partition(&data, 4, &mut rng).unwrap();
        let mut xs: Vec<usize> = parts
            .iter()
            .flat_map(|p| p.instances().iter().map(|i| i.values[0] as usize))
            .collect();
        xs.sort_unstable();
        assert_eq!(xs, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn too_many_parts_rejected() {
        let data = dataset(3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(partition(&data, 4, &mut rng), Err(AirsError::Config(_))));
        assert!(partition(&data, 0, &mut rng).is_err());
    }
}
