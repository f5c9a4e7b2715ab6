//! The sequential AIRS trainer.
//!
//! One pass over the training set. For every antigen:
//!
//! 1. match it against the memory pool (no match of its class: the
//!    antigen becomes a memory cell; exact duplicate: skip);
//! 2. seed a fresh ARB pool from the best match and hypermutate it;
//! 3. refine the ARB pool by resource competition until the policy's
//!    stop test passes;
//! 4. offer the best ARB of the antigen's class to the memory pool.
//!
//! The ARB pool lives for one antigen only. Diagnostics are returned as a
//! [`TrainingStats`] value.

use crate::config::AirsConfig;
use crate::init::{sample_cells, seed_memory_pool};
use crate::policy::RefinementPolicy;
use crate::stats::{AntigenOutcome, Refinement, TrainingStats};
use crate::threshold::affinity_threshold;
use airs_core::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// The result of one training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub memory: CellPool,
    /// The distance function the run was trained with.
    pub space: DistanceFunction,
    pub stats: TrainingStats,
    pub affinity_threshold: f64,
}

/// What the memory update did with a refined candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUpdate {
    /// The candidate was no better than the best match.
    Rejected,
    /// The candidate joined the memory pool.
    Added,
    /// The candidate joined and the best match was removed.
    Replaced,
}

pub struct Trainer<P> {
    config: AirsConfig,
    policy: P,
}

/// Read-only state shared by every antigen of a run.
struct Episode<'a> {
    config: &'a AirsConfig,
    space: &'a DistanceFunction,
    num_classes: usize,
    arb_seeds: &'a [Cell],
    replace_cutoff: f64,
}

impl<P: RefinementPolicy> Trainer<P> {
    pub fn new(config: AirsConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &AirsConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Train on an already normalised dataset.
    ///
    /// Builds the distance function and the affinity threshold from
    /// `dataset`, seeding the generator from the configured seed.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingRun> {
        let space = DistanceFunction::new(dataset)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let threshold = affinity_threshold(
            dataset,
            &space,
            self.config.affinity_threshold_instances,
            &mut rng,
        );
        self.train_with(dataset, &space, threshold, &mut rng)
    }

    /// Train with a precomputed distance function and affinity threshold.
    ///
    /// Parallel workers use this so every partition shares the values
    /// computed over the full training set.
    pub fn train_with(
        &self,
        dataset: &Dataset,
        space: &DistanceFunction,
        affinity_threshold: f64,
        rng: &mut dyn RngCore,
    ) -> Result<TrainingRun> {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(AirsError::EmptyDataset);
        }
        let config = self.config.clamped_to(dataset.len());

        let mut memory = seed_memory_pool(dataset, config.mem_initial_pool_size, rng);
        let arb_seeds = if self.policy.uses_arb_seeds() {
            sample_cells(dataset, config.arb_initial_pool_size, rng)
        } else {
            Vec::new()
        };

        let episode = Episode {
            config: &config,
            space,
            num_classes: dataset.num_classes(),
            arb_seeds: &arb_seeds,
            replace_cutoff: affinity_threshold * config.affinity_threshold_scalar,
        };

        info!(
            variant = self.policy.variant().name(),
            antigens = dataset.len(),
            affinity_threshold,
            "training started"
        );

        let mut stats = TrainingStats::default();
        for (index, antigen) in dataset.instances().iter().enumerate() {
            let class = dataset.class_of(antigen);
            let outcome = self.present(&episode, &mut memory, &antigen.values, class, rng)?;
            debug!(index, %class, ?outcome, memory = memory.len(), "antigen presented");
            stats.record(outcome);
        }
        stats.memory_cells = memory.len();

        info!(
            memory_cells = memory.len(),
            refined = stats.refined,
            unconverged = stats.unconverged,
            "training finished"
        );

        Ok(TrainingRun {
            memory,
            space: space.clone(),
            stats,
            affinity_threshold,
        })
    }

    fn present(
        &self,
        episode: &Episode<'_>,
        memory: &mut CellPool,
        antigen: &[f64],
        class: ClassId,
        rng: &mut dyn RngCore,
    ) -> Result<AntigenOutcome> {
        memory.stimulate(episode.space, antigen);
        memory.order_by_stimulation();

        let Some(best_index) = memory.position_of_class(class) else {
            memory.add(Cell::new(antigen.to_vec(), class));
            return Ok(AntigenOutcome::NoMatch);
        };
        let best = memory.cells()[best_index].clone();
        if best.stimulation == 1.0 {
            return Ok(AntigenOutcome::TrivialMatch);
        }

        let mut refinement = Refinement::default();
        let mut arbs = self.seed_arbs(episode, &best, antigen, rng, &mut refinement);
        let candidate = self.refine(episode, &mut arbs, antigen, class, rng, &mut refinement)?;

        match update_memory(
            memory,
            best_index,
            best.stimulation,
            candidate,
            antigen,
            episode.space,
            episode.replace_cutoff,
        ) {
            MemoryUpdate::Rejected => {}
            MemoryUpdate::Added => refinement.candidate_added = true,
            MemoryUpdate::Replaced => {
                refinement.candidate_added = true;
                refinement.replaced = true;
            }
        }
        Ok(AntigenOutcome::Refined(refinement))
    }

    fn seed_arbs(
        &self,
        episode: &Episode<'_>,
        best: &Cell,
        antigen: &[f64],
        rng: &mut dyn RngCore,
        refinement: &mut Refinement,
    ) -> CellPool {
        let config = episode.config;
        let clones =
            clone_count(best.stimulation * config.clonal_rate * config.hypermutation_rate);

        let mut arbs =
            CellPool::with_capacity(clones.saturating_add(1 + episode.arb_seeds.len()));
        arbs.add(best.clone());
        if self.policy.uses_arb_seeds() {
            arbs.add_all(episode.arb_seeds.iter().cloned());
        }
        for _ in 0..clones {
            arbs.add(self.policy.generate_sample(best, antigen, episode.space, rng));
        }
        refinement.clones += clones;
        arbs
    }

    /// Run refinement rounds until the stop test passes, returning the
    /// final candidate.
    fn refine(
        &self,
        episode: &Episode<'_>,
        arbs: &mut CellPool,
        antigen: &[f64],
        class: ClassId,
        rng: &mut dyn RngCore,
        refinement: &mut Refinement,
    ) -> Result<Cell> {
        let config = episode.config;
        loop {
            refinement.rounds += 1;

            arbs.stimulate(episode.space, antigen);
            arbs.normalize_stimulation()?;
            allocate_resources(arbs, class, config.clonal_rate);
            refinement.pruned +=
                compete_for_resources(arbs, class, episode.num_classes, config.total_resources);
            refinement.resources = arbs.iter().map(|c| c.resources).sum();

            let candidate = best_of_class(arbs, class)
                .cloned()
                .ok_or(AirsError::NoCandidate(class))?;

            if self.policy.should_stop(arbs, config.stimulation_threshold)? {
                return Ok(candidate);
            }
            if refinement.rounds >= config.max_refinement_rounds {
                warn!(
                    rounds = refinement.rounds,
                    arbs = arbs.len(),
                    "ARB refinement did not converge; keeping current candidate"
                );
                refinement.unconverged = true;
                return Ok(candidate);
            }

            refinement.clones += self.vary(episode, arbs, antigen, rng);
        }
    }

    /// Every ARB spawns `round(stimulation * clonal_rate)` mutated clones.
    /// Returns the number of clones added.
    fn vary(
        &self,
        episode: &Episode<'_>,
        arbs: &mut CellPool,
        antigen: &[f64],
        rng: &mut dyn RngCore,
    ) -> usize {
        let mut offspring = Vec::new();
        for arb in arbs.iter() {
            for _ in 0..clone_count(arb.stimulation * episode.config.clonal_rate) {
                offspring.push(self.policy.generate_sample(arb, antigen, episode.space, rng));
            }
        }
        let added = offspring.len();
        arbs.add_all(offspring);
        added
    }
}

fn clone_count(x: f64) -> usize {
    // Negative or NaN products saturate to zero.
    x.round() as usize
}

/// Set every ARB's resources from its normalised stimulation.
///
/// ARBs of a class other than the antigen's are rewarded for being
/// dissimilar: their stored stimulation is inverted first.
pub fn allocate_resources(arbs: &mut CellPool, antigen_class: ClassId, clonal_rate: f64) {
    for arb in arbs.iter_mut() {
        if arb.class() != antigen_class {
            arb.stimulation = 1.0 - arb.stimulation;
        }
        arb.resources = arb.stimulation * clonal_rate;
    }
}

/// Resources one class may hold.
pub fn class_cap(is_antigen_class: bool, num_classes: usize, total_resources: f64) -> f64 {
    if is_antigen_class {
        total_resources / 2.0
    } else {
        total_resources / (2.0 * num_classes.saturating_sub(1).max(1) as f64)
    }
}

/// Bring every class under its resource cap, removing the lowest-resourced
/// ARBs first. Returns the number of ARBs removed.
///
/// An ARB holding no more than the remaining excess is deleted; otherwise
/// it is shaved by exactly the excess and competition for that class ends.
/// Leaves the pool ordered by resources, highest first.
pub fn compete_for_resources(
    arbs: &mut CellPool,
    antigen_class: ClassId,
    num_classes: usize,
    total_resources: f64,
) -> usize {
    arbs.order_by_resources();
    let mut removed = 0;
    for class in arbs.classes() {
        let cap = class_cap(class == antigen_class, num_classes, total_resources);
        let mut excess = arbs.resources_of(class) - cap;
        while excess > 0.0 {
            let Some(weakest) = arbs.cells().iter().rposition(|c| c.class() == class) else {
                break;
            };
            let held = arbs.cells()[weakest].resources;
            if held <= excess {
                arbs.delete(weakest);
                excess -= held;
                removed += 1;
            } else {
                if let Some(arb) = arbs.get_mut(weakest) {
                    arb.resources -= excess;
                }
                excess = 0.0;
            }
        }
    }
    removed
}

/// The highest-resourced ARB of `class`; the earliest wins ties.
fn best_of_class(arbs: &CellPool, class: ClassId) -> Option<&Cell> {
    arbs.iter()
        .filter(|c| c.class() == class)
        .fold(None, |best: Option<&Cell>, c| match best {
            Some(b) if b.resources >= c.resources => Some(b),
            _ => Some(c),
        })
}

/// Offer a refined candidate to the memory pool.
///
/// The candidate is re-scored against the antigen. It is added only when
/// strictly more stimulated than the best match was; if it also lies
/// within `replace_cutoff` affinity of the best match, the best match is
/// removed.
pub fn update_memory(
    memory: &mut CellPool,
    best_index: usize,
    best_stimulation: f64,
    mut candidate: Cell,
    antigen: &[f64],
    space: &DistanceFunction,
    replace_cutoff: f64,
) -> MemoryUpdate {
    let stimulation = candidate.stimulate(space, antigen);
    if stimulation <= best_stimulation {
        return MemoryUpdate::Rejected;
    }

    let redundant = memory
        .get(best_index)
        .map(|best| space.affinity(candidate.attributes(), best.attributes()) < replace_cutoff)
        .unwrap_or(false);
    // Appending keeps `best_index` valid for the delete below.
    memory.add(candidate);
    if redundant {
        memory.delete(best_index);
        MemoryUpdate::Replaced
    } else {
        MemoryUpdate::Added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Airs1, Airs2};
    use airs_core::distance::{AttributeRange, AttributeRole};

    fn arb(class: usize, stimulation: f64) -> Cell {
        let mut c = Cell::new(vec![stimulation, class as f64], ClassId(class));
        c.stimulation = stimulation;
        c
    }

    fn space() -> DistanceFunction {
        DistanceFunction::from_roles(vec![
            AttributeRole::Numeric(AttributeRange::new(0.0, 1.0)),
            AttributeRole::Numeric(AttributeRange::new(0.0, 1.0)),
            AttributeRole::Class,
        ])
    }

    #[test]
    fn other_classes_are_inverted() {
        let mut arbs: CellPool = vec![arb(0, 0.8), arb(1, 0.8)].into_iter().collect();
        allocate_resources(&mut arbs, ClassId(0), 10.0);
        assert!((arbs.cells()[0].resources - 8.0).abs() < 1e-12);
        assert!((arbs.cells()[1].resources - 2.0).abs() < 1e-12);
        assert!((arbs.cells()[1].stimulation - 0.2).abs() < 1e-12);
    }

    #[test]
    fn caps_split_between_classes() {
        assert_eq!(class_cap(true, 3, 150.0), 75.0);
        assert_eq!(class_cap(false, 3, 150.0), 37.5);
        assert_eq!(class_cap(false, 2, 150.0), 75.0);
    }

    #[test]
    fn competition_respects_caps() {
        let mut arbs = CellPool::new();
        for i in 0..30 {
            arbs.add(arb(i % 3, (i as f64 + 1.0) / 30.0));
        }
        allocate_resources(&mut arbs, ClassId(0), 10.0);
        let before = arbs.len();
        let removed = compete_for_resources(&mut arbs, ClassId(0), 3, 20.0);

        assert_eq!(arbs.len(), before - removed);
        assert!(removed > 0);
        assert!(arbs.resources_of(ClassId(0)) <= 10.0 + 1e-9);
        assert!(arbs.resources_of(ClassId(1)) <= 5.0 + 1e-9);
        assert!(arbs.resources_of(ClassId(2)) <= 5.0 + 1e-9);
        // The strongest own-class ARB survives.
        assert!(best_of_class(&arbs, ClassId(0)).is_some());
    }

    #[test]
    fn under_cap_pool_is_untouched() {
        let mut arbs: CellPool = vec![arb(0, 1.0), arb(0, 0.5)].into_iter().collect();
        allocate_resources(&mut arbs, ClassId(0), 10.0);
        assert_eq!(compete_for_resources(&mut arbs, ClassId(0), 2, 150.0), 0);
        assert_eq!(arbs.len(), 2);
        assert_eq!(arbs.resources_of(ClassId(0)), 15.0);
    }

    #[test]
    fn shaving_reduces_exactly_one_cell() {
        let mut arbs: CellPool = vec![arb(0, 1.0), arb(0, 0.9)].into_iter().collect();
        allocate_resources(&mut arbs, ClassId(0), 10.0);
        // Cap 15, held 19: the weaker ARB loses 4.
        assert_eq!(compete_for_resources(&mut arbs, ClassId(0), 2, 30.0), 0);
        assert!((arbs.cells()[1].resources - 5.0).abs() < 1e-9);
        assert!((arbs.resources_of(ClassId(0)) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn candidate_replaces_redundant_best_match() {
        let space = space();
        let antigen = [1.0, 1.0, 0.0];
        let mut memory: CellPool = vec![
            Cell::new(vec![0.0, 0.0, 1.0], ClassId(1)),
            Cell::new(vec![0.8, 0.8, 0.0], ClassId(0)),
        ]
        .into_iter()
        .collect();
        let best_stimulation = space.stimulation(&[0.8, 0.8, 0.0], &antigen);
        let candidate = Cell::new(vec![0.85, 0.85, 0.0], ClassId(0));

        let update = update_memory(&mut memory, 1, best_stimulation, candidate, &antigen, &space, 0.1);

        assert_eq!(update, MemoryUpdate::Replaced);
        assert_eq!(memory.len(), 2);
        assert!(memory.iter().all(|c| c.attributes() != [0.8, 0.8, 0.0]), "best match removed");
        assert!(memory.iter().any(|c| c.attributes() == [0.85, 0.85, 0.0]), "candidate present");
    }

    #[test]
    fn distant_candidate_is_added_alongside() {
        let space = space();
        let antigen = [1.0, 1.0, 0.0];
        let mut memory: CellPool = vec![Cell::new(vec![0.5, 0.5, 0.0], ClassId(0))]
            .into_iter()
            .collect();
        let candidate = Cell::new(vec![0.9, 0.9, 0.0], ClassId(0));
        let best_stimulation = space.stimulation(&[0.5, 0.5, 0.0], &antigen);

        let update = update_memory(&mut memory, 0, best_stimulation, candidate, &antigen, &space, 0.1);
        assert_eq!(update, MemoryUpdate::Added);
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn weaker_candidate_is_rejected() {
        let space = space();
        let antigen = [1.0, 1.0, 0.0];
        let mut memory: CellPool = vec![Cell::new(vec![0.9, 0.9, 0.0], ClassId(0))]
            .into_iter()
            .collect();
        let best_stimulation = space.stimulation(&[0.9, 0.9, 0.0], &antigen);
        let candidate = Cell::new(vec![0.9, 0.9, 0.0], ClassId(0));

        let update = update_memory(&mut memory, 0, best_stimulation, candidate, &antigen, &space, 1.0);
        assert_eq!(update, MemoryUpdate::Rejected, "equal stimulation is not strictly better");
        assert_eq!(memory.len(), 1);
    }

    fn episode<'a>(config: &'a AirsConfig, space: &'a DistanceFunction, seeds: &'a [Cell]) -> Episode<'a> {
        Episode {
            config,
            space,
            num_classes: 2,
            arb_seeds: seeds,
            replace_cutoff: 0.0,
        }
    }

    #[test]
    fn arb_pool_seeded_with_hypermutated_clones() {
        let space = space();
        let config = AirsConfig::airs2();
        let trainer = Trainer::new(config.clone(), Airs2::new());
        let antigen = [1.0, 1.0, 0.0];
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // round(0.55 * 10 * 2) = 11
        let mut best = Cell::new(vec![0.6, 0.6, 0.0], ClassId(0));
        best.stimulation = 0.55;
        let mut refinement = Refinement::default();
        let arbs = trainer.seed_arbs(&episode(&config, &space, &[]), &best, &antigen, &mut rng, &mut refinement);

        assert_eq!(refinement.clones, 11);
        assert_eq!(arbs.len(), 12);
        assert_eq!(arbs.cells()[0].attributes(), best.attributes());
        assert!(arbs.iter().all(|c| c.class() == ClassId(0)));
    }

    #[test]
    fn airs1_arb_pool_includes_seeds() {
        let space = space();
        let mut config = AirsConfig::airs1();
        config.clonal_rate = 4.0;
        config.hypermutation_rate = 1.5;
        let trainer = Trainer::new(config.clone(), Airs1::from_config(&config));
        let seeds = vec![arb(1, 0.0), arb(0, 0.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // round(0.5 * 4 * 1.5) = 3
        let mut best = Cell::new(vec![0.2, 0.2, 0.0], ClassId(0));
        best.stimulation = 0.5;
        let mut refinement = Refinement::default();
        let arbs = trainer.seed_arbs(&episode(&config, &space, &seeds), &best, &[1.0, 1.0, 0.0], &mut rng, &mut refinement);

        assert_eq!(refinement.clones, 3);
        assert_eq!(arbs.len(), 1 + 2 + 3);
    }

    #[test]
    fn variation_clones_in_proportion_to_stimulation() {
        let space = space();
        let config = AirsConfig::airs2();
        let trainer = Trainer::new(config.clone(), Airs2::new());
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        // clonal rate 10: 10 + 5 + 0 clones
        let mut arbs: CellPool = vec![arb(0, 1.0), arb(1, 0.5), arb(0, 0.04)].into_iter().collect();
        let added = trainer.vary(&episode(&config, &space, &[]), &mut arbs, &[1.0, 1.0, 0.0], &mut rng);

        assert_eq!(added, 15);
        assert_eq!(arbs.len(), 18);
        assert_eq!(arbs.iter().filter(|c| c.class() == ClassId(1)).count(), 6);
    }

    fn two_point_dataset() -> Dataset {
        let schema = Schema::new(
            vec![
                Attribute::numeric("x"),
                Attribute::numeric("y"),
                Attribute::nominal("class", ["a", "b"]),
            ],
            2,
        )
        .unwrap();
        Dataset::new(
            schema,
            vec![
                Instance::new(vec![0.0, 0.0, 0.0]),
                Instance::new(vec![1.0, 1.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn unmatched_class_is_inserted_without_refinement() {
        let data = two_point_dataset();
        for seed in 0..8 {
            let trainer = Trainer::new(AirsConfig::airs2().with_seed(seed), Airs2::new());
            let run = trainer.train(&data).unwrap();

            assert_eq!(run.stats.no_match_inserts, 1, "seed {seed}");
            assert_eq!(run.stats.trivial_matches, 1, "seed {seed}");
            assert_eq!(run.stats.refined, 0);
            assert_eq!(run.stats.total_rounds, 0, "refinement never ran");
            assert_eq!(run.memory.len(), 2);
            assert_eq!(run.memory.classes().len(), 2);
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_training() {
        let data = two_point_dataset();
        let mut config = AirsConfig::airs1();
        config.total_resources = -1.0;
        let trainer = Trainer::new(config, Airs1::new(0.1));
        assert!(matches!(trainer.train(&data), Err(AirsError::Config(_))));
    }

    #[test]
    fn huge_clonal_rate_is_a_config_error() {
        let data = two_point_dataset();
        let mut config = AirsConfig::airs2();
        config.clonal_rate = 1e30;
        let trainer = Trainer::new(config, Airs2::new());
        assert!(matches!(trainer.train(&data), Err(AirsError::Config(_))));
    }
}
