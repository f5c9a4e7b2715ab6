//! Training diagnostics.
//!
//! The trainer reports one [`AntigenOutcome`] per antigen and folds them
//! into a [`TrainingStats`] value it returns with the memory pool. Nothing
//! here feeds back into the algorithm.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a single training antigen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AntigenOutcome {
    /// No memory cell of the antigen's class; the antigen became one.
    NoMatch,
    /// The best match was an exact duplicate.
    TrivialMatch,
    /// The ARB pool was refined and the candidate offered to memory.
    Refined(Refinement),
}

/// Diagnostics of one ARB refinement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Refinement {
    /// Clones created, seeding included.
    pub clones: usize,
    /// Refinement rounds run.
    pub rounds: usize,
    /// ARBs removed by resource competition.
    pub pruned: usize,
    /// Resources held by the ARB pool after the last competition.
    pub resources: f64,
    /// The candidate entered the memory pool.
    pub candidate_added: bool,
    /// The candidate also replaced the best match.
    pub replaced: bool,
    /// The round cap was hit before the stop test passed.
    pub unconverged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub antigens: usize,
    pub no_match_inserts: usize,
    pub trivial_matches: usize,
    pub refined: usize,
    pub total_clones: usize,
    pub total_rounds: usize,
    pub total_pruned: usize,
    pub total_resources: f64,
    pub candidates_added: usize,
    pub replacements: usize,
    pub unconverged: usize,
    /// Memory cells in the final pool.
    pub memory_cells: usize,
}

impl TrainingStats {
    pub fn record(&mut self, outcome: AntigenOutcome) {
        self.antigens += 1;
        match outcome {
            AntigenOutcome::NoMatch => self.no_match_inserts += 1,
            AntigenOutcome::TrivialMatch => self.trivial_matches += 1,
            AntigenOutcome::Refined(r) => {
                self.refined += 1;
                self.total_clones += r.clones;
                self.total_rounds += r.rounds;
                self.total_pruned += r.pruned;
                self.total_resources += r.resources;
                self.candidates_added += usize::from(r.candidate_added);
                self.replacements += usize::from(r.replaced);
                self.unconverged += usize::from(r.unconverged);
            }
        }
    }

    /// Fold in the statistics of another run (e.g. a parallel partition).
    ///
    /// `memory_cells` is left alone; the caller knows the merged pool size.
    pub fn merge(&mut self, other: &TrainingStats) {
        self.antigens += other.antigens;
        self.no_match_inserts += other.no_match_inserts;
        self.trivial_matches += other.trivial_matches;
        self.refined += other.refined;
        self.total_clones += other.total_clones;
        self.total_rounds += other.total_rounds;
        self.total_pruned += other.total_pruned;
        self.total_resources += other.total_resources;
        self.candidates_added += other.candidates_added;
        self.replacements += other.replacements;
        self.unconverged += other.unconverged;
    }

    pub fn mean_clones(&self) -> f64 {
        per(self.total_clones as f64, self.refined)
    }

    pub fn mean_rounds(&self) -> f64 {
        per(self.total_rounds as f64, self.refined)
    }

    pub fn mean_pruned(&self) -> f64 {
        per(self.total_pruned as f64, self.refined)
    }

    pub fn mean_resources(&self) -> f64 {
        per(self.total_resources, self.refined)
    }

    /// Share of antigens whose candidate entered memory.
    pub fn memory_growth_rate(&self) -> f64 {
        per(self.candidates_added as f64, self.antigens)
    }
}

fn per(total: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        total / n as f64
    }
}

impl fmt::Display for TrainingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training antigens:           {}", self.antigens)?;
        writeln!(f, "Memory cells:                {}", self.memory_cells)?;
        writeln!(f, "New-class inserts:           {}", self.no_match_inserts)?;
        writeln!(f, "Exact matches skipped:       {}", self.trivial_matches)?;
        writeln!(f, "Refined antigens:            {}", self.refined)?;
        writeln!(f, "Mean clones per antigen:     {:.2}", self.mean_clones())?;
        writeln!(f, "Mean refinement rounds:      {:.2}", self.mean_rounds())?;
        writeln!(f, "Mean ARBs pruned:            {:.2}", self.mean_pruned())?;
        writeln!(f, "Mean ARB pool resources:     {:.2}", self.mean_resources())?;
        writeln!(
            f,
            "Candidates added to memory:  {} ({:.1}%)",
            self.candidates_added,
            self.memory_growth_rate() * 100.0
        )?;
        writeln!(f, "Memory cells replaced:       {}", self.replacements)?;
        write!(f, "Unconverged refinements:     {}", self.unconverged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_have_zero_means() {
        let stats = TrainingStats::default();
        assert_eq!(stats.mean_clones(), 0.0);
        assert_eq!(stats.mean_resources(), 0.0);
        assert!(stats.to_string().contains("Training antigens:           0"));
    }

    #[test]
    fn record_and_merge() {
        let mut a = TrainingStats::default();
        a.record(AntigenOutcome::NoMatch);
        a.record(AntigenOutcome::Refined(Refinement {
            clones: 10,
            rounds: 3,
            pruned: 4,
            resources: 75.0,
            candidate_added: true,
            replaced: true,
            unconverged: false,
        }));
        let mut b = TrainingStats::default();
        b.record(AntigenOutcome::TrivialMatch);
        b.record(AntigenOutcome::Refined(Refinement {
            clones: 20,
            rounds: 1,
            ..Refinement::default()
        }));

        a.merge(&b);
        assert_eq!(a.antigens, 4);
        assert_eq!(a.refined, 2);
        assert_eq!(a.mean_clones(), 15.0);
        assert_eq!(a.mean_rounds(), 2.0);
        assert_eq!(a.replacements, 1);
        assert_eq!(a.trivial_matches, 1);
        assert_eq!(a.memory_growth_rate(), 0.25);
    }
}
