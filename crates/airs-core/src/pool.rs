//! CellPool: an ordered multiset of cells.
//!
//! Backed by a `Vec`, so the ARB pool rebuilt for every antigen is a
//! plain arena: cells are addressed by index and freed in bulk when the
//! pool is dropped. There is no deduplication; two cells with identical
//! vectors are still two cells.
//!
//! The three orderings are sorts applied on demand, not maintained
//! invariants. All three are stable, so ties keep their current order.
//!
//! A pool is owned by one trainer and is never shared between threads.

use crate::cell::Cell;
use crate::distance::DistanceFunction;
use crate::error::{AirsError, Result};
use crate::types::ClassId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellPool {
    cells: Vec<Cell>,
}

impl CellPool {
    pub fn new() -> Self {
        Self { cells: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn add_all(&mut self, cells: impl IntoIterator<Item = Cell>) {
        self.cells.extend(cells);
    }

    /// Remove the cell at `index`, keeping the order of the others.
    pub fn delete(&mut self, index: usize) -> Cell {
        self.cells.remove(index)
    }

    /// Keep only the cells matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Cell) -> bool) {
        self.cells.retain(f);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Cell> {
        self.cells.iter_mut()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// Best match first: affinity ascending.
    pub fn order_by_affinity(&mut self) {
        self.cells.sort_by(|a, b| {
            a.affinity
                .partial_cmp(&b.affinity)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Best match first: stimulation descending.
    pub fn order_by_stimulation(&mut self) {
        self.cells.sort_by(|a, b| {
            b.stimulation
                .partial_cmp(&a.stimulation)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Most resourced first: resources descending.
    pub fn order_by_resources(&mut self) {
        self.cells.sort_by(|a, b| {
            b.resources
                .partial_cmp(&a.resources)
                .unwrap_or(Ordering::Equal)
        });
    }

    /// Score every cell against an antigen (raw stimulation).
    pub fn stimulate(&mut self, space: &DistanceFunction, antigen: &[f64]) {
        for cell in &mut self.cells {
            cell.stimulate(space, antigen);
        }
    }

    /// Min-max rescale stimulation across the pool so the weakest cell
    /// sits at 0 and the strongest at 1.
    ///
    /// Fails when the pool is empty or every cell has the same
    /// stimulation, and when any rescaled value escapes [0, 1].
    pub fn normalize_stimulation(&mut self) -> Result<()> {
        let (min, max) = self
            .cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c.stimulation), hi.max(c.stimulation))
            });
        let range = max - min;
        if range.is_nan() || range <= 0.0 {
            return Err(AirsError::DegenerateStimulation {
                pool_size: self.cells.len(),
                value: min,
            });
        }

        for cell in &mut self.cells {
            cell.stimulation = (cell.stimulation - min) / range;
            if !(0.0..=1.0).contains(&cell.stimulation) {
                return Err(AirsError::StimulationOutOfRange {
                    value: cell.stimulation,
                });
            }
        }
        Ok(())
    }

    /// Mean stimulation over all cells, `None` for an empty pool.
    pub fn mean_stimulation(&self) -> Option<f64> {
        if self.cells.is_empty() {
            return None;
        }
        Some(self.cells.iter().map(|c| c.stimulation).sum::<f64>() / self.cells.len() as f64)
    }

    /// Mean stimulation over the cells of one class, `None` if the class is absent.
    pub fn mean_stimulation_of(&self, class: ClassId) -> Option<f64> {
        let (sum, n) = self
            .cells
            .iter()
            .filter(|c| c.class() == class)
            .fold((0.0, 0usize), |(s, n), c| (s + c.stimulation, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    /// Total resources held by the cells of one class.
    pub fn resources_of(&self, class: ClassId) -> f64 {
        self.cells
            .iter()
            .filter(|c| c.class() == class)
            .map(|c| c.resources)
            .sum()
    }

    /// The classes present in the pool, ascending.
    pub fn classes(&self) -> BTreeSet<ClassId> {
        self.cells.iter().map(Cell::class).collect()
    }

    /// Index of the first cell of `class` in current pool order.
    pub fn position_of_class(&self, class: ClassId) -> Option<usize> {
        self.cells.iter().position(|c| c.class() == class)
    }
}

impl From<Vec<Cell>> for CellPool {
    fn from(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

impl FromIterator<Cell> for CellPool {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<Cell> for CellPool {
    fn extend<I: IntoIterator<Item = Cell>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

impl IntoIterator for CellPool {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a CellPool {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(class: usize, stimulation: f64, resources: f64) -> Cell {
        let mut c = Cell::new(vec![stimulation, class as f64], ClassId(class));
        c.stimulation = stimulation;
        c.affinity = 1.0 - stimulation;
        c.resources = resources;
        c
    }

    #[test]
    fn orderings() {
        let mut pool: CellPool = vec![cell(0, 0.2, 5.0), cell(1, 0.9, 1.0), cell(0, 0.5, 9.0)]
            .into_iter()
            .collect();

        pool.order_by_stimulation();
        let s: Vec<f64> = pool.iter().map(|c| c.stimulation).collect();
        assert_eq!(s, vec![0.9, 0.5, 0.2]);

        pool.order_by_resources();
        let r: Vec<f64> = pool.iter().map(|c| c.resources).collect();
        assert_eq!(r, vec![9.0, 5.0, 1.0]);

        pool.order_by_affinity();
        let a: Vec<f64> = pool.iter().map(|c| c.stimulation).collect();
        assert_eq!(a, vec![0.9, 0.5, 0.2]);
    }

    #[test]
    fn normalisation_spans_unit_interval() {
        let mut pool: CellPool = vec![cell(0, 0.3, 0.0), cell(0, 0.8, 0.0), cell(1, 0.55, 0.0)]
            .into_iter()
            .collect();
        pool.normalize_stimulation().unwrap();

        assert!(pool.iter().all(|c| (0.0..=1.0).contains(&c.stimulation)));
        assert!(pool.iter().any(|c| c.stimulation == 0.0));
        assert!(pool.iter().any(|c| c.stimulation == 1.0));
        assert!((pool.cells()[2].stimulation - 0.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_normalisation_fails() {
        let mut pool: CellPool = vec![cell(0, 0.4, 0.0), cell(0, 0.4, 0.0)].into_iter().collect();
        assert!(matches!(
            pool.normalize_stimulation(),
            Err(AirsError::DegenerateStimulation { pool_size: 2, .. })
        ));

        let mut single: CellPool = vec![cell(0, 0.4, 0.0)].into_iter().collect();
        assert!(single.normalize_stimulation().is_err());
    }

    #[test]
    fn per_class_aggregates() {
        let pool: CellPool = vec![cell(0, 0.2, 2.0), cell(1, 0.6, 3.0), cell(0, 0.4, 4.0)]
            .into_iter()
            .collect();
        assert!((pool.mean_stimulation_of(ClassId(0)).unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(pool.mean_stimulation_of(ClassId(7)), None);
        assert_eq!(pool.resources_of(ClassId(0)), 6.0);
        assert_eq!(pool.position_of_class(ClassId(1)), Some(1));
        assert_eq!(pool.classes().len(), 2);
    }

    #[test]
    fn delete_keeps_order() {
        let mut pool: CellPool = vec![cell(0, 0.1, 0.0), cell(0, 0.2, 0.0), cell(0, 0.3, 0.0)]
            .into_iter()
            .collect();
        let removed = pool.delete(1);
        assert_eq!(removed.stimulation, 0.2);
        let s: Vec<f64> = pool.iter().map(|c| c.stimulation).collect();
        assert_eq!(s, vec![0.1, 0.3]);
    }
}
