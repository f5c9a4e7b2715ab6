//! Cell: a labeled prototype vector.
//!
//! Memory cells and ARBs are both `Cell`s. The attribute vector and the
//! class never change once a cell exists; cloning copies the vector. The
//! scoring fields are transient: they are overwritten every time the cell
//! is compared against an antigen and are not persisted.

use crate::distance::DistanceFunction;
use crate::types::{ClassId, Instance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(with = "crate::missing")]
    attributes: Vec<f64>,
    class: ClassId,

    /// Affinity to the last antigen this cell was scored against.
    #[serde(skip)]
    pub affinity: f64,
    /// Stimulation by the last antigen; in [0, 1] after pool normalisation.
    #[serde(skip)]
    pub stimulation: f64,
    /// Resources currently held during ARB competition.
    #[serde(skip)]
    pub resources: f64,
    /// Number of antigens this cell was the best match for.
    #[serde(skip)]
    pub usage: u64,
}

impl Cell {
    pub fn new(attributes: Vec<f64>, class: ClassId) -> Self {
        Self {
            attributes,
            class,
            affinity: 0.0,
            stimulation: 0.0,
            resources: 0.0,
            usage: 0,
        }
    }

    /// A cell holding a copy of an instance's vector.
    pub fn from_instance(instance: &Instance, class: ClassId) -> Self {
        Self::new(instance.values.clone(), class)
    }

    /// A fresh cell of the same class over a different vector.
    pub fn offspring(&self, attributes: Vec<f64>) -> Self {
        Self::new(attributes, self.class)
    }

    pub fn attributes(&self) -> &[f64] {
        &self.attributes
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Score this cell against an antigen, setting affinity and raw stimulation.
    pub fn stimulate(&mut self, space: &DistanceFunction, antigen: &[f64]) -> f64 {
        self.affinity = space.affinity(&self.attributes, antigen);
        self.stimulation = 1.0 - self.affinity;
        self.stimulation
    }

    /// Clear the transient fields.
    pub fn reset(&mut self) {
        self.affinity = 0.0;
        self.stimulation = 0.0;
        self.resources = 0.0;
        self.usage = 0;
    }
}
