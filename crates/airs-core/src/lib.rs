//! # AIRS Core
//!
//! Core types shared by every AIRS crate.
//!
//! AIRS (Artificial Immune Recognition System) learns a compact pool of
//! labeled prototype vectors ("memory cells") from labeled training vectors
//! ("antigens"). This crate holds the pieces that carry no training policy:
//!
//! - **Schema / Dataset**: typed attributes, instances, class labels
//! - **Normalizer**: min-max scaling fitted on the training set
//! - **DistanceFunction**: per-attribute distance and normalised affinity
//! - **Cell**: a feature vector with a class and transient scoring fields
//! - **CellPool**: an ordered multiset of cells with the three AIRS orderings
//!
//! ## Quick Start
//!
//! ```rust
//! use airs_core::prelude::*;
//!
//! let schema = Schema::new(
//!     vec![
//!         Attribute::numeric("x"),
//!         Attribute::nominal("class", ["a", "b"]),
//!     ],
//!     1,
//! ).unwrap();
//! let dataset = Dataset::new(
//!     schema,
//!     vec![Instance::new(vec![0.0, 0.0]), Instance::new(vec![1.0, 1.0])],
//! ).unwrap();
//!
//! let space = DistanceFunction::new(&dataset).unwrap();
//! let a = &dataset.instances()[0];
//! let b = &dataset.instances()[1];
//! assert_eq!(space.affinity(&a.values, &b.values), 1.0);
//! ```

pub mod types;
pub mod error;
pub mod normalize;
pub mod distance;
pub mod cell;
pub mod pool;
pub mod prelude;

mod missing;
