//! # AIRS
//!
//! Artificial Immune Recognition System: a supervised classifier that
//! learns a compact set of labeled prototypes ("memory cells") from
//! labeled training vectors ("antigens") and classifies by k-nearest
//! neighbour vote over those prototypes.
//!
//! ## Quick Start
//!
//! ```rust
//! use airs::prelude::*;
//!
//! let schema = Schema::new(
//!     vec![
//!         Attribute::numeric("petal_length"),
//!         Attribute::numeric("petal_width"),
//!         Attribute::nominal("species", ["setosa", "virginica"]),
//!     ],
//!     2,
//! ).unwrap();
//! let rows = (0..20)
//!     .map(|i| {
//!         let s = (i % 2) as f64;
//!         let wiggle = (i % 7) as f64 * 0.05;
//!         Instance::new(vec![1.4 + s * 4.2 + wiggle, 0.2 + s * 1.8 + wiggle, s])
//!     })
//!     .collect();
//! let dataset = Dataset::new(schema, rows).unwrap();
//!
//! let model = train(&dataset, &AirsConfig::airs1().with_k(1)).unwrap();
//! let class = model.classify(&[5.7, 2.1, f64::NAN]).unwrap();
//! assert_eq!(model.schema().class_label(class), Some("virginica"));
//! println!("{}", model.summary());
//! ```
//!
//! ## Architecture
//!
//! - [`airs_core`] - schema, datasets, normaliser, affinity function, cells and pools
//! - [`airs_runtime`] - configuration, AIRS1 / AIRS2 trainer, the k-NN `Model`
//! - [`airs_parallel`] - AIRS2-Parallel trainer and memory-cell mergers
//!
//! ## Key Concepts
//!
//! | Term | Meaning |
//! |------|---------|
//! | Antigen | a labeled training vector |
//! | Memory cell | a long-lived prototype kept in the model |
//! | ARB | a short-lived candidate competing for resources while one antigen is refined |
//! | Affinity | normalised distance; lower is more similar |
//! | Stimulation | `1 - affinity`; rescaled to [0, 1] in every refinement round |

pub use airs_core as core;
pub use airs_runtime as runtime;

#[cfg(feature = "parallel")]
pub use airs_parallel as parallel;

/// Prelude module for convenient imports.
///
/// ```rust
/// use airs::prelude::*;
/// ```
pub mod prelude {
    pub use airs_core::prelude::*;
    pub use airs_runtime::prelude::*;

    #[cfg(feature = "parallel")]
    pub use airs_parallel::prelude::*;
}
