//! # AIRS Parallel
//!
//! AIRS2-Parallel training: the training set is shuffled once, cut into
//! one partition per worker thread, and every partition is trained by an
//! independent AIRS2 trainer. The resulting memory pools are merged by a
//! [`merge::MemoryCellMerger`].
//!
//! ## Quick Start
//!
//! ```rust
//! use airs_core::prelude::*;
//! use airs_parallel::prelude::*;
//! use airs_runtime::prelude::AirsConfig;
//!
//! let schema = Schema::new(
//!     vec![Attribute::numeric("x"), Attribute::nominal("class", ["a", "b"])],
//!     1,
//! ).unwrap();
//! let rows = (0..16)
//!     .map(|i| {
//!         let class = (i % 2) as f64;
//!         Instance::new(vec![class * 10.0 + (i % 5) as f64 * 0.1, class])
//!     })
//!     .collect();
//! let dataset = Dataset::new(schema, rows).unwrap();
//!
//! let parallel = ParallelConfig::new(2, MergeMode::Prune);
//! let model = train_parallel(&dataset, &AirsConfig::airs2(), &parallel).unwrap();
//! assert_eq!(model.variant(), "AIRS2-Parallel");
//! assert!(model.effective_k() <= model.memory().len());
//! ```

pub mod partition;
pub mod merge;
pub mod parallel;
pub mod prelude;

pub use parallel::train_parallel;
