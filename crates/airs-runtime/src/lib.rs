//! # AIRS Runtime
//!
//! Training and classification on top of `airs-core`.
//!
//! The trainer is a single implementation parameterised by a
//! [`policy::RefinementPolicy`]: AIRS1 mutates at a fixed rate and stops
//! refining when every class in the ARB pool is stimulated enough, AIRS2
//! mutates in proportion to stimulation and looks at the pooled mean.
//!
//! ## Quick Start
//!
//! ```rust
//! use airs_core::prelude::*;
//! use airs_runtime::prelude::*;
//!
//! let schema = Schema::new(
//!     vec![
//!         Attribute::numeric("x"),
//!         Attribute::numeric("y"),
//!         Attribute::nominal("class", ["low", "high"]),
//!     ],
//!     2,
//! ).unwrap();
//! let rows = (0..12)
//!     .map(|i| {
//!         let high = i % 2;
//!         let jitter = i as f64 * 0.01;
//!         Instance::new(vec![high as f64 + jitter, high as f64 - jitter, high as f64])
//!     })
//!     .collect();
//! let dataset = Dataset::new(schema, rows).unwrap();
//!
//! let model = train(&dataset, &AirsConfig::airs2().with_seed(7).with_k(1)).unwrap();
//! assert!(!model.memory().is_empty());
//! let class = model.classify(&[0.95, 0.9, f64::NAN]).unwrap();
//! assert_eq!(model.schema().class_label(class), Some("high"));
//! ```

pub mod config;
pub mod init;
pub mod mutation;
pub mod policy;
pub mod threshold;
pub mod stats;
pub mod trainer;
pub mod model;
pub mod prelude;

use airs_core::prelude::*;
use config::{AirsConfig, Variant};
use model::Model;
use policy::{Airs1, Airs2};
use trainer::Trainer;
use tracing::instrument;

/// Train a model on a raw (unnormalised) dataset.
///
/// Fits a [`Normalizer`] on `raw`, trains the configured variant on the
/// normalised copy and bundles everything a later `classify` needs.
#[instrument(skip_all, fields(variant = config.variant.name(), instances = raw.len()))]
pub fn train(raw: &Dataset, config: &AirsConfig) -> Result<Model> {
    config.validate()?;
    let normalizer = Normalizer::fit(raw);
    let dataset = normalizer.transform(raw)?;

    let run = match config.variant {
        Variant::Airs1 => Trainer::new(config.clone(), Airs1::from_config(config)).train(&dataset)?,
        Variant::Airs2 => Trainer::new(config.clone(), Airs2::new()).train(&dataset)?,
    };

    Ok(Model::from_run(
        raw.schema().clone(),
        normalizer,
        run,
        config.k,
        config.variant.name(),
    ))
}
