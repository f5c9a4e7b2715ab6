//! AIRS Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use airs_core::prelude::*;
//! ```

pub use crate::types::{Attribute, AttributeKind, ClassId, Dataset, Instance, Schema};

pub use crate::normalize::Normalizer;

pub use crate::distance::{AttributeRange, AttributeRole, DistanceFunction};

pub use crate::cell::Cell;

pub use crate::pool::CellPool;

pub use crate::error::{AirsError, ConfigError, Result};
