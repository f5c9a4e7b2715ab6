//! Error types for AIRS operations.
//!
//! Training has no partial-failure mode: every variant here either
//! rejects input before training starts or aborts the run outright.

use crate::types::ClassId;
use thiserror::Error;

/// Result type for AIRS operations.
pub type Result<T> = std::result::Result<T, AirsError>;

/// Errors that can occur while building datasets, training or classifying.
#[derive(Debug, Clone, Error)]
pub enum AirsError {
    /// Every ARB in the pool had the same stimulation, so min-max
    /// normalisation has a zero range.
    #[error("Degenerate stimulation normalisation: all {pool_size} ARBs at {value}")]
    DegenerateStimulation { pool_size: usize, value: f64 },

    /// A normalised stimulation escaped [0, 1].
    #[error("Stimulation {value} outside [0, 1] after normalisation")]
    StimulationOutOfRange { value: f64 },

    /// The stop test produced a NaN mean.
    #[error("Mean stimulation is NaN ({scope})")]
    NanMeanStimulation { scope: String },

    /// An attribute type the distance function cannot handle.
    #[error("Unsupported attribute {name:?} at index {index}: {reason}")]
    UnsupportedAttribute {
        index: usize,
        name: String,
        reason: String,
    },

    /// A vector whose length does not match the schema.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// An instance without a usable class value.
    #[error("Instance {index} has no valid class value")]
    MissingClass { index: usize },

    /// No usable training instances.
    #[error("Dataset contains no usable instances")]
    EmptyDataset,

    /// Classification was requested from a model with no memory cells.
    #[error("Model has no memory cells")]
    EmptyModel,

    /// Resource competition left no ARB of the antigen's class.
    #[error("ARB pool holds no cell of {0}")]
    NoCandidate(ClassId),

    /// A parallel training worker failed; the whole run is aborted.
    #[error("Training worker {partition} failed: {reason}")]
    WorkerFailed { partition: usize, reason: String },

    /// Configuration rejected before training.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AirsError {
    fn from(e: std::io::Error) -> Self {
        AirsError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AirsError {
    fn from(e: serde_json::Error) -> Self {
        AirsError::Serialization(e.to_string())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Out of range.
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl AirsError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        AirsError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        AirsError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    /// Whether this error arose inside the training algorithm itself
    /// rather than from input or configuration.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AirsError::DegenerateStimulation { .. }
                | AirsError::StimulationOutOfRange { .. }
                | AirsError::NanMeanStimulation { .. }
                | AirsError::NoCandidate(_)
                | AirsError::WorkerFailed { .. }
        )
    }
}
