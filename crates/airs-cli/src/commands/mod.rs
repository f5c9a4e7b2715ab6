//! CLI command implementations.

pub mod init;
pub mod train;
pub mod classify;
pub mod evaluate;
pub mod inspect;

use crate::config::Config;
use airs::prelude::Model;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The model path given on the command line, or the configured one.
pub(crate) fn model_path(explicit: Option<String>, config: &Config) -> PathBuf {
    PathBuf::from(explicit.unwrap_or_else(|| config.data.model_path.clone()))
}

pub(crate) fn load_model(path: &Path) -> Result<Model> {
    Model::load(path).with_context(|| {
        format!(
            "Failed to load model {} (run `airs train` first)",
            path.display()
        )
    })
}
