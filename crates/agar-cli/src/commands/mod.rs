pub mod config;
pub mod count;
pub mod locate;

use std::path::Path;

use agar_core::PipelineConfig;
use anyhow::{Context, Result};

/// Defaults, or the TOML file at `path` when given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}
