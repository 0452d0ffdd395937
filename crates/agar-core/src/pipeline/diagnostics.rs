use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

use crate::error::Result;

use super::config::PipelineConfig;
use super::types::Stage;

/// Receives intermediate images as the pipeline produces them.
///
/// Recording is instrumentation only: implementations must not fail the run.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, stage: Stage, image: &DynamicImage);
}

/// Discards everything. Used for production runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn record(&self, _stage: Stage, _image: &DynamicImage) {}
}

/// Writes each stage as `<root>/<run id>/<NN_stage>.png`.
#[derive(Clone, Debug)]
pub struct FileSink {
    run_dir: PathBuf,
}

impl FileSink {
    /// Create a fresh run directory under `root`, named by the first eight
    /// hex digits of a random UUID.
    pub fn new(root: &Path) -> Result<Self> {
        let run_id: String = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let run_dir = root.join(run_id);
        std::fs::create_dir_all(&run_dir)?;
        debug!(dir = %run_dir.display(), "Writing diagnostics");
        Ok(Self { run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl DiagnosticsSink for FileSink {
    fn record(&self, stage: Stage, image: &DynamicImage) {
        let path = self.run_dir.join(format!("{}.png", stage.file_stem()));
        if let Err(e) = image.save_with_format(&path, ImageFormat::Png) {
            warn!(path = %path.display(), error = %e, "Failed to write diagnostic image");
        }
    }
}

/// `FileSink` when the config names a debug directory, otherwise `NoopSink`.
pub fn sink_for(config: &PipelineConfig) -> Result<Box<dyn DiagnosticsSink>> {
    match &config.debug_directory {
        Some(root) => Ok(Box::new(FileSink::new(root)?)),
        None => Ok(Box::new(NoopSink)),
    }
}
