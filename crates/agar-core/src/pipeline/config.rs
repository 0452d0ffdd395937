use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::colony::ClassifierConfig;
use crate::dish::LocatorConfig;
use crate::error::Result;
use crate::raster::SegmentationChannel;
use crate::segment::{BinarizerConfig, NormalizerConfig, SeparatorConfig};

/// Every tunable of a dish analysis run. Missing TOML sections fall back to
/// their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Channel of the masked dish fed to the normalizer.
    #[serde(default)]
    pub channel: SegmentationChannel,
    #[serde(default)]
    pub locator: LocatorConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub binarizer: BinarizerConfig,
    #[serde(default)]
    pub separator: SeparatorConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// When set, intermediate images are written under this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_directory: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
