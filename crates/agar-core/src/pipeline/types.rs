use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::adjustment::ConfigAdjustment;
use crate::colony::{Colony, RejectionCounts};
use crate::raster::{BinaryMask, Circle};

/// Pipeline stage, used for diagnostics and cancellation checkpoints.
///
/// The numeric prefix of `file_stem` orders debug artifacts on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Input,
    Grayscale,
    Denoised,
    Equalized,
    LocatorPreview,
    LocatorFailed,
    Masked,
    Normalized,
    Binary,
    Markers,
    Result,
}

impl Stage {
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Input => "00_input",
            Self::Grayscale => "10_gray",
            Self::Denoised => "20_denoised",
            Self::Equalized => "30_equalized",
            Self::LocatorPreview => "40_locator_preview",
            Self::LocatorFailed => "40_locator_preview_FAIL",
            Self::Masked => "50_masked",
            Self::Normalized => "55_normalized",
            Self::Binary => "60_binary",
            Self::Markers => "65_markers",
            Self::Result => "70_result",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "Reading input"),
            Self::Grayscale => write!(f, "Converting to grayscale"),
            Self::Denoised => write!(f, "Denoising"),
            Self::Equalized => write!(f, "Equalizing contrast"),
            Self::LocatorPreview | Self::LocatorFailed => write!(f, "Locating dish"),
            Self::Masked => write!(f, "Masking dish"),
            Self::Normalized => write!(f, "Normalizing contrast"),
            Self::Binary => write!(f, "Binarizing"),
            Self::Markers => write!(f, "Separating colonies"),
            Self::Result => write!(f, "Classifying colonies"),
        }
    }
}

/// Structured metadata of one analysed image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColonyReport {
    /// Dish boundary; `None` when no dish was detected.
    pub circle: Option<Circle>,
    pub colonies_count: usize,
    /// Accepted colonies in raster order of their labels.
    pub colonies: Vec<Colony>,
    /// Options that were corrected before use.
    #[serde(default)]
    pub adjustments: Vec<ConfigAdjustment>,
}

/// Annotated image plus metadata.
#[derive(Clone, Debug)]
pub struct DishAnalysis {
    /// Annotated masked dish, or the original input when no dish was found.
    pub image: RgbImage,
    /// Union of the accepted colony regions.
    pub colony_mask: BinaryMask,
    pub report: ColonyReport,
    pub rejections: RejectionCounts,
}

impl DishAnalysis {
    pub fn dish_found(&self) -> bool {
        self.report.circle.is_some()
    }

    pub fn colonies_count(&self) -> usize {
        self.report.colonies_count
    }
}
