use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adjustment::ConfigAdjustment;
use crate::consts::{
    DEFAULT_MAX_AREA_RATIO, DEFAULT_MAX_AXIS_RATIO, DEFAULT_MAX_CENTER_OFFSET_FRACTION,
    DEFAULT_MIN_AREA_PIXELS, DEFAULT_MIN_AREA_RATIO, DEFAULT_MIN_CIRCULARITY, DEFAULT_MIN_EXTENT,
    DEFAULT_MIN_SOLIDITY,
};
use crate::raster::{BinaryMask, Circle, MarkerMap};

use super::shape::{describe_region, BoundingBox, ShapeDescriptors};

/// Acceptance thresholds for colony candidates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_min_area_pixels")]
    pub min_area_pixels: usize,
    /// Minimum area as a fraction of the dish area.
    #[serde(default = "default_min_area_ratio")]
    pub min_area_ratio: f64,
    /// Maximum area as a fraction of the dish area.
    #[serde(default = "default_max_area_ratio")]
    pub max_area_ratio: f64,
    #[serde(default = "default_min_circularity")]
    pub min_circularity: f64,
    #[serde(default = "default_min_extent")]
    pub min_extent: f64,
    #[serde(default = "default_min_solidity")]
    pub min_solidity: f64,
    #[serde(default = "default_max_axis_ratio")]
    pub max_axis_ratio: f64,
    /// Centroids farther than this fraction of the radius from the dish
    /// centre are rim artifacts.
    #[serde(default = "default_max_center_offset_fraction")]
    pub max_center_offset_fraction: f64,
}

fn default_min_area_pixels() -> usize {
    DEFAULT_MIN_AREA_PIXELS
}
fn default_min_area_ratio() -> f64 {
    DEFAULT_MIN_AREA_RATIO
}
fn default_max_area_ratio() -> f64 {
    DEFAULT_MAX_AREA_RATIO
}
fn default_min_circularity() -> f64 {
    DEFAULT_MIN_CIRCULARITY
}
fn default_min_extent() -> f64 {
    DEFAULT_MIN_EXTENT
}
fn default_min_solidity() -> f64 {
    DEFAULT_MIN_SOLIDITY
}
fn default_max_axis_ratio() -> f64 {
    DEFAULT_MAX_AXIS_RATIO
}
fn default_max_center_offset_fraction() -> f64 {
    DEFAULT_MAX_CENTER_OFFSET_FRACTION
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_area_pixels: DEFAULT_MIN_AREA_PIXELS,
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            max_area_ratio: DEFAULT_MAX_AREA_RATIO,
            min_circularity: DEFAULT_MIN_CIRCULARITY,
            min_extent: DEFAULT_MIN_EXTENT,
            min_solidity: DEFAULT_MIN_SOLIDITY,
            max_axis_ratio: DEFAULT_MAX_AXIS_RATIO,
            max_center_offset_fraction: DEFAULT_MAX_CENTER_OFFSET_FRACTION,
        }
    }
}

impl ClassifierConfig {
    /// Repair structurally invalid values: negative ratios become 0 and an
    /// inverted area range is swapped.
    pub fn sanitized(&self) -> (Self, Vec<ConfigAdjustment>) {
        let mut config = self.clone();
        let mut adjustments = Vec::new();

        let non_negative = [
            ("classifier.min_area_ratio", &mut config.min_area_ratio),
            ("classifier.max_area_ratio", &mut config.max_area_ratio),
            ("classifier.min_circularity", &mut config.min_circularity),
            ("classifier.min_extent", &mut config.min_extent),
            ("classifier.min_solidity", &mut config.min_solidity),
            ("classifier.max_axis_ratio", &mut config.max_axis_ratio),
            (
                "classifier.max_center_offset_fraction",
                &mut config.max_center_offset_fraction,
            ),
        ];
        for (option, value) in non_negative {
            if *value < 0.0 || value.is_nan() {
                adjustments.push(ConfigAdjustment::record(option, *value, 0.0, "must not be negative"));
                *value = 0.0;
            }
        }

        if config.min_area_ratio > config.max_area_ratio {
            adjustments.push(ConfigAdjustment::record(
                "classifier.min_area_ratio",
                config.min_area_ratio,
                config.max_area_ratio,
                "min_area_ratio exceeded max_area_ratio, bounds swapped",
            ));
            std::mem::swap(&mut config.min_area_ratio, &mut config.max_area_ratio);
        }

        (config, adjustments)
    }
}

/// An accepted colony.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Colony {
    /// Marker label the colony was grown from.
    pub label: u32,
    /// Area in pixels.
    pub area: usize,
    /// Centroid `[x, y]` in image coordinates.
    pub centroid: [f64; 2],
    pub bbox: BoundingBox,
    pub circularity: f64,
    pub extent: f64,
    pub solidity: f64,
    pub axis_ratio: f64,
}

/// Why a candidate region was not counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    TooSmall,
    TooLarge,
    Degenerate,
    LowCircularity,
    LowExtent,
    LowSolidity,
    Elongated,
    OffCenter,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooSmall => write!(f, "too small"),
            Self::TooLarge => write!(f, "too large"),
            Self::Degenerate => write!(f, "degenerate"),
            Self::LowCircularity => write!(f, "low circularity"),
            Self::LowExtent => write!(f, "low extent"),
            Self::LowSolidity => write!(f, "low solidity"),
            Self::Elongated => write!(f, "elongated"),
            Self::OffCenter => write!(f, "off center"),
        }
    }
}

/// Number of rejected regions per reason.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub too_small: usize,
    pub too_large: usize,
    pub degenerate: usize,
    pub low_circularity: usize,
    pub low_extent: usize,
    pub low_solidity: usize,
    pub elongated: usize,
    pub off_center: usize,
}

impl RejectionCounts {
    pub fn add(&mut self, rejection: Rejection) {
        let slot = match rejection {
            Rejection::TooSmall => &mut self.too_small,
            Rejection::TooLarge => &mut self.too_large,
            Rejection::Degenerate => &mut self.degenerate,
            Rejection::LowCircularity => &mut self.low_circularity,
            Rejection::LowExtent => &mut self.low_extent,
            Rejection::LowSolidity => &mut self.low_solidity,
            Rejection::Elongated => &mut self.elongated,
            Rejection::OffCenter => &mut self.off_center,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.too_small
            + self.too_large
            + self.degenerate
            + self.low_circularity
            + self.low_extent
            + self.low_solidity
            + self.elongated
            + self.off_center
    }
}

/// Accepted colonies, their combined mask and the rejection tally.
#[derive(Clone, Debug)]
pub struct Classification {
    pub colonies: Vec<Colony>,
    pub mask: BinaryMask,
    pub rejections: RejectionCounts,
}

/// Dish geometry the area and position filters are relative to.
#[derive(Clone, Copy, Debug)]
pub struct DishGeometry {
    pub circle: Circle,
    /// Dish area in pixels.
    pub area: usize,
}

impl DishGeometry {
    fn area_bounds(&self, config: &ClassifierConfig) -> (f64, f64) {
        let dish_area = self.area as f64;
        let min = (config.min_area_pixels as f64).max(config.min_area_ratio * dish_area);
        (min, config.max_area_ratio * dish_area)
    }
}

/// Evaluate every seed region of `markers` and keep the colony-shaped ones.
///
/// A region is the pixels carrying its label that are also foreground in
/// `foreground`. Colonies are returned in label order.
pub fn classify_regions(
    markers: &MarkerMap,
    foreground: &BinaryMask,
    dish: &DishGeometry,
    config: &ClassifierConfig,
) -> Classification {
    let mut regions: Vec<Vec<(usize, usize)>> = vec![Vec::new(); markers.seed_count as usize];
    for ((row, col), &label) in markers.labels.indexed_iter() {
        if label >= MarkerMap::FIRST_SEED && foreground[[row, col]] {
            if let Some(region) = regions.get_mut((label - MarkerMap::FIRST_SEED) as usize) {
                region.push((row, col));
            }
        }
    }

    let mut colonies = Vec::new();
    let mut mask = Array2::from_elem(markers.labels.dim(), false);
    let mut rejections = RejectionCounts::default();

    for (label, pixels) in markers.seed_labels().zip(regions) {
        if pixels.is_empty() {
            continue;
        }
        match evaluate(&pixels, dish, config) {
            Ok(shape) => {
                for &(row, col) in &shape.pixels {
                    mask[[row, col]] = true;
                }
                colonies.push(Colony {
                    label,
                    area: shape.area,
                    centroid: [shape.centroid.0, shape.centroid.1],
                    bbox: shape.bbox,
                    circularity: shape.circularity,
                    extent: shape.extent,
                    solidity: shape.solidity,
                    axis_ratio: shape.axis_ratio,
                });
            }
            Err(rejection) => {
                debug!(label, %rejection, "Region rejected");
                rejections.add(rejection);
            }
        }
    }

    debug!(
        accepted = colonies.len(),
        rejected = rejections.total(),
        "Regions classified"
    );
    Classification {
        colonies,
        mask,
        rejections,
    }
}

/// Apply the filters in order: area, geometry, circularity, extent,
/// solidity, elongation, position.
///
/// Area bounds apply to the measured piece, which is the area reported for
/// an accepted colony.
pub fn evaluate(
    pixels: &[(usize, usize)],
    dish: &DishGeometry,
    config: &ClassifierConfig,
) -> std::result::Result<ShapeDescriptors, Rejection> {
    let (min_area, max_area) = dish.area_bounds(config);
    // The measured piece is never larger than the label, so this rejects early.
    if (pixels.len() as f64) < min_area {
        return Err(Rejection::TooSmall);
    }

    let shape = describe_region(pixels).ok_or(Rejection::Degenerate)?;
    let area = shape.area as f64;
    if area < min_area {
        return Err(Rejection::TooSmall);
    }
    if area > max_area {
        return Err(Rejection::TooLarge);
    }
    if shape.circularity < config.min_circularity {
        return Err(Rejection::LowCircularity);
    }
    if shape.extent < config.min_extent {
        return Err(Rejection::LowExtent);
    }
    if shape.solidity < config.min_solidity {
        return Err(Rejection::LowSolidity);
    }
    if shape.axis_ratio > config.max_axis_ratio {
        return Err(Rejection::Elongated);
    }

    let dx = shape.centroid.0 - dish.circle.center_x as f64;
    let dy = shape.centroid.1 - dish.circle.center_y as f64;
    let limit = config.max_center_offset_fraction * dish.circle.radius as f64;
    if (dx * dx + dy * dy).sqrt() > limit {
        return Err(Rejection::OffCenter);
    }
    Ok(shape)
}
