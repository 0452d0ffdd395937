use serde::{Deserialize, Serialize};

use crate::adjustment::ConfigAdjustment;
use crate::consts::{
    DEFAULT_EDGE_THRESHOLD, DEFAULT_HOUGH_DP, DEFAULT_MAX_RADIUS_FRACTION,
    DEFAULT_MIN_DIST_FRACTION, DEFAULT_MIN_RADIUS_FRACTION, DEFAULT_MIN_VOTE_THRESHOLD,
    DEFAULT_VOTE_RELAX_STEP, DEFAULT_VOTE_THRESHOLD,
};
use crate::filters::denoise::DenoiseMethod;
use crate::filters::histogram::Equalization;

/// Tuning of the dish circle search. Distances are fractions of min(h, w).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Accumulator cell size in pixels (voting grid coarseness).
    #[serde(default = "default_dp")]
    pub dp: f32,
    /// Minimum distance between accepted circle centres.
    #[serde(default = "default_min_dist_fraction")]
    pub min_dist_fraction: f32,
    #[serde(default = "default_min_radius_fraction")]
    pub min_radius_fraction: f32,
    #[serde(default = "default_max_radius_fraction")]
    pub max_radius_fraction: f32,
    /// Canny high threshold; the low threshold is half of it.
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f32,
    /// Votes needed on the first attempt.
    #[serde(default = "default_vote_threshold")]
    pub vote_threshold: u32,
    /// Drop of the vote threshold per relaxation step.
    #[serde(default = "default_vote_relax_step")]
    pub vote_relax_step: u32,
    /// Last vote threshold tried.
    #[serde(default = "default_min_vote_threshold")]
    pub min_vote_threshold: u32,
    #[serde(default)]
    pub denoise: DenoiseMethod,
    #[serde(default)]
    pub equalization: Equalization,
    /// Retry the relaxed search on an edge map when the image itself fails.
    #[serde(default = "default_edge_map_fallback")]
    pub edge_map_fallback: bool,
}

fn default_dp() -> f32 {
    DEFAULT_HOUGH_DP
}
fn default_min_dist_fraction() -> f32 {
    DEFAULT_MIN_DIST_FRACTION
}
fn default_min_radius_fraction() -> f32 {
    DEFAULT_MIN_RADIUS_FRACTION
}
fn default_max_radius_fraction() -> f32 {
    DEFAULT_MAX_RADIUS_FRACTION
}
fn default_edge_threshold() -> f32 {
    DEFAULT_EDGE_THRESHOLD
}
fn default_vote_threshold() -> u32 {
    DEFAULT_VOTE_THRESHOLD
}
fn default_vote_relax_step() -> u32 {
    DEFAULT_VOTE_RELAX_STEP
}
fn default_min_vote_threshold() -> u32 {
    DEFAULT_MIN_VOTE_THRESHOLD
}
fn default_edge_map_fallback() -> bool {
    true
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            dp: DEFAULT_HOUGH_DP,
            min_dist_fraction: DEFAULT_MIN_DIST_FRACTION,
            min_radius_fraction: DEFAULT_MIN_RADIUS_FRACTION,
            max_radius_fraction: DEFAULT_MAX_RADIUS_FRACTION,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            vote_threshold: DEFAULT_VOTE_THRESHOLD,
            vote_relax_step: DEFAULT_VOTE_RELAX_STEP,
            min_vote_threshold: DEFAULT_MIN_VOTE_THRESHOLD,
            denoise: DenoiseMethod::default(),
            equalization: Equalization::default(),
            edge_map_fallback: true,
        }
    }
}

/// Pixel-space search bounds derived from a [`LocatorConfig`] for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
    pub dp: f32,
    pub min_dist: f32,
    pub min_radius: usize,
    pub max_radius: usize,
    pub edge_low: f32,
    pub edge_high: f32,
    /// Vote thresholds in the order they are tried.
    pub vote_thresholds: Vec<u32>,
}

impl LocatorConfig {
    /// Derive size-proportional search bounds for an image of `height` x `width`.
    ///
    /// Structurally invalid settings are corrected to the nearest valid value
    /// and reported, so a bad configuration never aborts the search.
    pub fn search_params(&self, height: usize, width: usize) -> (SearchParams, Vec<ConfigAdjustment>) {
        let mut adjustments = Vec::new();
        let s = height.min(width) as f32;

        let dp = if self.dp.is_finite() && self.dp >= 1.0 {
            self.dp
        } else {
            adjustments.push(ConfigAdjustment::record(
                "locator.dp",
                self.dp,
                1.0,
                "accumulator cells cannot be smaller than a pixel",
            ));
            1.0
        };

        let min_radius_fraction = checked_fraction(
            "locator.min_radius_fraction",
            self.min_radius_fraction,
            DEFAULT_MIN_RADIUS_FRACTION,
            &mut adjustments,
        );
        let max_radius_fraction = checked_fraction(
            "locator.max_radius_fraction",
            self.max_radius_fraction,
            DEFAULT_MAX_RADIUS_FRACTION,
            &mut adjustments,
        );
        let min_dist_fraction = checked_fraction(
            "locator.min_dist_fraction",
            self.min_dist_fraction,
            DEFAULT_MIN_DIST_FRACTION,
            &mut adjustments,
        );

        // No circle that touches the image can be wider than its diagonal.
        let diagonal = ((height as f32).hypot(width as f32).ceil() as usize).max(2);

        let min_radius = (s * min_radius_fraction) as usize;
        let min_radius = if min_radius == 0 {
            adjustments.push(ConfigAdjustment::record(
                "locator.min_radius_fraction",
                min_radius_fraction,
                "1 px",
                "minimum radius must be at least one pixel",
            ));
            1
        } else if min_radius >= diagonal {
            let clamped = diagonal - 1;
            adjustments.push(ConfigAdjustment::record(
                "locator.min_radius_fraction",
                min_radius_fraction,
                format!("{clamped} px"),
                "minimum radius must be smaller than the image diagonal",
            ));
            clamped
        } else {
            min_radius
        };

        let requested_max = (s * max_radius_fraction) as usize;
        let max_radius = if requested_max <= min_radius {
            let clamped = min_radius + 1;
            adjustments.push(ConfigAdjustment::record(
                "locator.max_radius_fraction",
                max_radius_fraction,
                format!("{clamped} px"),
                "maximum radius must exceed minimum radius; clamped to min + 1",
            ));
            clamped
        } else if requested_max > diagonal {
            adjustments.push(ConfigAdjustment::record(
                "locator.max_radius_fraction",
                max_radius_fraction,
                format!("{diagonal} px"),
                "maximum radius clamped to the image diagonal",
            ));
            diagonal
        } else {
            requested_max
        };

        let min_dist = s * min_dist_fraction;
        let min_dist = if min_dist < 1.0 {
            adjustments.push(ConfigAdjustment::record(
                "locator.min_dist_fraction",
                min_dist_fraction,
                "1 px",
                "centre separation must be at least one pixel",
            ));
            1.0
        } else {
            min_dist
        };

        let edge_high = if self.edge_threshold.is_finite() && self.edge_threshold > 0.0 {
            self.edge_threshold
        } else {
            adjustments.push(ConfigAdjustment::record(
                "locator.edge_threshold",
                self.edge_threshold,
                DEFAULT_EDGE_THRESHOLD,
                "edge threshold must be positive",
            ));
            DEFAULT_EDGE_THRESHOLD
        };

        let start = self.vote_threshold.max(1);
        let floor = if self.min_vote_threshold > start {
            adjustments.push(ConfigAdjustment::record(
                "locator.min_vote_threshold",
                self.min_vote_threshold,
                start,
                "relaxation floor above the initial vote threshold",
            ));
            start
        } else {
            self.min_vote_threshold.max(1)
        };
        let vote_thresholds = relaxation_sequence(start, floor, self.vote_relax_step);

        let params = SearchParams {
            dp,
            min_dist,
            min_radius,
            max_radius,
            edge_low: edge_high / 2.0,
            edge_high,
            vote_thresholds,
        };
        (params, adjustments)
    }
}

/// A size fraction that is NaN, infinite or negative falls back to `default`.
fn checked_fraction(
    option: &str,
    value: f32,
    default: f32,
    adjustments: &mut Vec<ConfigAdjustment>,
) -> f32 {
    if value.is_finite() && value >= 0.0 {
        return value;
    }
    adjustments.push(ConfigAdjustment::record(
        option,
        value,
        default,
        "fraction must be finite and non-negative",
    ));
    default
}

/// Descending thresholds from `start` to `floor` (inclusive) in `step` decrements.
fn relaxation_sequence(start: u32, floor: u32, step: u32) -> Vec<u32> {
    let mut sequence = vec![start];
    if step == 0 {
        return sequence;
    }
    let mut current = start;
    while current > floor {
        current = current.saturating_sub(step).max(floor);
        sequence.push(current);
    }
    sequence
}
