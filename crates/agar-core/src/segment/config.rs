use serde::{Deserialize, Serialize};

use crate::adjustment::ConfigAdjustment;
use crate::consts::{
    DEFAULT_ANALYSIS_RADIUS_FRACTION, DEFAULT_BACKGROUND_DILATION_ITERATIONS,
    DEFAULT_BACKGROUND_DILATION_RADIUS, DEFAULT_BACKGROUND_SIGMA, DEFAULT_BINARIZE_BLUR_SIGMA,
    DEFAULT_CLAHE_CLIP_LIMIT, DEFAULT_CLAHE_TILES, DEFAULT_CLOSE_RADIUS, DEFAULT_FOREGROUND_FRACTION,
    DEFAULT_MAX_FOREGROUND_RATIO, DEFAULT_MIN_DYNAMIC_RANGE, DEFAULT_OPEN_RADIUS,
    DEFAULT_SEED_PROMINENCE,
};

/// Local contrast enhancement and illumination flattening.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Fraction of the dish radius analysed; keeps the dish wall out.
    #[serde(default = "default_analysis_radius_fraction")]
    pub analysis_radius_fraction: f32,
    /// CLAHE clip limit relative to the mean bin height.
    #[serde(default = "default_clip_limit")]
    pub clip_limit: f32,
    /// CLAHE tiles per axis.
    #[serde(default = "default_tiles")]
    pub tiles: usize,
    /// Gaussian sigma of the illumination estimate that gets subtracted.
    #[serde(default = "default_background_sigma")]
    pub background_sigma: f32,
    /// Residual range (8-bit levels) below which the dish counts as featureless.
    #[serde(default = "default_min_dynamic_range")]
    pub min_dynamic_range: f32,
}

fn default_analysis_radius_fraction() -> f32 {
    DEFAULT_ANALYSIS_RADIUS_FRACTION
}
fn default_clip_limit() -> f32 {
    DEFAULT_CLAHE_CLIP_LIMIT
}
fn default_tiles() -> usize {
    DEFAULT_CLAHE_TILES
}
fn default_background_sigma() -> f32 {
    DEFAULT_BACKGROUND_SIGMA
}
fn default_min_dynamic_range() -> f32 {
    DEFAULT_MIN_DYNAMIC_RANGE
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            analysis_radius_fraction: DEFAULT_ANALYSIS_RADIUS_FRACTION,
            clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
            tiles: DEFAULT_CLAHE_TILES,
            background_sigma: DEFAULT_BACKGROUND_SIGMA,
            min_dynamic_range: DEFAULT_MIN_DYNAMIC_RANGE,
        }
    }
}

impl NormalizerConfig {
    /// Replace values the normaliser cannot work with and report them.
    pub fn sanitized(&self) -> (Self, Vec<ConfigAdjustment>) {
        let mut config = self.clone();
        let mut adjustments = Vec::new();

        let fraction = config.analysis_radius_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            adjustments.push(ConfigAdjustment::record(
                "normalizer.analysis_radius_fraction",
                fraction,
                1.0,
                "analysis radius fraction must lie in (0, 1]",
            ));
            config.analysis_radius_fraction = 1.0;
        }
        reset_unless(
            "normalizer.clip_limit",
            &mut config.clip_limit,
            |v| v >= 0.0,
            DEFAULT_CLAHE_CLIP_LIMIT,
            "clip limit must be finite and non-negative",
            &mut adjustments,
        );
        reset_unless(
            "normalizer.background_sigma",
            &mut config.background_sigma,
            |v| v > 0.0,
            DEFAULT_BACKGROUND_SIGMA,
            "background sigma must be finite and positive",
            &mut adjustments,
        );
        reset_unless(
            "normalizer.min_dynamic_range",
            &mut config.min_dynamic_range,
            |v| v >= 0.0,
            DEFAULT_MIN_DYNAMIC_RANGE,
            "dynamic range floor must be finite and non-negative",
            &mut adjustments,
        );

        (config, adjustments)
    }
}

/// Thresholding and morphological cleanup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinarizerConfig {
    /// Gaussian sigma applied before Otsu.
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
    /// Foreground share of the dish above which polarity is flipped.
    #[serde(default = "default_max_foreground_ratio")]
    pub max_foreground_ratio: f32,
    #[serde(default = "default_open_radius")]
    pub open_radius: usize,
    #[serde(default = "default_close_radius")]
    pub close_radius: usize,
}

fn default_blur_sigma() -> f32 {
    DEFAULT_BINARIZE_BLUR_SIGMA
}
fn default_max_foreground_ratio() -> f32 {
    DEFAULT_MAX_FOREGROUND_RATIO
}
fn default_open_radius() -> usize {
    DEFAULT_OPEN_RADIUS
}
fn default_close_radius() -> usize {
    DEFAULT_CLOSE_RADIUS
}

impl Default for BinarizerConfig {
    fn default() -> Self {
        Self {
            blur_sigma: DEFAULT_BINARIZE_BLUR_SIGMA,
            max_foreground_ratio: DEFAULT_MAX_FOREGROUND_RATIO,
            open_radius: DEFAULT_OPEN_RADIUS,
            close_radius: DEFAULT_CLOSE_RADIUS,
        }
    }
}

impl BinarizerConfig {
    /// Replace values the binariser cannot work with and report them.
    pub fn sanitized(&self) -> (Self, Vec<ConfigAdjustment>) {
        let mut config = self.clone();
        let mut adjustments = Vec::new();
        reset_unless(
            "binarizer.blur_sigma",
            &mut config.blur_sigma,
            |v| v >= 0.0,
            DEFAULT_BINARIZE_BLUR_SIGMA,
            "blur sigma must be finite and non-negative",
            &mut adjustments,
        );
        reset_unless(
            "binarizer.max_foreground_ratio",
            &mut config.max_foreground_ratio,
            |v| v > 0.0 && v <= 1.0,
            DEFAULT_MAX_FOREGROUND_RATIO,
            "foreground ratio must lie in (0, 1]",
            &mut adjustments,
        );
        (config, adjustments)
    }
}

/// Seed generation and flooding for splitting touching colonies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeparatorConfig {
    /// Fraction of the maximum distance that marks sure foreground.
    #[serde(default = "default_foreground_fraction")]
    pub foreground_fraction: f32,
    /// Height of a distance peak above its saddle needed for its own seed.
    /// Values <= 0 make every sure-foreground component a single seed.
    #[serde(default = "default_seed_prominence")]
    pub seed_prominence: f32,
    #[serde(default = "default_background_dilation_radius")]
    pub background_dilation_radius: usize,
    #[serde(default = "default_background_dilation_iterations")]
    pub background_dilation_iterations: usize,
}

fn default_foreground_fraction() -> f32 {
    DEFAULT_FOREGROUND_FRACTION
}
fn default_seed_prominence() -> f32 {
    DEFAULT_SEED_PROMINENCE
}
fn default_background_dilation_radius() -> usize {
    DEFAULT_BACKGROUND_DILATION_RADIUS
}
fn default_background_dilation_iterations() -> usize {
    DEFAULT_BACKGROUND_DILATION_ITERATIONS
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            foreground_fraction: DEFAULT_FOREGROUND_FRACTION,
            seed_prominence: DEFAULT_SEED_PROMINENCE,
            background_dilation_radius: DEFAULT_BACKGROUND_DILATION_RADIUS,
            background_dilation_iterations: DEFAULT_BACKGROUND_DILATION_ITERATIONS,
        }
    }
}

impl SeparatorConfig {
    /// Replace values the separator cannot work with and report them.
    pub fn sanitized(&self) -> (Self, Vec<ConfigAdjustment>) {
        let mut config = self.clone();
        let mut adjustments = Vec::new();
        reset_unless(
            "separator.foreground_fraction",
            &mut config.foreground_fraction,
            |v| (0.0..1.0).contains(&v),
            DEFAULT_FOREGROUND_FRACTION,
            "foreground fraction must lie in [0, 1)",
            &mut adjustments,
        );
        reset_unless(
            "separator.seed_prominence",
            &mut config.seed_prominence,
            |_| true,
            DEFAULT_SEED_PROMINENCE,
            "seed prominence must be finite",
            &mut adjustments,
        );
        (config, adjustments)
    }
}

/// Set `value` to `default` when it is not finite or fails `valid`.
fn reset_unless(
    option: &str,
    value: &mut f32,
    valid: impl Fn(f32) -> bool,
    default: f32,
    reason: &str,
    adjustments: &mut Vec<ConfigAdjustment>,
) {
    if value.is_finite() && valid(*value) {
        return;
    }
    adjustments.push(ConfigAdjustment::record(option, *value, default, reason));
    *value = default;
}
