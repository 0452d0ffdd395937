/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-10;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of histogram bins for 8-bit images (Otsu, equalization, CLAHE).
pub const HISTOGRAM_BINS: usize = 256;

// ---------------------------------------------------------------------------
// Dish locator
// ---------------------------------------------------------------------------

/// Inverse accumulator resolution: cells are `dp` pixels wide.
pub const DEFAULT_HOUGH_DP: f32 = 1.2;

/// Minimum distance between circle centres, as a fraction of min(h, w).
pub const DEFAULT_MIN_DIST_FRACTION: f32 = 0.70;

/// Smallest dish radius searched, as a fraction of min(h, w).
pub const DEFAULT_MIN_RADIUS_FRACTION: f32 = 0.25;

/// Largest dish radius searched, as a fraction of min(h, w).
pub const DEFAULT_MAX_RADIUS_FRACTION: f32 = 0.65;

/// Canny high threshold used to find voting edge pixels (low = half of it).
pub const DEFAULT_EDGE_THRESHOLD: f32 = 120.0;

/// Accumulator votes required for a circle centre on the first attempt.
pub const DEFAULT_VOTE_THRESHOLD: u32 = 70;

/// Amount the vote threshold drops on each relaxation step.
pub const DEFAULT_VOTE_RELAX_STEP: u32 = 10;

/// Lowest vote threshold tried before giving up.
pub const DEFAULT_MIN_VOTE_THRESHOLD: u32 = 50;

/// Median window radius for denoising before the circle search (25x25 window).
pub const DEFAULT_DENOISE_MEDIAN_RADIUS: u32 = 12;

/// Clip limit for contrast-limited adaptive histogram equalization.
pub const DEFAULT_CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Tiles per axis for contrast-limited adaptive histogram equalization.
pub const DEFAULT_CLAHE_TILES: usize = 8;

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

/// Fraction of the dish radius analysed for colonies (keeps the wall out).
pub const DEFAULT_ANALYSIS_RADIUS_FRACTION: f32 = 0.95;

/// Gaussian sigma of the illumination (background) estimate.
pub const DEFAULT_BACKGROUND_SIGMA: f32 = 21.0;

/// Residual range (in 8-bit levels) below which the dish is treated as flat.
pub const DEFAULT_MIN_DYNAMIC_RANGE: f32 = 8.0;

/// Gaussian sigma applied before Otsu thresholding.
pub const DEFAULT_BINARIZE_BLUR_SIGMA: f32 = 1.0;

/// Foreground ratio above which the threshold polarity is flipped.
pub const DEFAULT_MAX_FOREGROUND_RATIO: f32 = 0.35;

/// Radius of the opening structuring element (speckle removal).
pub const DEFAULT_OPEN_RADIUS: usize = 1;

/// Radius of the closing structuring element (gap filling).
pub const DEFAULT_CLOSE_RADIUS: usize = 2;

/// Distance-transform fraction of its maximum that marks sure foreground.
pub const DEFAULT_FOREGROUND_FRACTION: f32 = 0.35;

/// Minimum height (pixels) of a distance peak above its saddle to seed its own region.
pub const DEFAULT_SEED_PROMINENCE: f32 = 1.0;

/// Radius of the dilation that estimates sure background.
pub const DEFAULT_BACKGROUND_DILATION_RADIUS: usize = 2;

/// Number of background dilation passes.
pub const DEFAULT_BACKGROUND_DILATION_ITERATIONS: usize = 2;

// ---------------------------------------------------------------------------
// Shape classifier
// ---------------------------------------------------------------------------

/// Absolute lower bound on colony area in pixels.
pub const DEFAULT_MIN_AREA_PIXELS: usize = 30;

/// Minimum colony area relative to the dish area.
pub const DEFAULT_MIN_AREA_RATIO: f64 = 2e-4;

/// Maximum colony area relative to the dish area.
pub const DEFAULT_MAX_AREA_RATIO: f64 = 1.5e-2;

/// Minimum circularity (4*pi*area / perimeter^2).
pub const DEFAULT_MIN_CIRCULARITY: f64 = 0.18;

/// Minimum extent (area / bounding-box area).
pub const DEFAULT_MIN_EXTENT: f64 = 0.45;

/// Minimum solidity (area / convex-hull area).
pub const DEFAULT_MIN_SOLIDITY: f64 = 0.8;

/// Maximum elongation sqrt(lambda_max / lambda_min).
pub const DEFAULT_MAX_AXIS_RATIO: f64 = 2.2;

/// Colonies must have their centroid within this fraction of the dish radius.
pub const DEFAULT_MAX_CENTER_OFFSET_FRACTION: f64 = 0.9;

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// Overlay colour for accepted colonies.
pub const COLONY_FILL_RGB: [u8; 3] = [70, 220, 70];

/// Opacity of the colony overlay.
pub const COLONY_FILL_ALPHA: f32 = 0.4;

/// Centroid marker colour.
pub const CENTROID_MARKER_RGB: [u8; 3] = [255, 0, 0];

/// Centroid marker radius in pixels.
pub const CENTROID_MARKER_RADIUS: i32 = 3;

/// Dish outline colour on previews.
pub const DISH_OUTLINE_RGB: [u8; 3] = [0, 255, 0];
