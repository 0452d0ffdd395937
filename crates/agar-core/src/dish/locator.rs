use imageproc::edges::canny;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adjustment::ConfigAdjustment;
use crate::filters::denoise::denoise;
use crate::filters::histogram::equalize;
use crate::raster::{array_to_gray, Circle};

use super::config::{LocatorConfig, SearchParams};
use super::hough::{collect_edge_points, detect_circles, EdgePoint};

/// Which evidence image produced the dish circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionSource {
    /// Denoised, contrast-equalized grayscale.
    Equalized,
    /// Edge map of the denoised grayscale (fallback).
    EdgeMap,
}

impl std::fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equalized => write!(f, "equalized grayscale"),
            Self::EdgeMap => write!(f, "edge map"),
        }
    }
}

/// Outcome of the dish search. `circle == None` means no dish was found,
/// which is a normal result rather than an error.
#[derive(Clone, Debug)]
pub struct DishDetection {
    pub circle: Option<Circle>,
    pub source: Option<DetectionSource>,
    /// Vote threshold at which the circle was found.
    pub vote_threshold: Option<u32>,
    pub votes: u32,
    pub params: SearchParams,
    pub adjustments: Vec<ConfigAdjustment>,
    /// Grayscale after denoising (diagnostics).
    pub denoised: Array2<u8>,
    /// Denoised grayscale after equalization; the primary voting image.
    pub equalized: Array2<u8>,
}

impl DishDetection {
    pub fn found(&self) -> bool {
        self.circle.is_some()
    }
}

/// Find the Petri dish boundary in a grayscale image.
///
/// Tries the configured vote threshold and then each relaxed threshold on the
/// equalized image. If all of them fail, repeats the sequence on an edge map.
/// The first circle found is the strongest accumulator peak for that attempt.
pub fn locate_dish(gray: &Array2<u8>, config: &LocatorConfig) -> DishDetection {
    let (h, w) = gray.dim();
    let (params, adjustments) = config.search_params(h, w);
    info!(
        height = h,
        width = w,
        dp = params.dp,
        min_dist = params.min_dist,
        min_radius = params.min_radius,
        max_radius = params.max_radius,
        edge_high = params.edge_high,
        thresholds = ?params.vote_thresholds,
        "Dish search parameters"
    );

    let denoised = denoise(gray, &config.denoise);
    let equalized = equalize(&denoised, &config.equalization);

    let mut detection = DishDetection {
        circle: None,
        source: None,
        vote_threshold: None,
        votes: 0,
        params,
        adjustments,
        denoised,
        equalized,
    };

    let primary = collect_edge_points(
        &array_to_gray(&detection.equalized),
        detection.params.edge_low,
        detection.params.edge_high,
    );
    if try_thresholds(&mut detection, &primary, h, w, DetectionSource::Equalized) {
        return detection;
    }

    if config.edge_map_fallback {
        debug!("No dish on the equalized image; retrying on the edge map");
        let edge_map = canny(
            &array_to_gray(&detection.denoised),
            detection.params.edge_low / 2.0,
            detection.params.edge_high / 2.0,
        );
        let fallback = collect_edge_points(
            &edge_map,
            detection.params.edge_low,
            detection.params.edge_high,
        );
        if try_thresholds(&mut detection, &fallback, h, w, DetectionSource::EdgeMap) {
            return detection;
        }
    }

    info!("No dish detected");
    detection
}

fn try_thresholds(
    detection: &mut DishDetection,
    points: &[EdgePoint],
    h: usize,
    w: usize,
    source: DetectionSource,
) -> bool {
    for &threshold in &detection.params.vote_thresholds {
        let found = detect_circles(points, h, w, &detection.params, threshold, 1);
        if let Some(best) = found.first() {
            info!(
                x = best.circle.center_x,
                y = best.circle.center_y,
                r = best.circle.radius,
                votes = best.votes,
                support = best.support,
                threshold,
                %source,
                "Dish detected"
            );
            detection.circle = Some(best.circle);
            detection.source = Some(source);
            detection.vote_threshold = Some(threshold);
            detection.votes = best.votes;
            return true;
        }
        debug!(threshold, %source, "No circle at this vote threshold");
    }
    false
}
