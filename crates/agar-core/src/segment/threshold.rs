use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::HISTOGRAM_BINS;
use crate::filters::gaussian_blur::masked_gaussian_blur;
use crate::filters::histogram::histogram;
use crate::raster::{count_foreground, f32_to_u8, u8_to_f32, BinaryMask};

use super::config::BinarizerConfig;

/// Which side of the threshold counts as colony.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Foreground is `value > threshold`.
    Bright,
    /// Foreground is `value <= threshold`.
    Dark,
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bright => write!(f, "bright"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Binarization {
    pub mask: BinaryMask,
    pub threshold: u8,
    pub polarity: Polarity,
    /// Foreground pixels over dish pixels.
    pub foreground_ratio: f32,
}

impl Binarization {
    fn empty(dim: (usize, usize)) -> Self {
        Self {
            mask: Array2::from_elem(dim, false),
            threshold: 0,
            polarity: Polarity::Bright,
            foreground_ratio: 0.0,
        }
    }
}

/// Otsu's method over an 8-bit histogram: the bin that maximizes
/// between-class variance, with foreground meaning `value > bin`.
///
/// Returns `None` when fewer than two bins are occupied.
pub fn otsu_threshold(hist: &[u64; HISTOGRAM_BINS]) -> Option<u8> {
    if hist.iter().filter(|&&c| c > 0).count() < 2 {
        return None;
    }

    let total: f64 = hist.iter().map(|&c| c as f64).sum();
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut weight_bg = 0.0_f64;
    let mut sum_bg = 0.0_f64;
    let mut best_variance = -1.0_f64;
    let mut best_bin = 0usize;

    for (i, &count) in hist.iter().enumerate() {
        weight_bg += count as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let between_variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if between_variance > best_variance {
            best_variance = between_variance;
            best_bin = i;
        }
    }

    Some(best_bin as u8)
}

/// Threshold the normalized dish into colony candidates.
///
/// The image is smoothed inside `dish_mask`, thresholded with Otsu over dish
/// pixels only, and the polarity is flipped when the bright side covers more
/// than `max_foreground_ratio` of the dish. If both sides are too large the
/// smaller one is kept.
pub fn binarize(
    normalized: &Array2<u8>,
    dish_mask: &BinaryMask,
    config: &BinarizerConfig,
) -> Binarization {
    let dim = normalized.dim();
    let dish_pixels = count_foreground(dish_mask);
    if dish_pixels == 0 {
        return Binarization::empty(dim);
    }

    let smoothed = f32_to_u8(&masked_gaussian_blur(
        &u8_to_f32(normalized),
        dish_mask,
        config.blur_sigma,
    ));
    let Some(threshold) = otsu_threshold(&histogram(&smoothed, Some(dish_mask))) else {
        debug!("Dish histogram has a single level, no foreground");
        return Binarization::empty(dim);
    };

    let select = |polarity: Polarity| -> (BinaryMask, f32) {
        let mask = Zip::from(&smoothed)
            .and(dish_mask)
            .map_collect(|&v, &inside| {
                inside
                    && match polarity {
                        Polarity::Bright => v > threshold,
                        Polarity::Dark => v <= threshold,
                    }
            });
        let ratio = count_foreground(&mask) as f32 / dish_pixels as f32;
        (mask, ratio)
    };

    let (bright, bright_ratio) = select(Polarity::Bright);
    let (mask, polarity, foreground_ratio) = if bright_ratio <= config.max_foreground_ratio {
        (bright, Polarity::Bright, bright_ratio)
    } else {
        let (dark, dark_ratio) = select(Polarity::Dark);
        if dark_ratio <= config.max_foreground_ratio {
            (dark, Polarity::Dark, dark_ratio)
        } else {
            warn!(
                bright_ratio,
                dark_ratio,
                limit = config.max_foreground_ratio,
                "Both polarities exceed the foreground limit, keeping the smaller"
            );
            if dark_ratio < bright_ratio {
                (dark, Polarity::Dark, dark_ratio)
            } else {
                (bright, Polarity::Bright, bright_ratio)
            }
        }
    };

    debug!(threshold, %polarity, foreground_ratio, "Binarized");
    Binarization {
        mask,
        threshold,
        polarity,
        foreground_ratio,
    }
}
