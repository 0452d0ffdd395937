use ndarray::{Array2, Zip};
use tracing::debug;

use crate::filters::gaussian_blur::{gaussian_blur_array, masked_gaussian_blur};
use crate::filters::histogram::{clahe, histogram, rescale_to_u8};
use crate::raster::{u8_to_f32, BinaryMask};

use super::config::NormalizerConfig;

/// Contrast-normalized channel.
#[derive(Clone, Debug)]
pub struct Normalized {
    pub image: Array2<u8>,
    /// Range of the illumination-flattened residual before rescaling.
    pub dynamic_range: f32,
    /// True when the residual range was too small to hold colonies.
    pub flat: bool,
}

/// Amplify local contrast and remove slow illumination gradients.
///
/// CLAHE first, then subtract a heavily blurred copy (the illumination
/// estimate) in signed arithmetic and stretch the residual to 0..255. With a
/// mask, the illumination estimate and the stretch only use masked pixels,
/// and pixels outside the mask come out as 0. Pixels outside the mask are
/// set to the masked median before CLAHE so the dish exterior does not
/// distort the tile histograms.
pub fn normalize_contrast(
    channel: &Array2<u8>,
    mask: Option<&BinaryMask>,
    config: &NormalizerConfig,
) -> Normalized {
    let prepared = match mask {
        Some(mask) => fill_outside(channel, mask),
        None => channel.clone(),
    };
    let enhanced = u8_to_f32(&clahe(&prepared, config.tiles, config.clip_limit));

    let background = match mask {
        Some(mask) => masked_gaussian_blur(&enhanced, mask, config.background_sigma),
        None => gaussian_blur_array(&enhanced, config.background_sigma),
    };
    let residual = Zip::from(&enhanced)
        .and(&background)
        .map_collect(|&e, &b| e - b);

    let (image, dynamic_range) = rescale_to_u8(&residual, mask);
    let flat = dynamic_range < config.min_dynamic_range;
    debug!(dynamic_range, flat, "Contrast normalized");

    if flat {
        return Normalized {
            image: Array2::zeros(channel.dim()),
            dynamic_range,
            flat,
        };
    }
    Normalized {
        image,
        dynamic_range,
        flat,
    }
}

fn fill_outside(channel: &Array2<u8>, mask: &BinaryMask) -> Array2<u8> {
    let hist = histogram(channel, Some(mask));
    let total: u64 = hist.iter().sum();
    let mut seen = 0u64;
    let mut median = 0u8;
    for (value, &count) in hist.iter().enumerate() {
        seen += count;
        if seen * 2 >= total && total > 0 {
            median = value as u8;
            break;
        }
    }
    Zip::from(channel)
        .and(mask)
        .map_collect(|&v, &inside| if inside { v } else { median })
}
