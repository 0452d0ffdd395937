use imageproc::filter::median_filter;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_DENOISE_MEDIAN_RADIUS;
use crate::raster::{array_to_gray, gray_to_array};

use super::gaussian_blur::gaussian_blur_u8;

/// Noise suppression applied before the dish search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DenoiseMethod {
    None,
    /// Median over a (2r+1)x(2r+1) window; keeps the dish wall sharp.
    Median { radius: u32 },
    Gaussian { sigma: f32 },
}

impl Default for DenoiseMethod {
    fn default() -> Self {
        Self::Median {
            radius: DEFAULT_DENOISE_MEDIAN_RADIUS,
        }
    }
}

impl std::fmt::Display for DenoiseMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Median { radius } => write!(f, "Median (radius {radius})"),
            Self::Gaussian { sigma } => write!(f, "Gaussian (sigma {sigma})"),
        }
    }
}

pub fn denoise(data: &Array2<u8>, method: &DenoiseMethod) -> Array2<u8> {
    match method {
        DenoiseMethod::None => data.clone(),
        DenoiseMethod::Median { radius } => {
            if *radius == 0 {
                return data.clone();
            }
            let filtered = median_filter(&array_to_gray(data), *radius, *radius);
            gray_to_array(&filtered)
        }
        DenoiseMethod::Gaussian { sigma } => gaussian_blur_u8(data, *sigma),
    }
}
