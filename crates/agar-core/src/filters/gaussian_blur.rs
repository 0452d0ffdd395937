use ndarray::{Array2, Zip};

use crate::consts::EPSILON;
use crate::raster::BinaryMask;

/// Apply Gaussian blur to a raw array using separable 1D convolution.
///
/// Borders are handled by clamping to the nearest edge pixel.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve_rows(data, &kernel);
    convolve_cols(&row_pass, &kernel)
}

/// Gaussian blur of an 8-bit image, rounded back to 8 bits.
pub fn gaussian_blur_u8(data: &Array2<u8>, sigma: f32) -> Array2<u8> {
    let blurred = gaussian_blur_array(&data.mapv(f32::from), sigma);
    blurred.mapv(|v| v.round().clamp(0.0, 255.0) as u8)
}

/// Normalized convolution: the blur only averages pixels inside `mask`.
///
/// Pixels outside the mask get the value 0. Inside the mask each pixel is the
/// Gaussian-weighted mean of the masked neighbourhood, so values outside the
/// mask never bleed into the estimate.
pub fn masked_gaussian_blur(data: &Array2<f32>, mask: &BinaryMask, sigma: f32) -> Array2<f32> {
    let weights = mask.mapv(|m| if m { 1.0f32 } else { 0.0 });
    let weighted = Zip::from(data).and(&weights).map_collect(|&v, &w| v * w);

    let num = gaussian_blur_array(&weighted, sigma);
    let den = gaussian_blur_array(&weights, sigma);

    Zip::from(&num)
        .and(&den)
        .and(mask)
        .map_collect(|&n, &d, &inside| {
            if inside && f64::from(d) > EPSILON {
                n / d
            } else {
                0.0
            }
        })
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

fn convolve_rows(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let mut result = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_col =
                    (col as isize + ki as isize - radius as isize).clamp(0, w as isize - 1) as usize;
                sum += data[[row, src_col]] * kv;
            }
            result[[row, col]] = sum;
        }
    }
    result
}

fn convolve_cols(data: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() / 2;
    let mut result = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let src_row =
                    (row as isize + ki as isize - radius as isize).clamp(0, h as isize - 1) as usize;
                sum += data[[src_row, col]] * kv;
            }
            result[[row, col]] = sum;
        }
    }
    result
}
