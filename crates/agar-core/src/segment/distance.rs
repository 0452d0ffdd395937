//! Euclidean distance to the nearest background pixel.
//!
//! Pixels outside the image count as background, so foreground touching the
//! border gets its distance to the border.

use image::{GrayImage, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use ndarray::Array2;

use crate::raster::BinaryMask;

/// Distance from each foreground pixel to the nearest background pixel.
/// Background pixels are 0.
pub fn euclidean_distance_transform(mask: &BinaryMask) -> Array2<f32> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Array2::zeros((h, w));
    }

    // The transform measures distance to non-zero pixels, so background is
    // drawn as 255 inside a one pixel frame of implicit background.
    let seeds = GrayImage::from_fn(w as u32 + 2, h as u32 + 2, |x, y| {
        let (row, col) = (y as usize, x as usize);
        let inside = row >= 1 && col >= 1 && row <= h && col <= w;
        if inside && mask[[row - 1, col - 1]] {
            Luma([0])
        } else {
            Luma([255])
        }
    });
    let squared = euclidean_squared_distance_transform(&seeds);

    Array2::from_shape_fn((h, w), |(row, col)| {
        squared.get_pixel(col as u32 + 1, row as u32 + 1).0[0].sqrt() as f32
    })
}
