use image::{Rgb, RgbImage};
use ndarray::Array2;

use crate::raster::Circle;

/// Zero every pixel outside `circle`. With no circle the image is returned unchanged.
pub fn apply_circular_mask(image: &RgbImage, circle: Option<&Circle>) -> RgbImage {
    let Some(circle) = circle else {
        return image.clone();
    };
    let mut masked = image.clone();
    for (x, y, pixel) in masked.enumerate_pixels_mut() {
        if !circle.contains(y as usize, x as usize) {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    masked
}

/// Single-channel variant of [`apply_circular_mask`].
pub fn mask_array(data: &Array2<u8>, circle: Option<&Circle>) -> Array2<u8> {
    let Some(circle) = circle else {
        return data.clone();
    };
    let mut masked = data.clone();
    for ((row, col), v) in masked.indexed_iter_mut() {
        if !circle.contains(row, col) {
            *v = 0;
        }
    }
    masked
}
