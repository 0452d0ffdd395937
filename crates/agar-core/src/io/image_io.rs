use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};
use ndarray::Array2;

use crate::error::Result;
use crate::raster::{array_to_gray, ensure_non_empty, mask_to_gray, BinaryMask};

/// Read and decode an image file, rejecting zero-pixel images.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path)?;
    ensure_non_empty(image.width(), image.height())?;
    Ok(image)
}

/// Decode an in-memory encoded image (PNG, JPEG, ...), guessing the format.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes)?;
    ensure_non_empty(image.width(), image.height())?;
    Ok(image)
}

/// Save an RGB image, choosing the format from the file extension.
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path)?;
    Ok(())
}

/// Save an 8-bit single-channel array as PNG.
pub fn save_gray(data: &Array2<u8>, path: &Path) -> Result<()> {
    array_to_gray(data).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a mask as a 0/255 PNG.
pub fn save_mask(mask: &BinaryMask, path: &Path) -> Result<()> {
    mask_to_gray(mask).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
