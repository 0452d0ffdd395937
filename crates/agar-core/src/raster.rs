use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::error::{AgarError, Result};

/// Foreground/background mask. `true` is foreground; exported as 255/0.
pub type BinaryMask = Array2<bool>;

/// Circular dish boundary in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    #[serde(rename = "x")]
    pub center_x: f32,
    #[serde(rename = "y")]
    pub center_y: f32,
    #[serde(rename = "r")]
    pub radius: f32,
}

impl Circle {
    pub fn new(center_x: f32, center_y: f32, radius: f32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// Whether the pixel centre at `(row, col)` lies inside or on the circle.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        let dx = col as f32 - self.center_x;
        let dy = row as f32 - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Same centre, radius multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.center_x, self.center_y, self.radius * factor)
    }

    /// Rasterize the circle into a mask of the given shape.
    pub fn to_mask(&self, height: usize, width: usize) -> BinaryMask {
        Array2::from_shape_fn((height, width), |(row, col)| self.contains(row, col))
    }
}

/// Region labels produced by marker-controlled flooding.
///
/// `UNKNOWN` marks undecided pixels before flooding and watershed lines after it.
#[derive(Clone, Debug)]
pub struct MarkerMap {
    pub labels: Array2<u32>,
    /// Number of seed labels; seeds are `FIRST_SEED..FIRST_SEED + seed_count`.
    pub seed_count: u32,
}

impl MarkerMap {
    pub const UNKNOWN: u32 = 0;
    pub const BACKGROUND: u32 = 1;
    pub const FIRST_SEED: u32 = 2;

    /// A map where every pixel is background.
    pub fn all_background(height: usize, width: usize) -> Self {
        Self {
            labels: Array2::from_elem((height, width), Self::BACKGROUND),
            seed_count: 0,
        }
    }

    /// Seed labels in ascending (raster-scan) order.
    pub fn seed_labels(&self) -> impl Iterator<Item = u32> {
        Self::FIRST_SEED..Self::FIRST_SEED + self.seed_count
    }
}

/// Which channel of the masked dish drives segmentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentationChannel {
    /// BT.601 luma.
    #[default]
    Luminance,
    Red,
    Green,
    Blue,
}

impl std::fmt::Display for SegmentationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Luminance => write!(f, "Luminance"),
            Self::Red => write!(f, "Red"),
            Self::Green => write!(f, "Green"),
            Self::Blue => write!(f, "Blue"),
        }
    }
}

/// Reject zero-pixel images, which no stage can process.
pub fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(AgarError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Grayscale conversion with BT.601 weights.
pub fn luminance(rgb: &RgbImage) -> Array2<u8> {
    extract_channel(rgb, SegmentationChannel::Luminance)
}

/// Pull one channel out of a colour image as an 8-bit array.
pub fn extract_channel(rgb: &RgbImage, channel: SegmentationChannel) -> Array2<u8> {
    let (w, h) = rgb.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        let Rgb([r, g, b]) = *rgb.get_pixel(col as u32, row as u32);
        match channel {
            SegmentationChannel::Luminance => {
                let y = LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32;
                y.round().clamp(0.0, 255.0) as u8
            }
            SegmentationChannel::Red => r,
            SegmentationChannel::Green => g,
            SegmentationChannel::Blue => b,
        }
    })
}

pub fn array_to_gray(data: &Array2<u8>) -> GrayImage {
    let (h, w) = data.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| Luma([data[[y as usize, x as usize]]]))
}

pub fn gray_to_array(image: &GrayImage) -> Array2<u8> {
    let (w, h) = image.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        image.get_pixel(col as u32, row as u32).0[0]
    })
}

/// Render a mask as a 0/255 grayscale image.
pub fn mask_to_gray(mask: &BinaryMask) -> GrayImage {
    let (h, w) = mask.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        Luma([if mask[[y as usize, x as usize]] { 255 } else { 0 }])
    })
}

/// Quantize a float map into 8 bits, clamping to [0, 255].
pub fn f32_to_u8(data: &Array2<f32>) -> Array2<u8> {
    data.mapv(|v| v.round().clamp(0.0, 255.0) as u8)
}

pub fn u8_to_f32(data: &Array2<u8>) -> Array2<f32> {
    data.mapv(f32::from)
}

pub fn count_foreground(mask: &BinaryMask) -> usize {
    mask.iter().filter(|&&v| v).count()
}
