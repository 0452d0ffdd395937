#![allow(dead_code)]

use std::sync::Mutex;

use agar_core::pipeline::{DiagnosticsSink, Stage};
use agar_core::raster::BinaryMask;
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array2;

/// Side length of the synthetic dish photographs.
pub const SIZE: u32 = 300;
/// Bench surface around the dish.
pub const BACKGROUND: u8 = 200;
/// Agar inside the dish.
pub const AGAR: u8 = 110;
/// Colony intensity (darker than agar).
pub const COLONY: u8 = 30;
pub const DISH_CENTER: (f32, f32) = (150.0, 150.0);
/// 40% of the image side.
pub const DISH_RADIUS: f32 = 120.0;

/// A filled disk at `(x, y)` with radius `r`.
#[derive(Clone, Copy, Debug)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl Dot {
    pub fn new(x: f32, y: f32, r: f32) -> Self {
        Self { x, y, r }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (x - self.x).powi(2) + (y - self.y).powi(2) <= self.r * self.r
    }
}

pub fn uniform_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
}

/// Lighter background, a darker dish of radius `DISH_RADIUS` in the centre,
/// and dark colonies at the given dots.
pub fn dish_image(dots: &[Dot]) -> DynamicImage {
    let dish = Dot::new(DISH_CENTER.0, DISH_CENTER.1, DISH_RADIUS);
    let image = RgbImage::from_fn(SIZE, SIZE, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        let value = if dots.iter().any(|d| d.contains(fx, fy)) {
            COLONY
        } else if dish.contains(fx, fy) {
            AGAR
        } else {
            BACKGROUND
        };
        Rgb([value; 3])
    });
    DynamicImage::ImageRgb8(image)
}

/// Mask of the union of `dots` on an `h` x `w` grid.
pub fn dots_mask(h: usize, w: usize, dots: &[Dot]) -> BinaryMask {
    Array2::from_shape_fn((h, w), |(row, col)| {
        dots.iter().any(|d| d.contains(col as f32, row as f32))
    })
}

/// Mean `(x, y)` of the true pixels.
pub fn mask_centroid(mask: &BinaryMask) -> (f64, f64) {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut n = 0.0;
    for ((row, col), &v) in mask.indexed_iter() {
        if v {
            sum_x += col as f64;
            sum_y += row as f64;
            n += 1.0;
        }
    }
    (sum_x / n, sum_y / n)
}

/// Sink that remembers which stages were recorded, in order.
#[derive(Default)]
pub struct RecordingSink {
    pub stages: Mutex<Vec<Stage>>,
}

impl RecordingSink {
    pub fn recorded(&self) -> Vec<Stage> {
        self.stages.lock().unwrap().clone()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, stage: Stage, _image: &DynamicImage) {
        self.stages.lock().unwrap().push(stage);
    }
}
