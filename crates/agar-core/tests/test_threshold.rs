use ndarray::Array2;

use agar_core::filters::histogram::histogram;
use agar_core::segment::threshold::otsu_threshold;
use agar_core::segment::{binarize, BinarizerConfig, Polarity};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `background` everywhere with a `value` block at rows/cols 10..18.
fn block_image(background: u8, value: u8) -> Array2<u8> {
    Array2::from_shape_fn((40, 40), |(row, col)| {
        if (10..18).contains(&row) && (10..18).contains(&col) {
            value
        } else {
            background
        }
    })
}

fn full_mask() -> Array2<bool> {
    Array2::from_elem((40, 40), true)
}

// ---------------------------------------------------------------------------
// Otsu
// ---------------------------------------------------------------------------

#[test]
fn test_otsu_two_levels() {
    let mut hist = [0u64; 256];
    hist[50] = 10;
    hist[150] = 10;
    let t = otsu_threshold(&hist).unwrap();
    assert!((50..150).contains(&t), "threshold {t}");
}

#[test]
fn test_otsu_single_level_is_none() {
    let mut hist = [0u64; 256];
    hist[80] = 100;
    assert!(otsu_threshold(&hist).is_none());
    assert!(otsu_threshold(&[0u64; 256]).is_none());
}

#[test]
fn test_otsu_separates_bimodal_image() {
    let data = block_image(200, 20);
    let t = otsu_threshold(&histogram(&data, None)).unwrap();
    assert!(t >= 20 && t < 200);
}

// ---------------------------------------------------------------------------
// Binarize with polarity correction
// ---------------------------------------------------------------------------

#[test]
fn test_binarize_bright_colonies_keep_bright_polarity() {
    let data = block_image(20, 200);
    let result = binarize(&data, &full_mask(), &BinarizerConfig::default());

    assert_eq!(result.polarity, Polarity::Bright);
    assert!(result.mask[[14, 14]]);
    assert!(!result.mask[[30, 30]]);
    assert!(result.foreground_ratio > 0.0 && result.foreground_ratio <= 0.35);
}

#[test]
fn test_binarize_dark_colonies_flip_polarity() {
    let data = block_image(200, 20);
    let result = binarize(&data, &full_mask(), &BinarizerConfig::default());

    assert_eq!(result.polarity, Polarity::Dark);
    assert!(result.mask[[14, 14]]);
    assert!(!result.mask[[30, 30]]);
    assert!(result.foreground_ratio <= 0.35);
}

#[test]
fn test_binarize_respects_dish_mask() {
    let data = block_image(20, 200);
    let dish = Array2::from_shape_fn((40, 40), |(_, col)| col < 30);
    let result = binarize(&data, &dish, &BinarizerConfig::default());

    for ((_, col), &v) in result.mask.indexed_iter() {
        if col >= 30 {
            assert!(!v);
        }
    }
}

#[test]
fn test_binarize_empty_dish_mask() {
    let data = block_image(20, 200);
    let dish = Array2::from_elem((40, 40), false);
    let result = binarize(&data, &dish, &BinarizerConfig::default());

    assert!(result.mask.iter().all(|&v| !v));
    assert_eq!(result.foreground_ratio, 0.0);
}

#[test]
fn test_binarize_uniform_dish_has_no_foreground() {
    let data = Array2::from_elem((40, 40), 128u8);
    let result = binarize(&data, &full_mask(), &BinarizerConfig::default());
    assert!(result.mask.iter().all(|&v| !v));
}

#[test]
fn test_polarity_display() {
    assert_eq!(Polarity::Bright.to_string(), "bright");
    assert_eq!(Polarity::Dark.to_string(), "dark");
}
