use ndarray::Array2;

use agar_core::filters::denoise::{denoise, DenoiseMethod};
use agar_core::filters::gaussian_blur::{gaussian_blur_array, gaussian_blur_u8, masked_gaussian_blur};
use agar_core::filters::histogram::{
    clahe, equalize, equalize_histogram, histogram, rescale_to_u8, Equalization,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn split_image(h: usize, w: usize, left: u8, right: u8) -> Array2<u8> {
    Array2::from_shape_fn((h, w), |(_, col)| if col < w / 2 { left } else { right })
}

// ---------------------------------------------------------------------------
// Gaussian blur
// ---------------------------------------------------------------------------

#[test]
fn test_gaussian_blur_zero_sigma_is_identity() {
    let data = Array2::from_shape_fn((6, 7), |(r, c)| (r * 7 + c) as f32);
    let blurred = gaussian_blur_array(&data, 0.0);
    assert_eq!(blurred, data);
}

#[test]
fn test_gaussian_blur_preserves_constant() {
    let data = Array2::from_elem((16, 16), 42.0f32);
    let blurred = gaussian_blur_array(&data, 2.5);
    for &v in blurred.iter() {
        assert!((v - 42.0).abs() < 1e-3, "expected 42, got {v}");
    }
}

#[test]
fn test_gaussian_blur_u8_smooths_step() {
    let data = split_image(10, 20, 0, 200);
    let blurred = gaussian_blur_u8(&data, 2.0);
    let left = blurred[[5, 9]];
    let right = blurred[[5, 10]];
    assert!(left > 0 && left < 200, "left of the step: {left}");
    assert!(right > 0 && right < 200, "right of the step: {right}");
    assert_eq!(blurred[[5, 0]], 0);
    assert_eq!(blurred[[5, 19]], 200);
}

#[test]
fn test_masked_blur_ignores_outside_values() {
    let mask = Array2::from_shape_fn((20, 20), |(_, col)| col < 10);
    // Huge values outside the mask must not leak in.
    let data = Array2::from_shape_fn((20, 20), |(_, col)| if col < 10 { 50.0f32 } else { 1e4 });
    let blurred = masked_gaussian_blur(&data, &mask, 3.0);

    for ((_, col), &v) in blurred.indexed_iter() {
        if col < 10 {
            assert!((v - 50.0).abs() < 1e-2, "inside value {v}");
        } else {
            assert_eq!(v, 0.0);
        }
    }
}

// ---------------------------------------------------------------------------
// Denoise
// ---------------------------------------------------------------------------

#[test]
fn test_median_removes_speck() {
    let mut data = Array2::from_elem((9, 9), 10u8);
    data[[4, 4]] = 255;
    let filtered = denoise(&data, &DenoiseMethod::Median { radius: 1 });
    assert!(filtered.iter().all(|&v| v == 10));
}

#[test]
fn test_median_zero_radius_is_identity() {
    let data = Array2::from_shape_fn((5, 5), |(r, c)| (r * 5 + c) as u8);
    assert_eq!(denoise(&data, &DenoiseMethod::Median { radius: 0 }), data);
}

#[test]
fn test_denoise_none_is_identity() {
    let data = Array2::from_shape_fn((5, 5), |(r, c)| (r + c) as u8);
    assert_eq!(denoise(&data, &DenoiseMethod::None), data);
}

// ---------------------------------------------------------------------------
// Histogram and equalization
// ---------------------------------------------------------------------------

#[test]
fn test_histogram_with_mask() {
    let data = split_image(4, 4, 3, 9);
    let mask = Array2::from_shape_fn((4, 4), |(row, _)| row < 2);

    let full = histogram(&data, None);
    assert_eq!(full[3], 8);
    assert_eq!(full[9], 8);

    let masked = histogram(&data, Some(&mask));
    assert_eq!(masked[3], 4);
    assert_eq!(masked[9], 4);
    assert_eq!(masked.iter().sum::<u64>(), 8);
}

#[test]
fn test_global_equalization_stretches_two_levels() {
    let data = split_image(8, 8, 50, 150);
    let equalized = equalize_histogram(&data);
    assert_eq!(equalized[[0, 0]], 0);
    assert_eq!(equalized[[0, 7]], 255);
}

#[test]
fn test_global_equalization_uniform_unchanged() {
    let data = Array2::from_elem((8, 8), 77u8);
    assert_eq!(equalize_histogram(&data), data);
}

#[test]
fn test_clahe_uniform_stays_uniform() {
    let data = Array2::from_elem((64, 64), 120u8);
    let out = clahe(&data, 8, 2.0);
    let first = out[[0, 0]];
    assert!(out.iter().all(|&v| v == first));
}

#[test]
fn test_clahe_keeps_ordering_across_step() {
    let data = split_image(64, 64, 60, 180);
    let out = clahe(&data, 4, 2.0);
    assert!(out[[32, 0]] < out[[32, 63]]);
}

#[test]
fn test_equalize_none_is_identity() {
    let data = split_image(6, 6, 1, 2);
    assert_eq!(equalize(&data, &Equalization::None), data);
}

// ---------------------------------------------------------------------------
// rescale_to_u8
// ---------------------------------------------------------------------------

#[test]
fn test_rescale_full_range() {
    let data = Array2::from_shape_vec((1, 3), vec![0.0f32, 5.0, 10.0]).unwrap();
    let (scaled, range) = rescale_to_u8(&data, None);
    assert!((range - 10.0).abs() < 1e-6);
    assert_eq!(scaled.as_slice().unwrap(), &[0, 128, 255]);
}

#[test]
fn test_rescale_with_mask_zeroes_outside() {
    let data = Array2::from_shape_vec((1, 4), vec![-100.0f32, 2.0, 4.0, 100.0]).unwrap();
    let mask = Array2::from_shape_vec((1, 4), vec![false, true, true, false]).unwrap();
    let (scaled, range) = rescale_to_u8(&data, Some(&mask));
    assert!((range - 2.0).abs() < 1e-6);
    assert_eq!(scaled.as_slice().unwrap(), &[0, 0, 255, 0]);
}

#[test]
fn test_rescale_constant_is_zero() {
    let data = Array2::from_elem((3, 3), 7.5f32);
    let (scaled, range) = rescale_to_u8(&data, None);
    assert_eq!(range, 0.0);
    assert!(scaled.iter().all(|&v| v == 0));
}
