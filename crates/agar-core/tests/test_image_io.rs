use image::{Rgb, RgbImage};
use ndarray::Array2;

use agar_core::io::{decode_image, load_image, save_gray, save_mask, save_rgb};
use agar_core::AgarError;

#[test]
fn test_save_load_roundtrip_png() {
    let image = RgbImage::from_fn(6, 4, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dish.png");

    save_rgb(&image, &path).unwrap();
    let loaded = load_image(&path).unwrap();

    assert_eq!(loaded.width(), 6);
    assert_eq!(loaded.height(), 4);
    assert_eq!(loaded.to_rgb8(), image);
}

#[test]
fn test_save_gray_and_mask() {
    let dir = tempfile::tempdir().unwrap();

    let gray = Array2::from_shape_fn((3, 5), |(r, c)| (r * 5 + c) as u8);
    let gray_path = dir.path().join("gray.png");
    save_gray(&gray, &gray_path).unwrap();
    let loaded = load_image(&gray_path).unwrap().to_luma8();
    assert_eq!(loaded.get_pixel(4, 2).0[0], 14);

    let mask = Array2::from_shape_fn((3, 5), |(_, c)| c == 0);
    let mask_path = dir.path().join("mask.png");
    save_mask(&mask, &mask_path).unwrap();
    let loaded = load_image(&mask_path).unwrap().to_luma8();
    assert_eq!(loaded.get_pixel(0, 1).0[0], 255);
    assert_eq!(loaded.get_pixel(3, 1).0[0], 0);
}

#[test]
fn test_decode_encoded_bytes() {
    let image = RgbImage::from_pixel(3, 3, Rgb([1, 2, 3]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&bytes).unwrap();
    assert_eq!(decoded.to_rgb8(), image);
}

#[test]
fn test_decode_garbage_is_image_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, AgarError::Image(_)));
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_image(&dir.path().join("nope.png")).is_err());
}
