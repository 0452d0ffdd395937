use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut};
use imageproc::rect::Rect;

use crate::consts::{
    CENTROID_MARKER_RADIUS, CENTROID_MARKER_RGB, COLONY_FILL_ALPHA, COLONY_FILL_RGB,
    DISH_OUTLINE_RGB,
};
use crate::raster::{BinaryMask, Circle, MarkerMap};

use super::classify::Colony;

/// 5x7 bitmap glyphs for the digits 0-9, one byte per row, low 5 bits used.
const DIGIT_GLYPHS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const LABEL_MARGIN: u32 = 8;

/// Draw the result image: translucent fill over colony pixels, a dot at each
/// centroid, the dish outline and the colony count in the top-left corner.
pub fn annotate(
    base: &RgbImage,
    colonies: &[Colony],
    colony_mask: &BinaryMask,
    circle: Option<&Circle>,
) -> RgbImage {
    let mut out = base.clone();
    blend_mask(&mut out, colony_mask, Rgb(COLONY_FILL_RGB), COLONY_FILL_ALPHA);

    for colony in colonies {
        draw_filled_circle_mut(
            &mut out,
            (
                colony.centroid[0].round() as i32,
                colony.centroid[1].round() as i32,
            ),
            CENTROID_MARKER_RADIUS,
            Rgb(CENTROID_MARKER_RGB),
        );
    }

    if let Some(circle) = circle {
        draw_outline(&mut out, circle);
    }
    draw_count(&mut out, colonies.len());
    out
}

/// Input image with the detected dish outlined and its centre marked.
pub fn locator_preview(input: &RgbImage, circle: Option<&Circle>) -> RgbImage {
    let mut out = input.clone();
    if let Some(circle) = circle {
        draw_outline(&mut out, circle);
        draw_filled_circle_mut(
            &mut out,
            (circle.center_x.round() as i32, circle.center_y.round() as i32),
            CENTROID_MARKER_RADIUS,
            Rgb(DISH_OUTLINE_RGB),
        );
    }
    out
}

/// False-colour rendering of a marker map: background black, watershed
/// lines white, each seed label a distinct hue.
pub fn colorize_markers(markers: &MarkerMap) -> RgbImage {
    let (h, w) = markers.labels.dim();
    RgbImage::from_fn(w as u32, h as u32, |x, y| {
        match markers.labels[[y as usize, x as usize]] {
            MarkerMap::UNKNOWN => Rgb([255, 255, 255]),
            MarkerMap::BACKGROUND => Rgb([0, 0, 0]),
            label => label_color(label),
        }
    })
}

/// Alpha-blend `color` over every masked pixel.
pub fn blend_mask(image: &mut RgbImage, mask: &BinaryMask, color: Rgb<u8>, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    for ((row, col), &inside) in mask.indexed_iter() {
        if !inside || col as u32 >= image.width() || row as u32 >= image.height() {
            continue;
        }
        let pixel = image.get_pixel_mut(col as u32, row as u32);
        for (channel, &target) in pixel.0.iter_mut().zip(color.0.iter()) {
            let mixed = (1.0 - alpha) * *channel as f32 + alpha * target as f32;
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn draw_outline(image: &mut RgbImage, circle: &Circle) {
    let center = (circle.center_x.round() as i32, circle.center_y.round() as i32);
    let radius = circle.radius.round().max(1.0) as i32;
    for thickness in 0..2 {
        draw_hollow_circle_mut(image, center, radius - thickness, Rgb(DISH_OUTLINE_RGB));
    }
}

/// Render `count` with the built-in digit font on a black box.
fn draw_count(image: &mut RgbImage, count: usize) {
    let scale = (image.width().min(image.height()) / 200).max(1);
    let digits: Vec<usize> = count
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();
    let advance = (GLYPH_WIDTH + 1) * scale;
    let box_w = advance * digits.len() as u32 + scale;
    let box_h = (GLYPH_HEIGHT + 2) * scale;
    if LABEL_MARGIN + box_w > image.width() || LABEL_MARGIN + box_h > image.height() {
        return;
    }

    draw_filled_rect_mut(
        image,
        Rect::at(LABEL_MARGIN as i32, LABEL_MARGIN as i32).of_size(box_w, box_h),
        Rgb([0, 0, 0]),
    );

    let origin_y = LABEL_MARGIN + scale;
    for (i, &digit) in digits.iter().enumerate() {
        let origin_x = LABEL_MARGIN + scale + i as u32 * advance;
        for (gy, &bits) in DIGIT_GLYPHS[digit].iter().enumerate() {
            for gx in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - gx)) == 0 {
                    continue;
                }
                draw_filled_rect_mut(
                    image,
                    Rect::at(
                        (origin_x + gx * scale) as i32,
                        (origin_y + gy as u32 * scale) as i32,
                    )
                    .of_size(scale, scale),
                    Rgb([255, 255, 255]),
                );
            }
        }
    }
}

fn label_color(label: u32) -> Rgb<u8> {
    // Golden-ratio hue spacing keeps neighbouring labels apart.
    let hue = (label as f32 * 0.618_034).fract() * 6.0;
    let sector = hue.floor() as u32;
    let t = hue - hue.floor();
    let (r, g, b) = match sector {
        0 => (1.0, t, 0.0),
        1 => (1.0 - t, 1.0, 0.0),
        2 => (0.0, 1.0, t),
        3 => (0.0, 1.0 - t, 1.0),
        4 => (t, 0.0, 1.0),
        _ => (1.0, 0.0, 1.0 - t),
    };
    let scale = |v: f32| (55.0 + 200.0 * v).round() as u8;
    Rgb([scale(r), scale(g), scale(b)])
}
