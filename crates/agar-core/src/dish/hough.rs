//! Circle detection by gradient-directed voting.
//!
//! Every edge pixel votes for the centres that lie along its gradient line,
//! within the configured radius band, into a 2-D accumulator of `dp`-sized
//! cells. Centre peaks are then resolved to a radius by histogramming the
//! distances from the centre to all edge pixels.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use ndarray::Array2;
use tracing::debug;

use crate::raster::Circle;

use super::config::SearchParams;

/// Smoothing applied before measuring gradient directions.
const DIRECTION_SIGMA: f32 = 2.0;

/// Edge pixel with its unit gradient direction.
#[derive(Clone, Copy, Debug)]
pub struct EdgePoint {
    pub x: f32,
    pub y: f32,
    pub ux: f32,
    pub uy: f32,
}

/// A circle hypothesis with the evidence behind it.
#[derive(Clone, Copy, Debug)]
pub struct CircleVote {
    pub circle: Circle,
    /// Accumulator votes in the 3x3 cells around the centre.
    pub votes: u32,
    /// Edge pixels within one pixel of the chosen radius.
    pub support: u32,
}

/// Canny edge pixels of `image` with their Sobel gradient directions.
///
/// Directions are measured on a Gaussian-smoothed copy of the image.
pub fn collect_edge_points(image: &GrayImage, low: f32, high: f32) -> Vec<EdgePoint> {
    let edges = canny(image, low, high);
    let smoothed = gaussian_blur_f32(image, DIRECTION_SIGMA);
    let gx = horizontal_sobel(&smoothed);
    let gy = vertical_sobel(&smoothed);

    let mut points = Vec::new();
    for (x, y, pixel) in edges.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        let dx = gx.get_pixel(x, y).0[0] as f32;
        let dy = gy.get_pixel(x, y).0[0] as f32;
        let mag = (dx * dx + dy * dy).sqrt();
        if mag < 1e-3 {
            continue;
        }
        points.push(EdgePoint {
            x: x as f32,
            y: y as f32,
            ux: dx / mag,
            uy: dy / mag,
        });
    }
    points
}

/// Accumulate centre votes for every edge point along both gradient directions.
pub fn accumulate_centers(
    points: &[EdgePoint],
    height: usize,
    width: usize,
    params: &SearchParams,
) -> Array2<u32> {
    let dp = params.dp;
    let acc_h = (height as f32 / dp).ceil() as usize;
    let acc_w = (width as f32 / dp).ceil() as usize;
    let mut acc = Array2::<u32>::zeros((acc_h, acc_w));

    let r_min = params.min_radius as f32;
    let r_max = params.max_radius as f32;

    for p in points {
        for sign in [1.0f32, -1.0] {
            let mut last_cell = None;
            let mut r = r_min;
            while r <= r_max {
                let cx = p.x + sign * p.ux * r;
                let cy = p.y + sign * p.uy * r;
                r += dp;
                if cx < 0.0 || cy < 0.0 {
                    continue;
                }
                let ax = (cx / dp) as usize;
                let ay = (cy / dp) as usize;
                if ax >= acc_w || ay >= acc_h {
                    continue;
                }
                // A line may revisit the same cell on consecutive steps.
                if last_cell == Some((ay, ax)) {
                    continue;
                }
                last_cell = Some((ay, ax));
                acc[[ay, ax]] += 1;
            }
        }
    }
    acc
}

/// Local accumulator maxima whose 3x3 neighbourhood holds at least
/// `threshold` votes, strongest first.
fn center_candidates(acc: &Array2<u32>, threshold: u32) -> Vec<(usize, usize, u32)> {
    let (h, w) = acc.dim();
    let mut candidates = Vec::new();
    for row in 0..h {
        for col in 0..w {
            let v = acc[[row, col]];
            if v == 0 {
                continue;
            }
            // Strict against earlier neighbours, non-strict against later ones,
            // so a plateau yields exactly one candidate.
            let left = col > 0 && acc[[row, col - 1]] >= v;
            let up = row > 0 && acc[[row - 1, col]] >= v;
            let right = col + 1 < w && acc[[row, col + 1]] > v;
            let down = row + 1 < h && acc[[row + 1, col]] > v;
            if left || up || right || down {
                continue;
            }
            let score = neighbourhood_votes(acc, row, col);
            if score >= threshold {
                candidates.push((row, col, score));
            }
        }
    }
    candidates.sort_by(|a, b| b.2.cmp(&a.2).then((a.0, a.1).cmp(&(b.0, b.1))));
    candidates
}

fn neighbourhood_votes(acc: &Array2<u32>, row: usize, col: usize) -> u32 {
    let (h, w) = acc.dim();
    let mut total = 0;
    for r in row.saturating_sub(1)..=(row + 1).min(h - 1) {
        for c in col.saturating_sub(1)..=(col + 1).min(w - 1) {
            total += acc[[r, c]];
        }
    }
    total
}

/// Vote-weighted centre of the 3x3 cell neighbourhood, in pixel coordinates.
fn refine_center(acc: &Array2<u32>, row: usize, col: usize, dp: f32) -> (f32, f32) {
    let (h, w) = acc.dim();
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut total = 0.0f64;
    for r in row.saturating_sub(1)..=(row + 1).min(h - 1) {
        for c in col.saturating_sub(1)..=(col + 1).min(w - 1) {
            let v = acc[[r, c]] as f64;
            sum_x += (c as f64 + 0.5) * v;
            sum_y += (r as f64 + 0.5) * v;
            total += v;
        }
    }
    if total == 0.0 {
        return ((col as f32 + 0.5) * dp, (row as f32 + 0.5) * dp);
    }
    (
        (sum_x / total) as f32 * dp,
        (sum_y / total) as f32 * dp,
    )
}

/// Radius with the most edge support around `(cx, cy)`, using a 3-bin window.
///
/// Returns `(radius, support)`.
fn estimate_radius(points: &[EdgePoint], cx: f32, cy: f32, params: &SearchParams) -> (f32, u32) {
    let bins = params.max_radius + 2;
    let mut hist = vec![0u32; bins];
    for p in points {
        let d = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt().round() as usize;
        if d >= params.min_radius && d <= params.max_radius {
            hist[d] += 1;
        }
    }

    let mut best_support = 0u32;
    let mut best_radius = params.min_radius as f32;
    for center in params.min_radius..=params.max_radius {
        let lo = center.saturating_sub(1).max(params.min_radius);
        let hi = (center + 1).min(params.max_radius);
        let support: u32 = hist[lo..=hi].iter().sum();
        if support > best_support {
            let weighted: f64 = (lo..=hi).map(|r| r as f64 * hist[r] as f64).sum();
            best_support = support;
            best_radius = (weighted / support as f64) as f32;
        }
    }
    (best_radius, best_support)
}

/// Detect up to `max_circles` circles, strongest accumulator peak first.
///
/// A centre closer than `min_dist` to an already accepted circle is skipped;
/// a centre whose best radius has fewer than `vote_threshold` supporting edge
/// pixels is rejected.
pub fn detect_circles(
    points: &[EdgePoint],
    height: usize,
    width: usize,
    params: &SearchParams,
    vote_threshold: u32,
    max_circles: usize,
) -> Vec<CircleVote> {
    if points.is_empty() || height == 0 || width == 0 || max_circles == 0 {
        return Vec::new();
    }

    let acc = accumulate_centers(points, height, width, params);
    let candidates = center_candidates(&acc, vote_threshold);
    debug!(
        edge_points = points.len(),
        candidates = candidates.len(),
        vote_threshold,
        "Circle accumulator built"
    );

    let mut accepted: Vec<CircleVote> = Vec::new();
    for (row, col, votes) in candidates {
        let (cx, cy) = refine_center(&acc, row, col, params.dp);
        if cx >= width as f32 || cy >= height as f32 {
            continue;
        }
        let too_close = accepted.iter().any(|c| {
            let dx = c.circle.center_x - cx;
            let dy = c.circle.center_y - cy;
            (dx * dx + dy * dy).sqrt() < params.min_dist
        });
        if too_close {
            continue;
        }

        let (radius, support) = estimate_radius(points, cx, cy, params);
        if support < vote_threshold || radius <= 0.0 {
            continue;
        }

        accepted.push(CircleVote {
            circle: Circle::new(cx, cy, radius),
            votes,
            support,
        });
        if accepted.len() >= max_circles {
            break;
        }
    }
    accepted
}
