//! Geometric descriptors of a single labelled region.

use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{arc_length, convex_hull};
use imageproc::point::Point;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;
use crate::raster::mask_to_gray;
use crate::segment::components::{largest_component, Connectivity};

/// Inclusive pixel bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl BoundingBox {
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Clone, Debug)]
pub struct ShapeDescriptors {
    /// Pixel count.
    pub area: usize,
    /// Mean pixel position as `(x, y)`.
    pub centroid: (f64, f64),
    pub bbox: BoundingBox,
    /// Length of the closed outer contour.
    pub perimeter: f64,
    /// Area enclosed by the outer contour polygon.
    pub contour_area: f64,
    pub hull_area: f64,
    pub circularity: f64,
    pub extent: f64,
    pub solidity: f64,
    pub axis_ratio: f64,
    /// Pixels `(row, col)` the descriptors were measured on.
    pub pixels: Vec<(usize, usize)>,
}

/// Measure the largest 8-connected piece of the given pixel set.
///
/// Returns `None` for degenerate geometry: an empty set, a contour with no
/// length or no enclosed area, or a zero-area hull.
pub fn describe_region(pixels: &[(usize, usize)]) -> Option<ShapeDescriptors> {
    let (min_row, max_row, min_col, max_col) = bounds(pixels)?;

    // One pixel of padding so the contour tracer sees a closed border.
    let (crop_h, crop_w) = (max_row - min_row + 3, max_col - min_col + 3);
    let mut crop = Array2::from_elem((crop_h, crop_w), false);
    for &(row, col) in pixels {
        crop[[row - min_row + 1, col - min_col + 1]] = true;
    }
    let piece = largest_component(&crop, Connectivity::Eight);

    let kept: Vec<(usize, usize)> = piece
        .indexed_iter()
        .filter(|&(_, &v)| v)
        .map(|((r, c), _)| (r + min_row - 1, c + min_col - 1))
        .collect();
    let (top, bottom, left, right) = bounds(&kept)?;
    let bbox = BoundingBox {
        x: left,
        y: top,
        width: right - left + 1,
        height: bottom - top + 1,
    };

    let contours = find_contours::<i32>(&mask_to_gray(&piece));
    let outline = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| (polygon_area(&c.points), c))
        .max_by(|a, b| a.0.total_cmp(&b.0))?
        .1;

    let perimeter = arc_length(&outline.points, true);
    let contour_area = polygon_area(&outline.points);
    let hull_area = polygon_area(&convex_hull(outline.points.as_slice()));
    if perimeter <= EPSILON || contour_area <= EPSILON || hull_area <= EPSILON {
        return None;
    }

    let area = kept.len();
    let n = area as f64;
    let mean_x = kept.iter().map(|&(_, c)| c as f64).sum::<f64>() / n;
    let mean_y = kept.iter().map(|&(r, _)| r as f64).sum::<f64>() / n;

    Some(ShapeDescriptors {
        area,
        centroid: (mean_x, mean_y),
        bbox,
        perimeter,
        contour_area,
        hull_area,
        circularity: (4.0 * std::f64::consts::PI * contour_area / (perimeter * perimeter)).min(1.0),
        extent: n / bbox.area() as f64,
        solidity: (contour_area / hull_area).min(1.0),
        axis_ratio: axis_ratio(&kept, mean_x, mean_y),
        pixels: kept,
    })
}

/// `sqrt(λmax / λmin)` of the pixel coordinate covariance. Infinite for
/// regions with no spread along one axis.
pub fn axis_ratio(pixels: &[(usize, usize)], mean_x: f64, mean_y: f64) -> f64 {
    let n = pixels.len() as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for &(row, col) in pixels {
        let dx = col as f64 - mean_x;
        let dy = row as f64 - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let (a, c, b) = (sxx / n, syy / n, sxy / n);
    let half_trace = (a + c) / 2.0;
    let spread = (((a - c) / 2.0).powi(2) + b * b).sqrt();
    let major = half_trace + spread;
    let minor = half_trace - spread;
    if minor <= EPSILON {
        return f64::INFINITY;
    }
    (major / minor).sqrt()
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0_f64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
    }
    twice.abs() / 2.0
}

fn bounds(pixels: &[(usize, usize)]) -> Option<(usize, usize, usize, usize)> {
    let &(r0, c0) = pixels.first()?;
    Some(pixels.iter().fold(
        (r0, r0, c0, c0),
        |(min_r, max_r, min_c, max_c), &(r, c)| (min_r.min(r), max_r.max(r), min_c.min(c), max_c.max(c)),
    ))
}
