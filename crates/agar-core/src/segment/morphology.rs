use ndarray::Array2;

use crate::raster::BinaryMask;

/// Offsets `(drow, dcol)` of a digital disk: `dr² + dc² <= (radius + 0.5)²`.
///
/// Radius 1 gives the full 3x3 square, radius 2 a 5x5 with the corners cut.
pub fn disk_offsets(radius: usize) -> Vec<(isize, isize)> {
    let r = radius as isize;
    let limit = (radius as f32 + 0.5).powi(2);
    let mut offsets = Vec::new();
    for dr in -r..=r {
        for dc in -r..=r {
            if ((dr * dr + dc * dc) as f32) <= limit {
                offsets.push((dr, dc));
            }
        }
    }
    offsets
}

/// Binary erosion: a pixel stays true only if every in-bounds pixel under the
/// disk is true. Out-of-bounds neighbours are ignored.
pub fn erode(mask: &BinaryMask, radius: usize) -> BinaryMask {
    if radius == 0 {
        return mask.clone();
    }
    let offsets = disk_offsets(radius);
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        mask[[row, col]]
            && offsets.iter().all(|&(dr, dc)| {
                neighbor(row, col, dr, dc, h, w).map_or(true, |(nr, nc)| mask[[nr, nc]])
            })
    })
}

/// Binary dilation: a pixel becomes true if any pixel under the disk is true.
pub fn dilate(mask: &BinaryMask, radius: usize) -> BinaryMask {
    if radius == 0 {
        return mask.clone();
    }
    let offsets = disk_offsets(radius);
    let (h, w) = mask.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        mask[[row, col]]
            || offsets.iter().any(|&(dr, dc)| {
                neighbor(row, col, dr, dc, h, w).is_some_and(|(nr, nc)| mask[[nr, nc]])
            })
    })
}

/// Repeated dilation with the same disk.
pub fn dilate_iterations(mask: &BinaryMask, radius: usize, iterations: usize) -> BinaryMask {
    let mut result = mask.clone();
    for _ in 0..iterations {
        result = dilate(&result, radius);
    }
    result
}

/// Erosion followed by dilation. Removes specks smaller than the disk.
pub fn opening(mask: &BinaryMask, radius: usize) -> BinaryMask {
    dilate(&erode(mask, radius), radius)
}

/// Dilation followed by erosion. Fills pinholes and narrow gaps.
pub fn closing(mask: &BinaryMask, radius: usize) -> BinaryMask {
    erode(&dilate(mask, radius), radius)
}

/// Speck removal then hole filling.
pub fn clean_mask(mask: &BinaryMask, open_radius: usize, close_radius: usize) -> BinaryMask {
    closing(&opening(mask, open_radius), close_radius)
}

fn neighbor(
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    h: usize,
    w: usize,
) -> Option<(usize, usize)> {
    let nr = row as isize + dr;
    let nc = col as isize + dc;
    if nr < 0 || nc < 0 || nr >= h as isize || nc >= w as isize {
        None
    } else {
        Some((nr as usize, nc as usize))
    }
}
