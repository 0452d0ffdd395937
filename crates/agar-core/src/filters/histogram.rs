use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CLAHE_CLIP_LIMIT, DEFAULT_CLAHE_TILES, HISTOGRAM_BINS};
use crate::raster::BinaryMask;

/// Contrast equalization applied before circle voting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Equalization {
    None,
    /// Global histogram equalization.
    Global,
    /// Contrast-limited adaptive histogram equalization.
    Clahe { clip_limit: f32, tiles: usize },
}

impl Default for Equalization {
    fn default() -> Self {
        Self::Clahe {
            clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
            tiles: DEFAULT_CLAHE_TILES,
        }
    }
}

impl std::fmt::Display for Equalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Global => write!(f, "Global"),
            Self::Clahe { clip_limit, tiles } => {
                write!(f, "CLAHE (clip {clip_limit}, {tiles}x{tiles} tiles)")
            }
        }
    }
}

pub fn equalize(data: &Array2<u8>, method: &Equalization) -> Array2<u8> {
    match method {
        Equalization::None => data.clone(),
        Equalization::Global => equalize_histogram(data),
        Equalization::Clahe { clip_limit, tiles } => clahe(data, *tiles, *clip_limit),
    }
}

/// Histogram of 8-bit values, optionally restricted to `mask`.
pub fn histogram(data: &Array2<u8>, mask: Option<&BinaryMask>) -> [u64; HISTOGRAM_BINS] {
    let mut hist = [0u64; HISTOGRAM_BINS];
    match mask {
        Some(mask) => {
            Zip::from(data).and(mask).for_each(|&v, &m| {
                if m {
                    hist[v as usize] += 1;
                }
            });
        }
        None => {
            for &v in data.iter() {
                hist[v as usize] += 1;
            }
        }
    }
    hist
}

/// Global histogram equalization: maps the cumulative distribution onto [0, 255].
pub fn equalize_histogram(data: &Array2<u8>) -> Array2<u8> {
    let hist = histogram(data, None);
    let total = data.len() as u64;
    let cdf_min = hist.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if total == cdf_min {
        return data.clone();
    }

    let mut lut = [0u8; HISTOGRAM_BINS];
    let mut cdf = 0u64;
    for (i, &count) in hist.iter().enumerate() {
        cdf += count;
        let mapped = (cdf.saturating_sub(cdf_min)) as f64 * 255.0 / (total - cdf_min) as f64;
        lut[i] = mapped.round().clamp(0.0, 255.0) as u8;
    }
    data.mapv(|v| lut[v as usize])
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a `tiles` x `tiles` grid; each tile gets its own
/// clipped-histogram lookup table and pixels are bilinearly interpolated
/// between the four nearest tile centres. `clip_limit` is relative to the
/// average bin height; values <= 0 disable clipping.
pub fn clahe(data: &Array2<u8>, tiles: usize, clip_limit: f32) -> Array2<u8> {
    let (h, w) = data.dim();
    if h == 0 || w == 0 || tiles == 0 {
        return data.clone();
    }

    let tile_h = h.div_ceil(tiles.min(h));
    let tile_w = w.div_ceil(tiles.min(w));
    let tiles_y = h.div_ceil(tile_h);
    let tiles_x = w.div_ceil(tile_w);

    let mut luts = vec![[0u8; HISTOGRAM_BINS]; tiles_x * tiles_y];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let y0 = ty * tile_h;
            let x0 = tx * tile_w;
            let y1 = (y0 + tile_h).min(h);
            let x1 = (x0 + tile_w).min(w);
            let tile = data.slice(ndarray::s![y0..y1, x0..x1]);

            let mut hist = [0u32; HISTOGRAM_BINS];
            for &v in tile.iter() {
                hist[v as usize] += 1;
            }
            let area = tile.len() as u32;
            if clip_limit > 0.0 {
                clip_histogram(&mut hist, area, clip_limit);
            }

            let scale = 255.0 / area as f32;
            let lut = &mut luts[ty * tiles_x + tx];
            let mut cdf = 0u32;
            for (i, &count) in hist.iter().enumerate() {
                cdf += count;
                lut[i] = (cdf as f32 * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let mut result = Array2::<u8>::zeros((h, w));
    for row in 0..h {
        let (ty0, ty1, wy) = interpolation_cell(row, tile_h, tiles_y);
        for col in 0..w {
            let (tx0, tx1, wx) = interpolation_cell(col, tile_w, tiles_x);
            let v = data[[row, col]] as usize;

            let top = luts[ty0 * tiles_x + tx0][v] as f32 * (1.0 - wx)
                + luts[ty0 * tiles_x + tx1][v] as f32 * wx;
            let bottom = luts[ty1 * tiles_x + tx0][v] as f32 * (1.0 - wx)
                + luts[ty1 * tiles_x + tx1][v] as f32 * wx;
            result[[row, col]] = (top * (1.0 - wy) + bottom * wy).round().clamp(0.0, 255.0) as u8;
        }
    }
    result
}

/// Clip bins at `clip_limit` times the mean bin height and spread the excess evenly.
fn clip_histogram(hist: &mut [u32; HISTOGRAM_BINS], area: u32, clip_limit: f32) {
    let limit = ((clip_limit * area as f32 / HISTOGRAM_BINS as f32) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let per_bin = excess / HISTOGRAM_BINS as u32;
    let residual = (excess % HISTOGRAM_BINS as u32) as usize;
    for bin in hist.iter_mut() {
        *bin += per_bin;
    }
    if residual > 0 {
        let step = (HISTOGRAM_BINS / residual).max(1);
        for bin in hist.iter_mut().step_by(step).take(residual) {
            *bin += 1;
        }
    }
}

/// Neighbouring tile indices and interpolation weight for a pixel coordinate.
fn interpolation_cell(pos: usize, tile_size: usize, tile_count: usize) -> (usize, usize, f32) {
    let f = (pos as f32 + 0.5) / tile_size as f32 - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let lower = f.floor() as usize;
    if lower >= tile_count - 1 {
        return (tile_count - 1, tile_count - 1, 0.0);
    }
    (lower, lower + 1, f - lower as f32)
}

/// Linearly rescale values inside `mask` (or everywhere) to [0, 255].
///
/// Returns the rescaled image and the input range `max - min` over the
/// considered pixels. Pixels outside the mask become 0. A zero range maps
/// everything to 0.
pub fn rescale_to_u8(data: &Array2<f32>, mask: Option<&BinaryMask>) -> (Array2<u8>, f32) {
    let inside = |idx: (usize, usize)| mask.map_or(true, |m| m[idx]);

    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for (idx, &v) in data.indexed_iter() {
        if inside(idx) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (Array2::zeros(data.dim()), 0.0);
    }

    let range = hi - lo;
    if range <= 0.0 {
        return (Array2::zeros(data.dim()), 0.0);
    }

    let scaled = Array2::from_shape_fn(data.dim(), |idx| {
        if inside(idx) {
            ((data[idx] - lo) * 255.0 / range).round().clamp(0.0, 255.0) as u8
        } else {
            0
        }
    });
    (scaled, range)
}
