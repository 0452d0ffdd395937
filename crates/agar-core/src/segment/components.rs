use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::raster::BinaryMask;

/// Pixel adjacency used when grouping foreground pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

/// Connected-component label map. Background is 0, components are
/// `1..=count` numbered in raster order of their first pixel.
#[derive(Clone, Debug)]
pub struct Labeling {
    pub labels: Array2<u32>,
    pub count: u32,
}

/// Statistics for a single connected component.
#[derive(Clone, Debug)]
pub struct ComponentStats {
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

/// Two-pass labeling with union-find.
pub fn label_components(mask: &BinaryMask, connectivity: Connectivity) -> Labeling {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return Labeling { labels, count: 0 };
    }

    // Index 0 unused; provisional labels start at 1.
    let mut parent: Vec<u32> = vec![0];
    let mut neighbors: Vec<u32> = Vec::with_capacity(4);

    // Pass 1: provisional labels from the already-visited neighbours.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            neighbors.clear();
            if row > 0 {
                neighbors.push(labels[[row - 1, col]]);
                if connectivity == Connectivity::Eight {
                    if col > 0 {
                        neighbors.push(labels[[row - 1, col - 1]]);
                    }
                    if col + 1 < w {
                        neighbors.push(labels[[row - 1, col + 1]]);
                    }
                }
            }
            if col > 0 {
                neighbors.push(labels[[row, col - 1]]);
            }
            neighbors.retain(|&l| l > 0);

            match neighbors.iter().copied().min() {
                None => {
                    let next = parent.len() as u32;
                    parent.push(next);
                    labels[[row, col]] = next;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in &neighbors {
                        if other != smallest {
                            union(&mut parent, smallest, other);
                        }
                    }
                }
            }
        }
    }

    // Pass 2: resolve roots and renumber in raster order.
    let mut compact = vec![0u32; parent.len()];
    let mut count = 0u32;
    for label in labels.iter_mut() {
        if *label == 0 {
            continue;
        }
        let root = find(&parent, *label) as usize;
        if compact[root] == 0 {
            count += 1;
            compact[root] = count;
        }
        *label = compact[root];
    }

    Labeling { labels, count }
}

/// Area and bounding box per component, indexed by `label - 1`.
pub fn component_stats(labeling: &Labeling) -> Vec<ComponentStats> {
    let mut stats: Vec<Option<ComponentStats>> = vec![None; labeling.count as usize];
    for ((row, col), &label) in labeling.labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let entry = stats[label as usize - 1].get_or_insert(ComponentStats {
            label,
            area: 0,
            bbox: (row, row, col, col),
        });
        entry.area += 1;
        entry.bbox.0 = entry.bbox.0.min(row);
        entry.bbox.1 = entry.bbox.1.max(row);
        entry.bbox.2 = entry.bbox.2.min(col);
        entry.bbox.3 = entry.bbox.3.max(col);
    }
    stats.into_iter().flatten().collect()
}

/// Keep only the largest component of `mask` (ties go to the lower label).
pub fn largest_component(mask: &BinaryMask, connectivity: Connectivity) -> BinaryMask {
    let labeling = label_components(mask, connectivity);
    let stats = component_stats(&labeling);
    let Some(best) = stats
        .iter()
        .max_by(|a, b| a.area.cmp(&b.area).then(b.label.cmp(&a.label)))
    else {
        return Array2::from_elem(mask.dim(), false);
    };
    labeling.labels.mapv(|l| l == best.label)
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
