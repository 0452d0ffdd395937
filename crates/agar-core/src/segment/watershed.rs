use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use ndarray::Array2;
use tracing::debug;

use crate::raster::{BinaryMask, MarkerMap};

use super::components::{label_components, Connectivity};
use super::config::SeparatorConfig;
use super::distance::euclidean_distance_transform;
use super::morphology::dilate_iterations;

const UNVISITED: usize = usize::MAX;

const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Output of the touching-colony separator.
#[derive(Clone, Debug)]
pub struct Separation {
    pub markers: MarkerMap,
    pub distance: Array2<f32>,
    pub max_distance: f32,
}

/// Split touching blobs of `mask` into individual regions.
///
/// Seeds come from the distance transform: sure foreground is every pixel
/// deeper than `foreground_fraction` of the maximum depth, and each distance
/// peak that rises at least `seed_prominence` above the saddle joining it to a
/// higher peak gets its own seed. Everything outside a dilation of the mask is
/// sure background. The remaining pixels are flooded from the seeds over the
/// inverted distance landscape.
pub fn separate(mask: &BinaryMask, config: &SeparatorConfig) -> Separation {
    let (h, w) = mask.dim();
    let distance = euclidean_distance_transform(mask);
    let max_distance = distance.iter().copied().fold(0.0_f32, f32::max);

    if max_distance <= 0.0 {
        return Separation {
            markers: MarkerMap::all_background(h, w),
            distance,
            max_distance,
        };
    }

    let cutoff = config.foreground_fraction * max_distance;
    let sure_foreground = distance.mapv(|d| d > cutoff);
    let seeds = peak_seeds(&distance, &sure_foreground, config.seed_prominence);
    let seed_labels = label_components(&seeds, Connectivity::Eight);

    let unknown_zone = dilate_iterations(
        mask,
        config.background_dilation_radius,
        config.background_dilation_iterations,
    );

    let mut labels = Array2::from_shape_fn((h, w), |(row, col)| {
        let seed = seed_labels.labels[[row, col]];
        if seed > 0 {
            seed + MarkerMap::FIRST_SEED - 1
        } else if unknown_zone[[row, col]] {
            MarkerMap::UNKNOWN
        } else {
            MarkerMap::BACKGROUND
        }
    });

    let landscape = distance.mapv(|d| max_distance - d);
    flood(&mut labels, &landscape);

    debug!(
        seeds = seed_labels.count,
        max_distance, "Separated touching regions"
    );
    Separation {
        markers: MarkerMap {
            labels,
            seed_count: seed_labels.count,
        },
        distance,
        max_distance,
    }
}

/// Regional maxima of `distance` inside `region` with at least `prominence`
/// of relief, each grown to the pixels within `prominence` of its peak.
///
/// Components are merged from the highest level down; when two meet, the
/// one with the lower peak keeps a seed only if its peak stands at least
/// `prominence` above the merge level. Each connected region keeps its
/// global maximum. With `prominence <= 0` the region itself is returned.
pub fn peak_seeds(distance: &Array2<f32>, region: &BinaryMask, prominence: f32) -> BinaryMask {
    if prominence <= 0.0 {
        return region.clone();
    }
    let (h, w) = distance.dim();
    let value = |i: usize| distance[[i / w, i % w]];

    let mut order: Vec<usize> = (0..h * w).filter(|&i| region[[i / w, i % w]]).collect();
    order.sort_by(|&a, &b| value(b).total_cmp(&value(a)).then(a.cmp(&b)));

    let mut parent = vec![UNVISITED; h * w];
    let mut peak = vec![0usize; h * w];
    let mut keepers: Vec<usize> = Vec::new();
    let mut roots: Vec<usize> = Vec::with_capacity(8);

    for &p in &order {
        let level = value(p);
        parent[p] = p;
        peak[p] = p;

        roots.clear();
        for (nr, nc) in neighbors(p / w, p % w, h, w, &NEIGHBORS_8) {
            let n = nr * w + nc;
            if parent[n] != UNVISITED {
                roots.push(find_root(&mut parent, n));
            }
        }
        roots.sort_unstable();
        roots.dedup();
        roots.retain(|&r| r != p);

        let Some(main) = roots.iter().copied().max_by(|&a, &b| {
            value(peak[a])
                .total_cmp(&value(peak[b]))
                .then(peak[b].cmp(&peak[a]))
        }) else {
            continue;
        };

        for &r in &roots {
            if r != main {
                if value(peak[r]) - level >= prominence {
                    keepers.push(peak[r]);
                }
                parent[r] = main;
            }
        }
        parent[p] = main;
    }

    for &p in &order {
        if parent[p] == p {
            keepers.push(peak[p]);
        }
    }

    let mut seeds = Array2::from_elem((h, w), false);
    let mut queue = VecDeque::new();
    for &apex in &keepers {
        let floor = value(apex) - prominence;
        let start = (apex / w, apex % w);
        if seeds[start] {
            continue;
        }
        seeds[start] = true;
        queue.push_back(start);
        while let Some((row, col)) = queue.pop_front() {
            for (nr, nc) in neighbors(row, col, h, w, &NEIGHBORS_8) {
                if region[[nr, nc]] && !seeds[[nr, nc]] && distance[[nr, nc]] > floor {
                    seeds[[nr, nc]] = true;
                    queue.push_back((nr, nc));
                }
            }
        }
    }
    seeds
}

/// Flood entry ordered so that `BinaryHeap` pops the lowest level first,
/// breaking ties by insertion order.
struct FloodItem {
    level: f32,
    seq: u64,
    row: usize,
    col: usize,
}

impl PartialEq for FloodItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloodItem {}

impl PartialOrd for FloodItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloodItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .level
            .total_cmp(&self.level)
            .then(other.seq.cmp(&self.seq))
    }
}

/// Priority flood of `UNKNOWN` pixels from every labelled pixel.
///
/// A pixel adjacent to two different seed labels stays `UNKNOWN` and acts as
/// a watershed line; a seed label wins over `BACKGROUND`.
pub fn flood(labels: &mut Array2<u32>, landscape: &Array2<f32>) {
    let (h, w) = labels.dim();
    let mut queued = Array2::from_elem((h, w), false);
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;

    let mut enqueue = |heap: &mut BinaryHeap<FloodItem>,
                       queued: &mut Array2<bool>,
                       labels: &Array2<u32>,
                       row: usize,
                       col: usize| {
        for (nr, nc) in neighbors(row, col, h, w, &NEIGHBORS_4) {
            if labels[[nr, nc]] == MarkerMap::UNKNOWN && !queued[[nr, nc]] {
                queued[[nr, nc]] = true;
                heap.push(FloodItem {
                    level: landscape[[nr, nc]],
                    seq,
                    row: nr,
                    col: nc,
                });
                seq += 1;
            }
        }
    };

    for row in 0..h {
        for col in 0..w {
            if labels[[row, col]] != MarkerMap::UNKNOWN {
                enqueue(&mut heap, &mut queued, labels, row, col);
            }
        }
    }

    while let Some(item) = heap.pop() {
        let (row, col) = (item.row, item.col);
        let mut seed: Option<u32> = None;
        let mut conflict = false;
        let mut touches_background = false;
        for (nr, nc) in neighbors(row, col, h, w, &NEIGHBORS_4) {
            match labels[[nr, nc]] {
                MarkerMap::UNKNOWN => {}
                MarkerMap::BACKGROUND => touches_background = true,
                label => match seed {
                    None => seed = Some(label),
                    Some(existing) if existing != label => conflict = true,
                    Some(_) => {}
                },
            }
        }

        if conflict {
            continue;
        }
        let label = match seed {
            Some(label) => label,
            None if touches_background => MarkerMap::BACKGROUND,
            None => continue,
        };
        labels[[row, col]] = label;
        enqueue(&mut heap, &mut queued, labels, row, col);
    }
}

fn find_root(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn neighbors<'a>(
    row: usize,
    col: usize,
    h: usize,
    w: usize,
    offsets: &'a [(isize, isize)],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    offsets.iter().filter_map(move |&(dr, dc)| {
        let nr = row as isize + dr;
        let nc = col as isize + dc;
        (nr >= 0 && nc >= 0 && nr < h as isize && nc < w as isize)
            .then(|| (nr as usize, nc as usize))
    })
}
