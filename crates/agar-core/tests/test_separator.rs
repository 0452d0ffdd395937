mod common;

use ndarray::Array2;

use agar_core::raster::MarkerMap;
use agar_core::segment::watershed::{flood, peak_seeds};
use agar_core::segment::{separate, SeparatorConfig};

use common::{dots_mask, Dot};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn touching_pair() -> Array2<bool> {
    dots_mask(
        60,
        60,
        &[Dot::new(20.0, 30.0, 10.0), Dot::new(38.0, 30.0, 10.0)],
    )
}

// ---------------------------------------------------------------------------
// separate
// ---------------------------------------------------------------------------

#[test]
fn test_separate_splits_touching_pair() {
    let mask = touching_pair();
    let separation = separate(&mask, &SeparatorConfig::default());
    let markers = &separation.markers;

    assert_eq!(markers.seed_count, 2);
    let left = markers.labels[[30, 20]];
    let right = markers.labels[[30, 38]];
    assert!(left >= MarkerMap::FIRST_SEED);
    assert!(right >= MarkerMap::FIRST_SEED);
    assert_ne!(left, right);
    assert_eq!(markers.labels[[0, 0]], MarkerMap::BACKGROUND);
}

#[test]
fn test_separate_regions_follow_their_disk() {
    let mask = touching_pair();
    let separation = separate(&mask, &SeparatorConfig::default());
    let labels = &separation.markers.labels;
    let left = labels[[30, 20]];
    let right = labels[[30, 38]];

    // Well inside each disk, away from the neck.
    assert_eq!(labels[[30, 12]], left);
    assert_eq!(labels[[24, 18]], left);
    assert_eq!(labels[[30, 46]], right);
    assert_eq!(labels[[36, 40]], right);
}

#[test]
fn test_separate_reports_distance() {
    let mask = touching_pair();
    let separation = separate(&mask, &SeparatorConfig::default());
    assert!(separation.max_distance >= 9.5 && separation.max_distance <= 11.5);
    assert_eq!(separation.distance.dim(), (60, 60));
    assert_eq!(separation.distance[[0, 0]], 0.0);
}

#[test]
fn test_separate_without_prominence_keeps_one_seed() {
    let mask = touching_pair();
    let config = SeparatorConfig {
        seed_prominence: 0.0,
        ..Default::default()
    };
    let separation = separate(&mask, &config);
    assert_eq!(separation.markers.seed_count, 1);
}

#[test]
fn test_separate_single_disk_one_seed() {
    let mask = dots_mask(40, 40, &[Dot::new(20.0, 20.0, 9.0)]);
    let separation = separate(&mask, &SeparatorConfig::default());
    assert_eq!(separation.markers.seed_count, 1);
    assert_eq!(separation.markers.labels[[20, 20]], MarkerMap::FIRST_SEED);
}

#[test]
fn test_separate_empty_mask_all_background() {
    let mask = Array2::from_elem((20, 30), false);
    let separation = separate(&mask, &SeparatorConfig::default());
    assert_eq!(separation.markers.seed_count, 0);
    assert!(separation
        .markers
        .labels
        .iter()
        .all(|&l| l == MarkerMap::BACKGROUND));
    assert_eq!(separation.max_distance, 0.0);
}

// ---------------------------------------------------------------------------
// peak_seeds
// ---------------------------------------------------------------------------

#[test]
fn test_peak_seeds_ignores_shallow_bump() {
    // Ridge with a main peak of 10 and a side bump of 6.5 over a saddle of 6.
    let values = [1.0, 4.0, 10.0, 7.0, 6.0, 6.5, 3.0];
    let distance = Array2::from_shape_fn((1, 7), |(_, c)| values[c]);
    let region = Array2::from_elem((1, 7), true);

    let seeds = peak_seeds(&distance, &region, 1.0);
    assert!(seeds[[0, 2]]);
    assert!(!seeds[[0, 5]]);

    let seeds = peak_seeds(&distance, &region, 0.4);
    assert!(seeds[[0, 2]]);
    assert!(seeds[[0, 5]]);
}

#[test]
fn test_peak_seeds_zero_prominence_returns_region() {
    let distance = Array2::from_elem((3, 3), 1.0f32);
    let region = Array2::from_shape_fn((3, 3), |(r, _)| r == 1);
    assert_eq!(peak_seeds(&distance, &region, 0.0), region);
}

// ---------------------------------------------------------------------------
// flood
// ---------------------------------------------------------------------------

#[test]
fn test_flood_leaves_line_between_seeds() {
    let mut labels = Array2::from_elem((1, 5), MarkerMap::UNKNOWN);
    labels[[0, 0]] = 2;
    labels[[0, 4]] = 3;
    let landscape = Array2::from_elem((1, 5), 1.0f32);

    flood(&mut labels, &landscape);
    assert_eq!(labels[[0, 1]], 2);
    assert_eq!(labels[[0, 3]], 3);
    assert_eq!(labels[[0, 2]], MarkerMap::UNKNOWN);
}

#[test]
fn test_flood_seed_wins_over_background() {
    let mut labels = Array2::from_elem((1, 3), MarkerMap::UNKNOWN);
    labels[[0, 0]] = MarkerMap::BACKGROUND;
    labels[[0, 2]] = 2;
    let landscape = Array2::from_elem((1, 3), 0.0f32);

    flood(&mut labels, &landscape);
    assert_eq!(labels[[0, 1]], 2);
}
