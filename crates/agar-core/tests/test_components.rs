use ndarray::Array2;

use agar_core::segment::components::{
    component_stats, label_components, largest_component, Connectivity,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mask_from(rows: &[&str]) -> Array2<bool> {
    let h = rows.len();
    let w = rows[0].len();
    Array2::from_shape_fn((h, w), |(r, c)| rows[r].as_bytes()[c] == b'#')
}

// ---------------------------------------------------------------------------
// Labeling
// ---------------------------------------------------------------------------

#[test]
fn test_label_two_separate_blobs() {
    let mask = mask_from(&[
        "##....", //
        "##....",
        "......",
        "...###",
    ]);
    let labeling = label_components(&mask, Connectivity::Eight);

    assert_eq!(labeling.count, 2);
    assert_eq!(labeling.labels[[0, 0]], 1);
    assert_eq!(labeling.labels[[1, 1]], 1);
    assert_eq!(labeling.labels[[3, 5]], 2);
    assert_eq!(labeling.labels[[2, 2]], 0);
}

#[test]
fn test_diagonal_touch_depends_on_connectivity() {
    let mask = mask_from(&[
        "#..", //
        ".#.",
        "..#",
    ]);
    assert_eq!(label_components(&mask, Connectivity::Four).count, 3);
    assert_eq!(label_components(&mask, Connectivity::Eight).count, 1);
}

#[test]
fn test_u_shape_merges_into_one_label() {
    let mask = mask_from(&[
        "#...#", //
        "#...#",
        "#####",
    ]);
    let labeling = label_components(&mask, Connectivity::Four);
    assert_eq!(labeling.count, 1);
    assert!(labeling.labels.iter().all(|&l| l <= 1));
}

#[test]
fn test_label_empty_mask() {
    let mask = Array2::from_elem((4, 4), false);
    let labeling = label_components(&mask, Connectivity::Eight);
    assert_eq!(labeling.count, 0);
    assert!(component_stats(&labeling).is_empty());
}

// ---------------------------------------------------------------------------
// Stats and largest component
// ---------------------------------------------------------------------------

#[test]
fn test_component_stats_area_and_bbox() {
    let mask = mask_from(&[
        "##....", //
        "##....",
        "......",
        "...###",
    ]);
    let stats = component_stats(&label_components(&mask, Connectivity::Eight));

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].label, 1);
    assert_eq!(stats[0].area, 4);
    assert_eq!(stats[0].bbox, (0, 1, 0, 1));
    assert_eq!(stats[1].area, 3);
    assert_eq!(stats[1].bbox, (3, 3, 3, 5));
}

#[test]
fn test_largest_component_keeps_biggest() {
    let mask = mask_from(&[
        "#.....", //
        "......",
        "..####",
        "..####",
    ]);
    let largest = largest_component(&mask, Connectivity::Eight);
    assert!(!largest[[0, 0]]);
    assert!(largest[[2, 2]] && largest[[3, 5]]);
    assert_eq!(largest.iter().filter(|&&v| v).count(), 8);
}

#[test]
fn test_largest_component_of_empty_mask() {
    let mask = Array2::from_elem((3, 3), false);
    assert!(largest_component(&mask, Connectivity::Four).iter().all(|&v| !v));
}
