mod common;

use agar_core::colony::ClassifierConfig;
use agar_core::pipeline::{
    analyze, analyze_cancellable, analyze_default, CancelFlag, NoopSink, Stage,
};
use agar_core::{AgarError, ColonyReport, PipelineConfig};

use common::{
    dish_image, uniform_image, Dot, RecordingSink, DISH_CENTER, DISH_RADIUS, SIZE,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn single_colony() -> Vec<Dot> {
    vec![Dot::new(130.0, 160.0, 8.5)]
}

// ---------------------------------------------------------------------------
// No dish
// ---------------------------------------------------------------------------

#[test]
fn test_uniform_image_has_no_dish() {
    let image = uniform_image(SIZE, SIZE, 128);
    let analysis = analyze_default(&image).unwrap();

    assert!(!analysis.dish_found());
    assert!(analysis.report.circle.is_none());
    assert_eq!(analysis.colonies_count(), 0);
    assert!(analysis.report.colonies.is_empty());
    assert_eq!(analysis.image, image.to_rgb8());
    assert!(analysis.colony_mask.iter().all(|&v| !v));
}

#[test]
fn test_no_dish_stage_order() {
    let sink = RecordingSink::default();
    let image = uniform_image(200, 200, 90);
    analyze(&image, &PipelineConfig::default(), &sink).unwrap();

    assert_eq!(
        sink.recorded(),
        vec![
            Stage::Input,
            Stage::Grayscale,
            Stage::Denoised,
            Stage::Equalized,
            Stage::LocatorFailed,
            Stage::Result,
        ]
    );
}

// ---------------------------------------------------------------------------
// Dish with colonies
// ---------------------------------------------------------------------------

#[test]
fn test_empty_dish_counts_zero() {
    let analysis = analyze_default(&dish_image(&[])).unwrap();

    let circle = analysis.report.circle.expect("dish should be found");
    assert!((circle.radius - DISH_RADIUS).abs() <= 3.0);
    assert_eq!(analysis.colonies_count(), 0);
}

#[test]
fn test_single_colony_counted() {
    let analysis = analyze_default(&dish_image(&single_colony())).unwrap();

    let circle = analysis.report.circle.expect("dish should be found");
    assert!((circle.center_x - DISH_CENTER.0).abs() <= 3.0);
    assert!((circle.center_y - DISH_CENTER.1).abs() <= 3.0);

    assert_eq!(analysis.colonies_count(), 1);
    let colony = &analysis.report.colonies[0];
    assert!((colony.centroid[0] - 130.0).abs() < 2.0, "x {}", colony.centroid[0]);
    assert!((colony.centroid[1] - 160.0).abs() < 2.0, "y {}", colony.centroid[1]);
    assert!(colony.area > 150 && colony.area < 320, "area {}", colony.area);
    assert!(analysis.colony_mask[[160, 130]]);
}

#[test]
fn test_accepted_colonies_respect_bounds() {
    let dots = [
        Dot::new(130.0, 160.0, 8.5),
        Dot::new(180.0, 130.0, 6.0),
        Dot::new(110.0, 110.0, 7.0),
    ];
    let config = PipelineConfig::default();
    let analysis = analyze(&dish_image(&dots), &config, &NoopSink).unwrap();
    let circle = analysis.report.circle.expect("dish should be found");
    let dish_area = std::f64::consts::PI * (circle.radius as f64).powi(2);

    assert!(analysis.colonies_count() > 0);
    for colony in &analysis.report.colonies {
        let area = colony.area as f64;
        // Pixel-count dish area differs from pi*r^2 by a few percent.
        assert!(area >= config.classifier.min_area_ratio * dish_area * 0.95);
        assert!(area <= config.classifier.max_area_ratio * dish_area * 1.05);
        assert!(colony.circularity > 0.0 && colony.circularity <= 1.0);
        let dx = colony.centroid[0] - circle.center_x as f64;
        let dy = colony.centroid[1] - circle.center_y as f64;
        assert!((dx * dx + dy * dy).sqrt() <= 0.9 * circle.radius as f64);
    }
}

#[test]
fn test_result_image_is_masked_and_annotated() {
    let image = dish_image(&single_colony());
    let analysis = analyze_default(&image).unwrap();

    assert_eq!(analysis.image.dimensions(), (SIZE, SIZE));
    // Outside the dish everything is blacked out.
    assert_eq!(analysis.image.get_pixel(SIZE - 2, SIZE - 2).0, [0, 0, 0]);
    // Centroid marker.
    assert_eq!(analysis.image.get_pixel(130, 160).0, [255, 0, 0]);
}

#[test]
fn test_touching_colonies_are_separated() {
    let dots = [Dot::new(140.0, 150.0, 8.0), Dot::new(152.0, 150.0, 8.0)];
    let analysis = analyze_default(&dish_image(&dots)).unwrap();

    assert_eq!(analysis.colonies_count(), 2);
    let mut xs: Vec<f64> = analysis
        .report
        .colonies
        .iter()
        .map(|c| c.centroid[0])
        .collect();
    xs.sort_by(f64::total_cmp);
    assert!(xs[0] < 146.0 && xs[1] > 146.0, "centroids {xs:?}");
}

#[test]
fn test_small_region_rejected_by_area() {
    let dots = [Dot::new(130.0, 160.0, 8.5), Dot::new(180.0, 130.0, 5.0)];
    let config = PipelineConfig {
        classifier: ClassifierConfig {
            min_area_ratio: 0.003,
            ..Default::default()
        },
        ..Default::default()
    };
    let analysis = analyze(&dish_image(&dots), &config, &NoopSink).unwrap();

    assert_eq!(analysis.colonies_count(), 1);
    assert!(analysis.rejections.too_small >= 1);
    let colony = &analysis.report.colonies[0];
    assert!((colony.centroid[0] - 130.0).abs() < 2.0);
}

#[test]
fn test_dish_found_stage_order() {
    let sink = RecordingSink::default();
    analyze(&dish_image(&single_colony()), &PipelineConfig::default(), &sink).unwrap();

    assert_eq!(
        sink.recorded(),
        vec![
            Stage::Input,
            Stage::Grayscale,
            Stage::Denoised,
            Stage::Equalized,
            Stage::LocatorPreview,
            Stage::Masked,
            Stage::Normalized,
            Stage::Binary,
            Stage::Markers,
            Stage::Result,
        ]
    );
}

#[test]
fn test_report_serializes_to_json() {
    let analysis = analyze_default(&dish_image(&single_colony())).unwrap();
    let json = serde_json::to_string(&analysis.report).unwrap();
    assert!(json.contains("\"colonies_count\":1"));

    let back: ColonyReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.colonies_count, 1);
    assert_eq!(back.colonies[0].label, analysis.report.colonies[0].label);
    assert!(back.circle.is_some());
}

// ---------------------------------------------------------------------------
// Invalid input and configuration
// ---------------------------------------------------------------------------

#[test]
fn test_zero_size_image_is_rejected() {
    let image = uniform_image(0, 0, 0);
    let err = analyze_default(&image).unwrap_err();
    assert!(matches!(err, AgarError::InvalidDimensions { .. }));
}

#[test]
fn test_invalid_analysis_fraction_is_corrected() {
    let mut config = PipelineConfig::default();
    config.normalizer.analysis_radius_fraction = 1.5;
    let analysis = analyze(&dish_image(&single_colony()), &config, &NoopSink).unwrap();

    assert!(analysis
        .report
        .adjustments
        .iter()
        .any(|a| a.option == "normalizer.analysis_radius_fraction"));
    assert!(analysis.dish_found());
}

#[test]
fn test_nan_foreground_fraction_is_corrected() {
    let mut config = PipelineConfig::default();
    config.separator.foreground_fraction = f32::NAN;
    let analysis = analyze(&dish_image(&single_colony()), &config, &NoopSink).unwrap();

    assert!(analysis
        .report
        .adjustments
        .iter()
        .any(|a| a.option == "separator.foreground_fraction"));
    assert_eq!(analysis.colonies_count(), 1);
}

#[test]
fn test_stage_adjustments_reported_without_dish() {
    let mut config = PipelineConfig::default();
    config.binarizer.max_foreground_ratio = f32::NAN;
    let analysis = analyze(&uniform_image(SIZE, SIZE, 128), &config, &NoopSink).unwrap();

    assert!(!analysis.dish_found());
    assert!(analysis
        .report
        .adjustments
        .iter()
        .any(|a| a.option == "binarizer.max_foreground_ratio"));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn test_cancelled_before_start() {
    let flag = CancelFlag::new();
    flag.cancel();
    let err = analyze_cancellable(
        &dish_image(&[]),
        &PipelineConfig::default(),
        &NoopSink,
        Some(&flag),
    )
    .unwrap_err();
    assert!(matches!(err, AgarError::Cancelled(_)));
}

#[test]
fn test_uncancelled_flag_runs_to_completion() {
    let flag = CancelFlag::new();
    let analysis = analyze_cancellable(
        &dish_image(&single_colony()),
        &PipelineConfig::default(),
        &NoopSink,
        Some(&flag),
    )
    .unwrap();
    assert!(!flag.is_cancelled());
    assert_eq!(analysis.colonies_count(), 1);
}
