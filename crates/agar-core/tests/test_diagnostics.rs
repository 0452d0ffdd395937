mod common;

use agar_core::pipeline::{analyze, sink_for, DiagnosticsSink, FileSink, Stage};
use agar_core::PipelineConfig;

use common::{dish_image, uniform_image, Dot};

#[test]
fn test_stage_file_stems_sort_in_pipeline_order() {
    let stages = [
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
    ];
    let stems: Vec<&str> = stages.iter().map(|s| s.file_stem()).collect();
    let mut sorted = stems.clone();
    sorted.sort();
    assert_eq!(stems, sorted);
    assert_eq!(Stage::LocatorFailed.file_stem(), "40_locator_preview_FAIL");
}

#[test]
fn test_file_sink_creates_run_directory() {
    let root = tempfile::tempdir().unwrap();
    let sink = FileSink::new(root.path()).unwrap();

    let run_dir = sink.run_dir();
    assert!(run_dir.is_dir());
    assert_eq!(run_dir.parent().unwrap(), root.path());
    let name = run_dir.file_name().unwrap().to_str().unwrap();
    assert_eq!(name.len(), 8);
    assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_file_sink_writes_png() {
    let root = tempfile::tempdir().unwrap();
    let sink = FileSink::new(root.path()).unwrap();
    sink.record(Stage::Input, &uniform_image(4, 4, 10));

    let path = sink.run_dir().join("00_input.png");
    assert!(path.exists());
    let reloaded = image::open(&path).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (4, 4));
}

#[test]
fn test_debug_run_writes_every_stage() {
    let root = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        debug_directory: Some(root.path().to_path_buf()),
        ..Default::default()
    };
    let sink = sink_for(&config).unwrap();
    analyze(
        &dish_image(&[Dot::new(130.0, 160.0, 8.5)]),
        &config,
        sink.as_ref(),
    )
    .unwrap();

    let runs: Vec<_> = std::fs::read_dir(root.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(runs.len(), 1);
    for stem in ["00_input", "40_locator_preview", "60_binary", "65_markers", "70_result"] {
        assert!(runs[0].join(format!("{stem}.png")).exists(), "missing {stem}");
    }
}

#[test]
fn test_sink_for_without_directory_writes_nothing() {
    let config = PipelineConfig::default();
    let sink = sink_for(&config).unwrap();
    // Must simply not panic.
    sink.record(Stage::Result, &uniform_image(2, 2, 0));
}
