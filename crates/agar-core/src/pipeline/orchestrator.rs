use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use ndarray::Array2;
use tracing::{debug, info};

use crate::adjustment::ConfigAdjustment;
use crate::colony::{
    annotate, classify_regions, colorize_markers, locator_preview, ClassifierConfig, Colony,
    DishGeometry, RejectionCounts,
};
use crate::dish::{apply_circular_mask, locate_dish};
use crate::error::{AgarError, Result};
use crate::raster::{
    array_to_gray, count_foreground, ensure_non_empty, extract_channel, luminance, mask_to_gray,
    BinaryMask, Circle,
};
use crate::segment::morphology::clean_mask;
use crate::segment::{
    binarize, normalize_contrast, separate, BinarizerConfig, NormalizerConfig, SeparatorConfig,
};

use super::config::PipelineConfig;
use super::diagnostics::{DiagnosticsSink, NoopSink};
use super::types::{ColonyReport, DishAnalysis, Stage};

/// Shared flag a caller sets to abandon a run between stages.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Locate the dish, segment it and count colonies.
///
/// A missing dish is not an error: the result carries the original image,
/// no circle and no colonies.
pub fn analyze(
    image: &DynamicImage,
    config: &PipelineConfig,
    sink: &dyn DiagnosticsSink,
) -> Result<DishAnalysis> {
    analyze_cancellable(image, config, sink, None)
}

/// `analyze` with default settings and no diagnostics.
pub fn analyze_default(image: &DynamicImage) -> Result<DishAnalysis> {
    analyze(image, &PipelineConfig::default(), &NoopSink)
}

/// `analyze` that checks `cancel` before each stage and returns
/// `AgarError::Cancelled` once it is set.
pub fn analyze_cancellable(
    image: &DynamicImage,
    config: &PipelineConfig,
    sink: &dyn DiagnosticsSink,
    cancel: Option<&CancelFlag>,
) -> Result<DishAnalysis> {
    ensure_non_empty(image.width(), image.height())?;
    let (h, w) = (image.height() as usize, image.width() as usize);

    checkpoint(cancel, Stage::Input)?;
    sink.record(Stage::Input, image);
    let rgb = image.to_rgb8();

    let gray = luminance(&rgb);
    sink.record(Stage::Grayscale, &gray_image(&gray));

    checkpoint(cancel, Stage::LocatorPreview)?;
    let detection = locate_dish(&gray, &config.locator);
    sink.record(Stage::Denoised, &gray_image(&detection.denoised));
    sink.record(Stage::Equalized, &gray_image(&detection.equalized));
    let mut adjustments = detection.adjustments.clone();
    let stages = StageConfigs::sanitize(config, &mut adjustments);

    let preview = DynamicImage::ImageRgb8(locator_preview(&rgb, detection.circle.as_ref()));
    let Some(circle) = detection.circle else {
        sink.record(Stage::LocatorFailed, &preview);
        info!("No dish detected, returning the input unchanged");
        sink.record(Stage::Result, &DynamicImage::ImageRgb8(rgb.clone()));
        return Ok(DishAnalysis {
            image: rgb,
            colony_mask: Array2::from_elem((h, w), false),
            report: ColonyReport {
                circle: None,
                colonies_count: 0,
                colonies: Vec::new(),
                adjustments,
            },
            rejections: RejectionCounts::default(),
        });
    };
    sink.record(Stage::LocatorPreview, &preview);

    checkpoint(cancel, Stage::Masked)?;
    let masked = apply_circular_mask(&rgb, Some(&circle));
    sink.record(Stage::Masked, &DynamicImage::ImageRgb8(masked.clone()));

    let dish_area = count_foreground(&circle.to_mask(h, w));
    let analysis_mask = circle
        .scaled(stages.normalizer.analysis_radius_fraction)
        .to_mask(h, w);
    let outcome = Outcome {
        masked: &masked,
        circle,
        adjustments,
        sink,
    };
    if dish_area == 0 || count_foreground(&analysis_mask) == 0 {
        debug!("Dish covers no pixels");
        return Ok(outcome.empty(h, w));
    }

    checkpoint(cancel, Stage::Normalized)?;
    let channel = extract_channel(&masked, config.channel);
    let normalized = normalize_contrast(&channel, Some(&analysis_mask), &stages.normalizer);
    sink.record(Stage::Normalized, &gray_image(&normalized.image));
    if normalized.flat {
        info!(
            dynamic_range = normalized.dynamic_range,
            "Dish has no usable contrast"
        );
        return Ok(outcome.empty(h, w));
    }

    checkpoint(cancel, Stage::Binary)?;
    let binarization = binarize(&normalized.image, &analysis_mask, &stages.binarizer);
    let cleaned = clean_mask(
        &binarization.mask,
        stages.binarizer.open_radius,
        stages.binarizer.close_radius,
    );
    sink.record(Stage::Binary, &DynamicImage::ImageLuma8(mask_to_gray(&cleaned)));
    let foreground = count_foreground(&cleaned);
    info!(
        threshold = binarization.threshold,
        polarity = %binarization.polarity,
        foreground,
        "Dish binarized"
    );
    if foreground == 0 {
        return Ok(outcome.empty(h, w));
    }

    checkpoint(cancel, Stage::Markers)?;
    let separation = separate(&cleaned, &stages.separator);
    sink.record(
        Stage::Markers,
        &DynamicImage::ImageRgb8(colorize_markers(&separation.markers)),
    );

    checkpoint(cancel, Stage::Result)?;
    let classification = classify_regions(
        &separation.markers,
        &cleaned,
        &DishGeometry {
            circle,
            area: dish_area,
        },
        &stages.classifier,
    );
    info!(
        colonies = classification.colonies.len(),
        rejected = classification.rejections.total(),
        "Colonies counted"
    );
    Ok(outcome.finish(
        classification.colonies,
        classification.mask,
        classification.rejections,
    ))
}

/// Everything needed to build the result once a dish has been found.
struct Outcome<'a> {
    masked: &'a RgbImage,
    circle: Circle,
    adjustments: Vec<ConfigAdjustment>,
    sink: &'a dyn DiagnosticsSink,
}

impl Outcome<'_> {
    fn empty(self, h: usize, w: usize) -> DishAnalysis {
        self.finish(
            Vec::new(),
            Array2::from_elem((h, w), false),
            RejectionCounts::default(),
        )
    }

    fn finish(
        self,
        colonies: Vec<Colony>,
        colony_mask: BinaryMask,
        rejections: RejectionCounts,
    ) -> DishAnalysis {
        let image = annotate(self.masked, &colonies, &colony_mask, Some(&self.circle));
        self.sink
            .record(Stage::Result, &DynamicImage::ImageRgb8(image.clone()));
        DishAnalysis {
            image,
            colony_mask,
            report: ColonyReport {
                circle: Some(self.circle),
                colonies_count: colonies.len(),
                colonies,
                adjustments: self.adjustments,
            },
            rejections,
        }
    }
}

fn checkpoint(cancel: Option<&CancelFlag>, next: Stage) -> Result<()> {
    match cancel {
        Some(flag) if flag.is_cancelled() => Err(AgarError::Cancelled(next.to_string())),
        _ => Ok(()),
    }
}

/// Per-stage settings after invalid values were replaced.
struct StageConfigs {
    normalizer: NormalizerConfig,
    binarizer: BinarizerConfig,
    separator: SeparatorConfig,
    classifier: ClassifierConfig,
}

impl StageConfigs {
    fn sanitize(config: &PipelineConfig, adjustments: &mut Vec<ConfigAdjustment>) -> Self {
        let (normalizer, fixed) = config.normalizer.sanitized();
        adjustments.extend(fixed);
        let (binarizer, fixed) = config.binarizer.sanitized();
        adjustments.extend(fixed);
        let (separator, fixed) = config.separator.sanitized();
        adjustments.extend(fixed);
        let (classifier, fixed) = config.classifier.sanitized();
        adjustments.extend(fixed);
        Self {
            normalizer,
            binarizer,
            separator,
            classifier,
        }
    }
}

fn gray_image(data: &Array2<u8>) -> DynamicImage {
    DynamicImage::ImageLuma8(array_to_gray(data))
}
