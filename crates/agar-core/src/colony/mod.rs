pub mod annotate;
pub mod classify;
pub mod shape;

pub use annotate::{annotate, colorize_markers, locator_preview};
pub use classify::{
    classify_regions, ClassifierConfig, Classification, Colony, DishGeometry, Rejection,
    RejectionCounts,
};
pub use shape::{describe_region, BoundingBox, ShapeDescriptors};
