pub mod config;
pub mod hough;
pub mod locator;
pub mod mask;

pub use config::{LocatorConfig, SearchParams};
pub use locator::{locate_dish, DetectionSource, DishDetection};
pub use mask::{apply_circular_mask, mask_array};
