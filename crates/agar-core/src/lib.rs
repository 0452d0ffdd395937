pub mod adjustment;
pub mod colony;
pub mod consts;
pub mod dish;
pub mod error;
pub mod filters;
pub mod io;
pub mod pipeline;
pub mod raster;
pub mod segment;

pub use adjustment::ConfigAdjustment;
pub use error::{AgarError, Result};
pub use pipeline::{analyze, analyze_cancellable, ColonyReport, DishAnalysis, PipelineConfig};
pub use raster::{BinaryMask, Circle, MarkerMap, SegmentationChannel};
