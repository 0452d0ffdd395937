pub mod components;
pub mod config;
pub mod distance;
pub mod morphology;
pub mod normalize;
pub mod threshold;
pub mod watershed;

pub use config::{BinarizerConfig, NormalizerConfig, SeparatorConfig};
pub use normalize::{normalize_contrast, Normalized};
pub use threshold::{binarize, Binarization, Polarity};
pub use watershed::{separate, Separation};
