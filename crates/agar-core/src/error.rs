use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Configuration could not be serialized: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Analysis cancelled before stage: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, AgarError>;
