use std::path::PathBuf;

use agar_core::colony::locator_preview;
use agar_core::dish::locate_dish;
use agar_core::io::{load_image, save_rgb};
use agar_core::raster::luminance;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct LocateArgs {
    /// Dish photograph
    pub file: PathBuf,

    /// Pipeline config file (TOML); only the locator section is used
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Save the input with the detected circle drawn on it
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

pub fn run(args: &LocateArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;
    let image = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let rgb = image.to_rgb8();

    let detection = locate_dish(&luminance(&rgb), &config.locator);
    crate::summary::print_detection(&args.file, &detection);

    if let Some(ref path) = args.preview {
        save_rgb(&locator_preview(&rgb, detection.circle.as_ref()), path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Preview saved to {}", path.display());
    }
    Ok(())
}
