pub mod image_io;

pub use image_io::{decode_image, load_image, save_gray, save_mask, save_rgb};
