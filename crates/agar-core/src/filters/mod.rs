pub mod denoise;
pub mod gaussian_blur;
pub mod histogram;
