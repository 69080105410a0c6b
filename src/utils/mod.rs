//! Small helpers shared across the pipeline and the HTTP layer.

pub mod image;
pub mod mask;

pub use image::decode_rgb;
pub use mask::mask_to_png_base64;
