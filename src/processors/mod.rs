//! Image preprocessing for the detection models.
//!
//! # Modules
//!
//! * `ela` - Error-level-analysis derived representation
//! * `normalization` - Pixel normalization into NCHW tensors
//! * `resize` - Fixed-shape resizing for model inputs

pub mod ela;
pub mod normalization;
pub mod resize;

pub use ela::ElaTransform;
pub use normalization::NormalizeImage;
pub use resize::ResizeToInput;
