//! Model adapters wrapping loaded ONNX sessions as pure functions.
//!
//! The pipeline depends on the [`Classify`] and [`Segment`] traits rather
//! than the concrete adapters, so its decision logic is testable without
//! model files.

pub mod classifier;
pub mod segmenter;

pub use classifier::{BinaryClassifier, Classification};
pub use segmenter::{MaskPair, MaskSegmenter};

use crate::core::errors::DetectResult;
use image::RgbImage;

/// A model that maps an image to a categorical label with a probability.
pub trait Classify: Send + Sync {
    /// Classifies one image.
    fn classify(&self, image: &RgbImage) -> DetectResult<Classification>;
}

/// A model that maps an image to a tamper-probability mask pair.
pub trait Segment: Send + Sync {
    /// Segments one image.
    fn segment(&self, image: &RgbImage) -> DetectResult<MaskPair>;
}
