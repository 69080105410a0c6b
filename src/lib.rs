//! Image forgery and deepfake detection service.
//!
//! The crate serves one decision pipeline over HTTP: a deepfake classifier
//! gates every request, an error-level-analysis forgery classifier runs
//! behind it, and tamper-localization segmenters produce masks for images
//! the forgery stage flags. All models are ONNX sessions loaded once at
//! startup.
//!
//! Layering, bottom up:
//!
//! - [`core`]: errors, configuration, tensor aliases, ONNX session wrapper
//! - [`processors`]: image-to-tensor preprocessing stages
//! - [`models`]: classifier and segmenter adapters over loaded sessions
//! - [`pipeline`]: the sequential short-circuiting decision logic
//! - [`server`]: the axum HTTP surface
//! - [`utils`]: image decoding and mask serialization helpers

pub mod core;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod server;
pub mod utils;

/// Commonly used types, re-exported for binaries and tests.
pub mod prelude {
    pub use crate::core::config::{AppConfig, ClassifierConfig, PipelineConfig, SegmenterConfig};
    pub use crate::core::errors::{DetectError, DetectResult};
    pub use crate::models::{Classification, Classify, MaskPair, Segment};
    pub use crate::pipeline::{DetectionOutcome, DetectionPipeline, ImageAnalyzer};
    pub use crate::server::{AppState, PredictResponse};
}
