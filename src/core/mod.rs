//! Core building blocks of the detection service.
//!
//! This module contains:
//! - Configuration management
//! - Error handling
//! - ONNX Runtime inference engine integration
//! - Tensor type aliases
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod tensor;

pub use config::{
    AppConfig, ClassifierConfig, Device, ElaConfig, LabelRule, OrtSessionConfig, PipelineConfig,
    SegmenterConfig, ServerConfig,
};
pub use errors::{DetectError, DetectResult, ProcessingStage};
pub use inference::OnnxModel;
pub use tensor::{Tensor2D, Tensor4D};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the subscriber with an environment filter and a formatting layer.
/// Called once at the start of the binary.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    use tracing_subscriber::EnvFilter;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
