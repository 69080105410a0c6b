//! Error types for the detection pipeline.
//!
//! This module defines the errors that can occur while serving a detection
//! request: image decoding, preprocessing, model loading, and inference
//! failures, plus configuration problems caught at startup. Helper
//! constructors attach context the way the rest of the crate expects it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Stage of preprocessing in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred while computing the error-level-analysis image.
    ErrorLevelAnalysis,
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred while encoding a result for transport.
    Encoding,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::ErrorLevelAnalysis => write!(f, "error-level analysis"),
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::Encoding => write!(f, "result encoding"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors produced by the detection pipeline and its supporting stages.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The uploaded bytes could not be decoded as an image.
    #[error("image decode")]
    Decode(#[source] image::ImageError),

    /// A preprocessing or encoding stage failed.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage in which the error occurred.
        stage: ProcessingStage,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A model invocation failed at runtime.
    #[error("inference failed for model '{model}': {context}")]
    Inference {
        /// Name of the model that failed.
        model: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Input that does not satisfy a contract (shape mismatch, empty data).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// A configuration value is missing or out of range.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// A model file could not be loaded into a session.
    #[error("failed to load model '{model}' from {path}")]
    ModelLoad {
        /// Name of the model that failed to load.
        model: String,
        /// Path of the model file.
        path: PathBuf,
        /// The underlying ONNX Runtime error.
        #[source]
        source: ort::Error,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor shape")]
    Tensor(#[from] ndarray::ShapeError),

    /// Error parsing a configuration file.
    #[error("config parse")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl DetectError {
    /// Creates a processing error with stage and context.
    pub fn processing(
        stage: ProcessingStage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates an inference error for the named model.
    pub fn inference(
        model: impl Into<String>,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model: model.into(),
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a model-load error for the named model and path.
    pub fn model_load(model: impl Into<String>, path: &Path, source: ort::Error) -> Self {
        Self::ModelLoad {
            model: model.into(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an invalid-input error for a tensor shape mismatch.
    pub fn shape_mismatch(model: &str, expected: &[i64], actual: &[usize]) -> Self {
        Self::InvalidInput {
            message: format!(
                "tensor shape mismatch for model '{}': expected {:?}, got {:?}",
                model, expected, actual
            ),
        }
    }
}

impl From<image::ImageError> for DetectError {
    fn from(error: image::ImageError) -> Self {
        Self::Decode(error)
    }
}

/// Convenient result alias for detection operations.
pub type DetectResult<T> = Result<T, DetectError>;

/// A lightweight string-only error used as a source where no richer error
/// type exists.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new SimpleError from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_stage_display_names() {
        assert_eq!(
            ProcessingStage::ErrorLevelAnalysis.to_string(),
            "error-level analysis"
        );
        assert_eq!(ProcessingStage::Normalization.to_string(), "normalization");
    }

    #[test]
    fn shape_mismatch_mentions_model_and_shapes() {
        let err = DetectError::shape_mismatch("deepfake", &[1, 3, 256, 256], &[1, 3, 224, 224]);
        let message = err.to_string();
        assert!(message.contains("deepfake"));
        assert!(message.contains("[1, 3, 256, 256]"));
        assert!(message.contains("[1, 3, 224, 224]"));
    }

    #[test]
    fn decode_error_converts_from_image_error() {
        let result = image::load_from_memory(b"definitely not an image");
        let err: DetectError = result.unwrap_err().into();
        assert!(matches!(err, DetectError::Decode(_)));
    }
}
