//! Structured result of one pipeline run.

use crate::models::{Classification, MaskPair};

/// Masks produced by one segmentation source.
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Source name the masks are grouped under (e.g. training dataset).
    pub source: String,
    /// The probability and binary masks.
    pub masks: MaskPair,
}

/// Everything one request produced, built incrementally by the pipeline
/// and immutable once returned.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// Deepfake classification; present on every outcome.
    pub deepfake: Classification,
    /// Human-readable note set when the pipeline short-circuited.
    pub message: Option<String>,
    /// Forgery classification; absent when short-circuited.
    pub forgery: Option<Classification>,
    /// Segmentation results; empty unless the forgery label triggered them.
    pub segmentation: Vec<SegmentationResult>,
}

impl DetectionOutcome {
    /// True when the deepfake gate stopped the pipeline.
    pub fn short_circuited(&self) -> bool {
        self.message.is_some()
    }
}
