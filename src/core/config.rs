//! Configuration types for the detection service.
//!
//! Everything a deployment can vary lives here: model file paths, input
//! shapes, normalization parameters, label rules, segmentation thresholds,
//! the listener address, and ONNX Runtime session tuning. All structs
//! deserialize from JSON with full defaults, so a config file only needs to
//! state what differs from the stock four-model pipeline.

use crate::core::errors::{DetectError, DetectResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Short-circuit message returned when the deepfake classifier flags an
/// image, matching the wording the original frontends display.
pub const DEEPFAKE_SHORT_CIRCUIT_MESSAGE: &str =
    "DeepFake model flagged image as Fake. Skipping traditional forgery detection.";

/// Compute device used for all sessions, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Pick an accelerator when one is compiled in, otherwise CPU.
    #[default]
    Auto,
    /// CPU execution only.
    Cpu,
    /// NVIDIA CUDA (requires the `cuda` cargo feature).
    Cuda,
    /// Apple CoreML (requires the `coreml` cargo feature).
    CoreMl,
}

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum GraphOptLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    #[default]
    Level3,
}

/// Tuning options for ONNX Runtime sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes.
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes.
    pub inter_threads: Option<usize>,
    /// Graph optimization level.
    pub optimization_level: Option<GraphOptLevel>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: GraphOptLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }
}

/// Explicit probability-to-label mapping for one classifier.
///
/// The original model variants disagreed on which side of the threshold
/// meant "positive", so the mapping is never inferred: every classifier
/// states its threshold and both labels in config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Decision threshold in [0, 1].
    pub threshold: f32,
    /// Label assigned when probability > threshold.
    pub above: String,
    /// Label assigned when probability <= threshold.
    pub below: String,
}

impl LabelRule {
    /// Creates a rule with the given threshold and labels.
    pub fn new(threshold: f32, above: impl Into<String>, below: impl Into<String>) -> Self {
        Self {
            threshold,
            above: above.into(),
            below: below.into(),
        }
    }

    /// Maps a probability to the configured label.
    pub fn classify(&self, probability: f32) -> &str {
        if probability > self.threshold {
            &self.above
        } else {
            &self.below
        }
    }

    /// Validates the rule parameters.
    pub fn validate(&self) -> DetectResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DetectError::config(format!(
                "label rule threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        if self.above.is_empty() || self.below.is_empty() {
            return Err(DetectError::config("label rule labels must be non-empty"));
        }
        Ok(())
    }
}

/// Configuration for the error-level-analysis transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ElaConfig {
    /// JPEG re-encoding quality in 1..=100.
    pub quality: u8,
}

impl Default for ElaConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl ElaConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> DetectResult<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(DetectError::config(format!(
                "ELA quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Configuration for one binary classifier model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model name used in logs and errors.
    pub name: String,
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Expected input size as (height, width).
    pub input_size: (u32, u32),
    /// Scaling factor applied before normalization.
    pub scale: f32,
    /// Mean values for normalization (RGB order).
    pub mean: [f32; 3],
    /// Standard deviation values for normalization (RGB order).
    pub std: [f32; 3],
    /// When set, the model consumes the ELA-derived image instead of the
    /// original pixels.
    #[serde(default)]
    pub ela: Option<ElaConfig>,
    /// Probability-to-label mapping.
    pub rule: LabelRule,
}

impl ClassifierConfig {
    /// Stock configuration for the deepfake classifier: 256x256 input,
    /// plain 1/255 scaling, short-circuits on "Fake".
    pub fn deepfake_defaults() -> Self {
        Self {
            name: "deepfake".to_string(),
            model_path: PathBuf::from("models/deepfake_densenet.onnx"),
            input_size: (256, 256),
            scale: 1.0 / 255.0,
            mean: [0.0, 0.0, 0.0],
            std: [1.0, 1.0, 1.0],
            ela: None,
            rule: LabelRule::new(0.5, "Fake", "Real"),
        }
    }

    /// Stock configuration for the ELA + ResNet forgery classifier:
    /// 224x224 input, ImageNet normalization over the ELA image.
    pub fn forgery_defaults() -> Self {
        Self {
            name: "forgery".to_string(),
            model_path: PathBuf::from("models/forgery_resnet50.onnx"),
            input_size: (224, 224),
            scale: 1.0 / 255.0,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            ela: Some(ElaConfig::default()),
            rule: LabelRule::new(0.5, "Forged", "Authentic"),
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> DetectResult<()> {
        if self.name.is_empty() {
            return Err(DetectError::config("classifier name must be non-empty"));
        }
        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            return Err(DetectError::config(format!(
                "classifier '{}' input size must be non-zero",
                self.name
            )));
        }
        if self.scale <= 0.0 {
            return Err(DetectError::config(format!(
                "classifier '{}' scale must be greater than 0",
                self.name
            )));
        }
        for (i, &s) in self.std.iter().enumerate() {
            if s <= 0.0 {
                return Err(DetectError::config(format!(
                    "classifier '{}' std at index {} must be greater than 0, got {}",
                    self.name, i, s
                )));
            }
        }
        if let Some(ela) = &self.ela {
            ela.validate()?;
        }
        self.rule.validate()
    }
}

/// Configuration for one segmentation model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Source name the masks are grouped under in responses.
    pub name: String,
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Expected input size as (height, width).
    pub input_size: (u32, u32),
    /// Threshold applied to the probability mask to obtain the binary mask.
    pub mask_threshold: f32,
}

impl SegmenterConfig {
    /// Stock configuration for one tamper-localization segmenter.
    pub fn with_defaults(name: &str, model_path: &str) -> Self {
        Self {
            name: name.to_string(),
            model_path: PathBuf::from(model_path),
            input_size: (512, 512),
            mask_threshold: 0.5,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> DetectResult<()> {
        if self.name.is_empty() {
            return Err(DetectError::config("segmenter name must be non-empty"));
        }
        if self.input_size.0 == 0 || self.input_size.1 == 0 {
            return Err(DetectError::config(format!(
                "segmenter '{}' input size must be non-zero",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.mask_threshold) {
            return Err(DetectError::config(format!(
                "segmenter '{}' mask threshold must be in [0, 1], got {}",
                self.name, self.mask_threshold
            )));
        }
        Ok(())
    }
}

/// Declarative definition of the whole decision pipeline.
///
/// One pipeline, driven by configuration, replaces the original's divergent
/// per-app handler copies: the deepfake gate, the forgery gate, and the set
/// of segmenters that run behind it are all stated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Deepfake classifier run first on every request.
    pub deepfake: ClassifierConfig,
    /// Forgery classifier run when the deepfake gate passes.
    pub forgery: ClassifierConfig,
    /// Segmenters run when the forgery label equals the trigger.
    pub segmenters: Vec<SegmenterConfig>,
    /// Deepfake label that short-circuits the pipeline.
    pub short_circuit_label: String,
    /// Forgery label that triggers segmentation.
    pub segmentation_trigger: String,
    /// Message attached to short-circuited responses.
    pub short_circuit_message: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deepfake: ClassifierConfig::deepfake_defaults(),
            forgery: ClassifierConfig::forgery_defaults(),
            segmenters: vec![
                SegmenterConfig::with_defaults("casia", "models/mvssnet_casia.onnx"),
                SegmenterConfig::with_defaults("defacto", "models/mvssnet_defacto.onnx"),
            ],
            short_circuit_label: "Fake".to_string(),
            segmentation_trigger: "Forged".to_string(),
            short_circuit_message: DEEPFAKE_SHORT_CIRCUIT_MESSAGE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Validates the pipeline definition.
    pub fn validate(&self) -> DetectResult<()> {
        self.deepfake.validate()?;
        self.forgery.validate()?;
        for segmenter in &self.segmenters {
            segmenter.validate()?;
        }
        let mut names: Vec<&str> = self.segmenters.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.segmenters.len() {
            return Err(DetectError::config("segmenter names must be unique"));
        }
        if self.short_circuit_label.is_empty() || self.segmentation_trigger.is_empty() {
            return Err(DetectError::config(
                "short-circuit and segmentation-trigger labels must be non-empty",
            ));
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Compute device for all sessions.
    pub device: Device,
    /// ONNX Runtime session tuning.
    pub session: OrtSessionConfig,
    /// Decision pipeline definition.
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: &Path) -> DetectResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Validates the whole configuration.
    pub fn validate(&self) -> DetectResult<()> {
        if self.server.max_upload_bytes == 0 {
            return Err(DetectError::config("max upload size must be non-zero"));
        }
        self.pipeline.validate()
    }
}
