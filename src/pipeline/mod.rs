//! The decision pipeline orchestrating all model invocations.
//!
//! Execution is strictly sequential because each stage's invocation is
//! conditioned on the previous stage's categorical outcome:
//!
//! 1. deepfake classifier — its configured short-circuit label ends the
//!    request immediately with a message and nothing else;
//! 2. forgery classifier over the ELA-derived image;
//! 3. when the forgery label equals the configured trigger, every
//!    segmenter runs and contributes a mask pair under its source name.
//!
//! The two segmentation runs are independent and could execute
//! concurrently; they are kept sequential to match the serving model of
//! one synchronous request at a time. Any stage error aborts the run and
//! discards partial results.

pub mod outcome;

pub use outcome::{DetectionOutcome, SegmentationResult};

use crate::core::config::AppConfig;
use crate::core::errors::DetectResult;
use crate::models::{BinaryClassifier, Classify, MaskSegmenter, Segment};
use image::RgbImage;
use tracing::{debug, info};

/// The request-path seam: anything that can analyze one image.
///
/// The HTTP layer holds this trait object, which keeps handlers testable
/// without model files and keeps model handles out of global state.
pub trait ImageAnalyzer: Send + Sync {
    /// Runs the full decision pipeline on one image.
    fn analyze(&self, image: &RgbImage) -> DetectResult<DetectionOutcome>;
}

struct NamedSegmenter {
    name: String,
    model: Box<dyn Segment>,
}

/// All model handles plus the gate labels driving the short-circuit logic.
///
/// Constructed once at startup ("loading" phase) and shared immutably with
/// every request ("serving" phase); the two phases never interleave.
pub struct DetectionPipeline {
    deepfake: Box<dyn Classify>,
    forgery: Box<dyn Classify>,
    segmenters: Vec<NamedSegmenter>,
    short_circuit_label: String,
    segmentation_trigger: String,
    short_circuit_message: String,
}

impl DetectionPipeline {
    /// Loads every model named in the configuration and assembles the
    /// pipeline. Returns an error if any model fails to load, so the
    /// process never serves with a partial set of handles.
    pub fn from_config(config: &AppConfig) -> DetectResult<Self> {
        config.validate()?;
        let pipeline = &config.pipeline;
        info!(device = ?config.device, "initializing model sessions");

        info!(
            model = pipeline.deepfake.name,
            path = %pipeline.deepfake.model_path.display(),
            "loading deepfake classifier"
        );
        let deepfake =
            BinaryClassifier::from_config(&pipeline.deepfake, config.device, &config.session)?;

        info!(
            model = pipeline.forgery.name,
            path = %pipeline.forgery.model_path.display(),
            "loading forgery classifier"
        );
        let forgery =
            BinaryClassifier::from_config(&pipeline.forgery, config.device, &config.session)?;

        let mut segmenters = Vec::with_capacity(pipeline.segmenters.len());
        for segmenter_config in &pipeline.segmenters {
            info!(
                model = segmenter_config.name,
                path = %segmenter_config.model_path.display(),
                "loading segmentation model"
            );
            let model =
                MaskSegmenter::from_config(segmenter_config, config.device, &config.session)?;
            segmenters.push(NamedSegmenter {
                name: segmenter_config.name.clone(),
                model: Box::new(model),
            });
        }

        Ok(Self {
            deepfake: Box::new(deepfake),
            forgery: Box::new(forgery),
            segmenters,
            short_circuit_label: pipeline.short_circuit_label.clone(),
            segmentation_trigger: pipeline.segmentation_trigger.clone(),
            short_circuit_message: pipeline.short_circuit_message.clone(),
        })
    }

    /// Assembles a pipeline from already-built stages. Used by tests to
    /// exercise the decision logic with stub models.
    #[cfg(test)]
    fn from_parts(
        deepfake: Box<dyn Classify>,
        forgery: Box<dyn Classify>,
        segmenters: Vec<(String, Box<dyn Segment>)>,
    ) -> Self {
        let defaults = crate::core::config::PipelineConfig::default();
        Self {
            deepfake,
            forgery,
            segmenters: segmenters
                .into_iter()
                .map(|(name, model)| NamedSegmenter { name, model })
                .collect(),
            short_circuit_label: defaults.short_circuit_label,
            segmentation_trigger: defaults.segmentation_trigger,
            short_circuit_message: defaults.short_circuit_message,
        }
    }
}

impl ImageAnalyzer for DetectionPipeline {
    fn analyze(&self, image: &RgbImage) -> DetectResult<DetectionOutcome> {
        let deepfake = self.deepfake.classify(image)?;

        if deepfake.label == self.short_circuit_label {
            debug!(label = deepfake.label, "deepfake gate short-circuited");
            return Ok(DetectionOutcome {
                deepfake,
                message: Some(self.short_circuit_message.clone()),
                forgery: None,
                segmentation: Vec::new(),
            });
        }

        let forgery = self.forgery.classify(image)?;
        let mut segmentation = Vec::new();
        if forgery.label == self.segmentation_trigger {
            for segmenter in &self.segmenters {
                segmentation.push(SegmentationResult {
                    source: segmenter.name.clone(),
                    masks: segmenter.model.segment(image)?,
                });
            }
        }

        Ok(DetectionOutcome {
            deepfake,
            message: None,
            forgery: Some(forgery),
            segmentation,
        })
    }
}
