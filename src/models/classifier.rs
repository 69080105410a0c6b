//! Binary classifier adapter.
//!
//! Wraps one ONNX classification model as a pure `image -> {label,
//! probability}` function. Preprocessing (optional ELA derivation, resize,
//! normalization) and the probability-to-label rule are fixed per model at
//! construction time from [`ClassifierConfig`].

use crate::core::config::{ClassifierConfig, Device, LabelRule, OrtSessionConfig};
use crate::core::errors::{DetectError, DetectResult};
use crate::core::inference::OnnxModel;
use crate::core::tensor::Tensor4D;
use crate::models::Classify;
use crate::processors::{ElaTransform, NormalizeImage, ResizeToInput};
use image::RgbImage;
use tracing::debug;

/// Categorical label with the probability that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Mapped label.
    pub label: String,
    /// Raw positive-class probability in [0, 1].
    pub probability: f32,
}

/// A loaded binary classification model and its preprocessing chain.
#[derive(Debug)]
pub struct BinaryClassifier {
    model: OnnxModel,
    ela: Option<ElaTransform>,
    resize: ResizeToInput,
    normalizer: NormalizeImage,
    rule: LabelRule,
}

impl BinaryClassifier {
    /// Loads the model and builds its preprocessing chain from config.
    pub fn from_config(
        config: &ClassifierConfig,
        device: Device,
        session_config: &OrtSessionConfig,
    ) -> DetectResult<Self> {
        config.validate()?;
        let model = OnnxModel::load(&config.name, &config.model_path, device, session_config)?;
        let ela = config
            .ela
            .as_ref()
            .map(ElaTransform::new)
            .transpose()?;
        let normalizer = NormalizeImage::new(config.scale, config.mean, config.std)?;
        Ok(Self {
            model,
            ela,
            resize: ResizeToInput::new(config.input_size),
            normalizer,
            rule: config.rule.clone(),
        })
    }

    /// Builds the model's input tensor from an RGB image.
    ///
    /// The tensor shape is checked against the session's declared input
    /// shape here, so a mismatch surfaces before the forward pass.
    pub fn preprocess(&self, image: &RgbImage) -> DetectResult<Tensor4D> {
        let resized = match &self.ela {
            Some(transform) => self.resize.apply(&transform.apply(image)?),
            None => self.resize.apply(image),
        };
        let tensor = self.normalizer.tensor_from(&resized)?;
        self.model.check_input(tensor.shape())?;
        Ok(tensor)
    }

    /// Runs the forward pass and reduces the output head to the positive
    /// probability.
    pub fn infer(&self, tensor: &Tensor4D) -> DetectResult<f32> {
        let scores = self.model.infer_scores(tensor)?;
        positive_probability(self.model.model_name(), &scores)
    }

    /// Maps a probability to a [`Classification`] via the configured rule.
    pub fn postprocess(&self, probability: f32) -> Classification {
        Classification {
            label: self.rule.classify(probability).to_string(),
            probability,
        }
    }

    /// Complete forward pass: preprocess, infer, postprocess.
    pub fn forward(&self, image: &RgbImage) -> DetectResult<Classification> {
        let tensor = self.preprocess(image)?;
        let probability = self.infer(&tensor)?;
        let classification = self.postprocess(probability);
        debug!(
            model = self.model.model_name(),
            label = classification.label,
            probability = classification.probability,
            "classification complete"
        );
        Ok(classification)
    }
}

impl Classify for BinaryClassifier {
    fn classify(&self, image: &RgbImage) -> DetectResult<Classification> {
        self.forward(image)
    }
}

/// Reduces a classifier's output scores to a positive-class probability.
///
/// A single score is a sigmoid output and is taken as-is; a two-score head
/// is softmax output and index 1 is the positive class. Values are clamped
/// to [0, 1] to absorb float drift in exported graphs.
fn positive_probability(model: &str, scores: &[f32]) -> DetectResult<f32> {
    let raw = match scores.len() {
        1 => scores[0],
        2 => scores[1],
        n => {
            return Err(DetectError::invalid_input(format!(
                "model '{}' returned {} scores, expected a 1- or 2-class head",
                model, n
            )));
        }
    };
    Ok(raw.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_head_taken_as_is() {
        assert_eq!(positive_probability("m", &[0.73]).unwrap(), 0.73);
    }

    #[test]
    fn softmax_head_takes_positive_class() {
        assert_eq!(positive_probability("m", &[0.3, 0.7]).unwrap(), 0.7);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(positive_probability("m", &[1.0000002]).unwrap(), 1.0);
        assert_eq!(positive_probability("m", &[-0.0000003]).unwrap(), 0.0);
    }

    #[test]
    fn wider_heads_are_rejected() {
        assert!(positive_probability("m", &[0.1, 0.2, 0.7]).is_err());
        assert!(positive_probability("m", &[]).is_err());
    }
}
