//! Tamper-localization segmenter adapter.
//!
//! Wraps one ONNX segmentation model as a pure `image -> mask pair`
//! function. The model consumes raw rescaled pixels (no mean/std
//! normalization) and produces a per-pixel tamper probability map, which is
//! also thresholded into a binary mask.

use crate::core::config::{Device, OrtSessionConfig, SegmenterConfig};
use crate::core::errors::DetectResult;
use crate::core::inference::OnnxModel;
use crate::core::tensor::Tensor4D;
use crate::models::Segment;
use crate::processors::{NormalizeImage, ResizeToInput};
use image::RgbImage;
use ndarray::Array2;
use tracing::debug;

/// A probability mask and its thresholded binary form.
///
/// Both are [height, width] arrays at the model's output resolution with
/// values in [0, 1]; the binary mask holds only 0.0 and 1.0.
#[derive(Debug, Clone)]
pub struct MaskPair {
    /// Per-pixel tamper probability.
    pub probability: Array2<f32>,
    /// Probability thresholded into {0, 1}.
    pub binary: Array2<f32>,
}

/// A loaded segmentation model and its preprocessing chain.
#[derive(Debug)]
pub struct MaskSegmenter {
    model: OnnxModel,
    resize: ResizeToInput,
    normalizer: NormalizeImage,
    mask_threshold: f32,
}

impl MaskSegmenter {
    /// Loads the model and builds its preprocessing chain from config.
    pub fn from_config(
        config: &SegmenterConfig,
        device: Device,
        session_config: &OrtSessionConfig,
    ) -> DetectResult<Self> {
        config.validate()?;
        let model = OnnxModel::load(&config.name, &config.model_path, device, session_config)?;
        Ok(Self {
            model,
            resize: ResizeToInput::new(config.input_size),
            normalizer: NormalizeImage::rescale_only(),
            mask_threshold: config.mask_threshold,
        })
    }

    /// Builds the model's input tensor from an RGB image, checking the
    /// shape against the session's declared input.
    pub fn preprocess(&self, image: &RgbImage) -> DetectResult<Tensor4D> {
        let tensor = self.normalizer.tensor_from(&self.resize.apply(image))?;
        self.model.check_input(tensor.shape())?;
        Ok(tensor)
    }

    /// Complete forward pass: preprocess, infer, threshold.
    pub fn forward(&self, image: &RgbImage) -> DetectResult<MaskPair> {
        let tensor = self.preprocess(image)?;
        let probability = self.model.infer_map(&tensor)?;
        let binary = threshold_mask(&probability, self.mask_threshold);
        debug!(
            model = self.model.model_name(),
            height = probability.dim().0,
            width = probability.dim().1,
            "segmentation complete"
        );
        Ok(MaskPair {
            probability,
            binary,
        })
    }
}

impl Segment for MaskSegmenter {
    fn segment(&self, image: &RgbImage) -> DetectResult<MaskPair> {
        self.forward(image)
    }
}

/// Thresholds a probability map into a {0, 1} binary mask.
///
/// The comparison is strict: a pixel exactly at the threshold stays 0.
pub fn threshold_mask(probability: &Array2<f32>, threshold: f32) -> Array2<f32> {
    probability.mapv(|v| if v > threshold { 1.0 } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn threshold_is_strict() {
        let probability = array![[0.49, 0.5], [0.51, 1.0]];
        let binary = threshold_mask(&probability, 0.5);
        assert_eq!(binary, array![[0.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn binary_mask_holds_only_zero_and_one() {
        let probability = array![[0.1, 0.9, 0.7], [0.2, 0.5001, 0.0]];
        let binary = threshold_mask(&probability, 0.5);
        assert!(binary.iter().all(|&v| v == 0.0 || v == 1.0));
        assert_eq!(binary.dim(), probability.dim());
    }
}
