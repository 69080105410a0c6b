//! Image normalization for model inputs.
//!
//! Normalization is folded into a single multiply-add per channel:
//! `value * alpha + beta` with `alpha = scale / std` and `beta = -mean / std`.
//! The output is a CHW tensor with a leading batch dimension of 1, which is
//! what every model in the pipeline consumes.

use crate::core::errors::{DetectError, DetectResult};
use crate::core::tensor::Tensor4D;
use image::RgbImage;

/// Normalizes RGB images into NCHW float tensors.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std).
    alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std).
    beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a normalizer from scale, per-channel mean, and per-channel
    /// standard deviation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if scale is not positive or any
    /// standard deviation is not positive.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3]) -> DetectResult<Self> {
        if scale <= 0.0 {
            return Err(DetectError::config(format!(
                "normalization scale must be greater than 0, got {}",
                scale
            )));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(DetectError::config(format!(
                    "standard deviation at index {} must be greater than 0, got {}",
                    i, s
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self { alpha, beta })
    }

    /// Creates a normalizer that only rescales pixels to [0, 1].
    ///
    /// This is the raw-pixel variant the segmentation models expect.
    pub fn rescale_only() -> Self {
        // scale 1/255, zero mean, unit std; cannot fail
        Self {
            alpha: [1.0 / 255.0; 3],
            beta: [0.0; 3],
        }
    }

    /// Normalizes one image into a `[1, 3, H, W]` tensor.
    pub fn tensor_from(&self, image: &RgbImage) -> DetectResult<Tensor4D> {
        let (width, height) = image.dimensions();
        let (width, height) = (width as usize, height as usize);
        let mut data = vec![0.0f32; 3 * height * width];

        for (x, y, pixel) in image.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                data[c * height * width + y * width + x] =
                    pixel[c] as f32 * self.alpha[c] + self.beta[c];
            }
        }

        let tensor = Tensor4D::from_shape_vec((1, 3, height, width), data)
            .map_err(DetectError::Tensor)?;
        Ok(tensor)
    }
}
