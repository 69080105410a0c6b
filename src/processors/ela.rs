//! Error-level-analysis (ELA) transform.
//!
//! ELA highlights recompression artifacts: the image is re-encoded as JPEG
//! at a reduced quality, the per-pixel absolute difference against the
//! original is computed, and the difference is amplified so the strongest
//! artifact maps to full brightness. Regions pasted from another source
//! compress differently and stand out in the result, which is what the
//! forgery classifier was trained on.

use crate::core::config::ElaConfig;
use crate::core::errors::{DetectError, DetectResult, ProcessingStage};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use std::io::Cursor;

/// Computes the ELA representation of an RGB image.
#[derive(Debug, Clone)]
pub struct ElaTransform {
    quality: u8,
}

impl ElaTransform {
    /// Creates the transform from its configuration.
    pub fn new(config: &ElaConfig) -> DetectResult<Self> {
        config.validate()?;
        Ok(Self {
            quality: config.quality,
        })
    }

    /// Applies the transform, producing an image of the same dimensions.
    ///
    /// The output is deterministic for a given input and quality setting.
    pub fn apply(&self, image: &RgbImage) -> DetectResult<RgbImage> {
        let recompressed = self.recompress(image)?;

        let (width, height) = image.dimensions();
        let mut diff = RgbImage::new(width, height);
        let mut max_diff = 0u8;
        for (original, reencoded) in image.pixels().zip(recompressed.pixels()) {
            for c in 0..3 {
                max_diff = max_diff.max(original[c].abs_diff(reencoded[c]));
            }
        }

        // Amplify so the strongest artifact maps to 255; a max of zero
        // (perfectly stable image) leaves the result black.
        let gain = if max_diff == 0 {
            0.0
        } else {
            255.0 / max_diff as f32
        };
        for (x, y, pixel) in diff.enumerate_pixels_mut() {
            let original = image.get_pixel(x, y);
            let reencoded = recompressed.get_pixel(x, y);
            for c in 0..3 {
                let amplified = original[c].abs_diff(reencoded[c]) as f32 * gain;
                pixel[c] = amplified.min(255.0) as u8;
            }
        }

        Ok(diff)
    }

    fn recompress(&self, image: &RgbImage) -> DetectResult<RgbImage> {
        let (width, height) = image.dimensions();
        let mut encoded = Vec::new();
        let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), self.quality);
        encoder
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| {
                DetectError::processing(
                    ProcessingStage::ErrorLevelAnalysis,
                    "JPEG re-encoding failed",
                    e,
                )
            })?;

        let decoded = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
            .map_err(|e| {
                DetectError::processing(
                    ProcessingStage::ErrorLevelAnalysis,
                    "decoding the re-encoded JPEG failed",
                    e,
                )
            })?;
        Ok(decoded.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
            ])
        })
    }

    #[test]
    fn preserves_dimensions() {
        let transform = ElaTransform::new(&ElaConfig::default()).unwrap();
        let ela = transform.apply(&gradient_image(33, 17)).unwrap();
        assert_eq!(ela.dimensions(), (33, 17));
    }

    #[test]
    fn is_deterministic() {
        let transform = ElaTransform::new(&ElaConfig::default()).unwrap();
        let image = gradient_image(64, 64);
        let first = transform.apply(&image).unwrap();
        let second = transform.apply(&image).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn amplifies_to_full_range_when_artifacts_exist() {
        let transform = ElaTransform::new(&ElaConfig { quality: 10 }).unwrap();
        let ela = transform.apply(&gradient_image(64, 64)).unwrap();
        let max = ela.pixels().flat_map(|p| p.0).max().unwrap();
        assert_eq!(max, 255);
    }

    #[test]
    fn rejects_invalid_quality() {
        assert!(ElaTransform::new(&ElaConfig { quality: 0 }).is_err());
    }
}
