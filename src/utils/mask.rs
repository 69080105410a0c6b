//! Mask serialization for JSON transport.

use crate::core::errors::{DetectError, DetectResult, ProcessingStage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat, Luma};
use ndarray::Array2;
use std::io::Cursor;

/// Encodes a [0, 1] float mask as a base64 string of grayscale PNG bytes.
///
/// Values are clamped to [0, 1] before the 0..=255 mapping, so small float
/// drift in model output never wraps around.
pub fn mask_to_png_base64(mask: &Array2<f32>) -> DetectResult<String> {
    let (height, width) = mask.dim();
    if height == 0 || width == 0 {
        return Err(DetectError::invalid_input("mask has zero dimensions"));
    }

    let mut gray = GrayImage::new(width as u32, height as u32);
    for ((y, x), &value) in mask.indexed_iter() {
        let byte = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        gray.put_pixel(x as u32, y as u32, Luma([byte]));
    }

    let mut png = Vec::new();
    gray.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| DetectError::processing(ProcessingStage::Encoding, "mask to PNG", e))?;
    Ok(STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn decode(encoded: &str) -> GrayImage {
        let bytes = STANDARD.decode(encoded).unwrap();
        image::load_from_memory(&bytes).unwrap().to_luma8()
    }

    #[test]
    fn encodes_dimensions_and_levels() {
        let mask = array![[0.0, 0.5], [1.0, 0.25]];
        let decoded = decode(&mask_to_png_base64(&mask).unwrap());
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [128]);
        assert_eq!(decoded.get_pixel(0, 1).0, [255]);
        assert_eq!(decoded.get_pixel(1, 1).0, [64]);
    }

    #[test]
    fn out_of_range_values_clamp_instead_of_wrapping() {
        let mask = array![[-0.5, 1.5]];
        let decoded = decode(&mask_to_png_base64(&mask).unwrap());
        assert_eq!(decoded.get_pixel(0, 0).0, [0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [255]);
    }

    #[test]
    fn rejects_empty_mask() {
        let mask = Array2::<f32>::zeros((0, 4));
        assert!(mask_to_png_base64(&mask).is_err());
    }
}
