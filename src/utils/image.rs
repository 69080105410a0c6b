//! Decoding uploaded image bytes.

use crate::core::errors::{DetectError, DetectResult};
use image::RgbImage;

/// Decodes image bytes (format sniffed from the content) into RGB pixels.
///
/// Alpha channels and palettes are flattened; an undecodable payload
/// surfaces as [`DetectError::Decode`].
pub fn decode_rgb(bytes: &[u8]) -> DetectResult<RgbImage> {
    if bytes.is_empty() {
        return Err(DetectError::invalid_input("image payload is empty"));
    }
    let decoded = image::load_from_memory(bytes)?;
    Ok(decoded.to_rgb8())
}
