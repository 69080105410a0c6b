//! Fixed-shape resizing for model inputs.

use image::{RgbImage, imageops::FilterType};

/// Resizes images to a model's fixed input size, ignoring aspect ratio.
#[derive(Debug, Clone)]
pub struct ResizeToInput {
    /// Target height in pixels.
    height: u32,
    /// Target width in pixels.
    width: u32,
    /// Resizing filter to use.
    filter: FilterType,
}

impl ResizeToInput {
    /// Creates a resizer for the given (height, width) target.
    pub fn new(input_size: (u32, u32)) -> Self {
        Self {
            height: input_size.0,
            width: input_size.1,
            filter: FilterType::Triangle,
        }
    }

    /// Sets the resizing filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Resizes the image to the target size. A no-op when already sized.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        if image.dimensions() == (self.width, self.height) {
            return image.clone();
        }
        image::imageops::resize(image, self.width, self.height, self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resizes_to_exact_target() {
        let image = RgbImage::new(640, 480);
        let resized = ResizeToInput::new((224, 224)).apply(&image);
        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn already_sized_images_pass_through() {
        let image = RgbImage::new(256, 256);
        let resized = ResizeToInput::new((256, 256)).apply(&image);
        assert_eq!(resized.dimensions(), (256, 256));
    }
}
