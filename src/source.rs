//! Source image access.
//!
//! The packing pipeline only ever reads pixels through [`SourceImage`], a
//! borrowed view over externally owned data. [`ImageData`] is the owned
//! companion for callers that hold pixel buffers themselves (the CLI, tests,
//! and the canonical substitute images).

use crate::error::{PackError, Result};
use crate::types::ColorSpace;

/// Owned RGBA8 image data.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
    /// Color space the pixel values are encoded in.
    pub color_space: ColorSpace,
}

impl ImageData {
    /// Create an image from RGBA data, validating the buffer length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, color_space: ColorSpace) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(PackError::InvalidImageData {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            color_space,
        })
    }

    /// Create an image filled with a single pixel value.
    pub fn solid(width: u32, height: u32, pixel: [u8; 4], color_space: ColorSpace) -> Self {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&pixel);
        }
        Self {
            width,
            height,
            pixels,
            color_space,
        }
    }

    /// Decode a PNG from bytes.
    pub fn from_png_bytes(data: &[u8], color_space: ColorSpace) -> Result<Self> {
        let img = image::load_from_memory(data)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
            color_space,
        })
    }

    /// Borrow this image as a [`SourceImage`] with the given identity.
    pub fn as_source(&self, id: u64) -> SourceImage<'_> {
        SourceImage {
            id,
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
            color_space: self.color_space,
        }
    }

    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

/// Borrowed, read-only view of a source texture.
///
/// The `id` is a stable identity assigned by the asset layer; two views with
/// the same id are treated as the same texture during deduplication. The two
/// highest id values are reserved for the canonical substitute images.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    id: u64,
    width: u32,
    height: u32,
    pixels: &'a [u8],
    color_space: ColorSpace,
}

impl<'a> SourceImage<'a> {
    /// Create a view over an RGBA8 buffer, validating its length.
    pub fn new(
        id: u64,
        width: u32,
        height: u32,
        pixels: &'a [u8],
        color_space: ColorSpace,
    ) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(PackError::InvalidImageData {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            id,
            width,
            height,
            pixels,
            color_space,
        })
    }

    /// Stable identity of the underlying texture.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The larger of width and height.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Color space the pixel values are encoded in.
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Raw RGBA8 pixel data.
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Get a pixel at (x, y). Coordinates must be in bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_validates_length() {
        assert!(ImageData::new(2, 2, vec![0; 16], ColorSpace::Perceptual).is_ok());
        let err = ImageData::new(2, 2, vec![0; 15], ColorSpace::Perceptual);
        assert!(matches!(
            err,
            Err(PackError::InvalidImageData {
                expected: 16,
                actual: 15,
                ..
            })
        ));
    }

    #[test]
    fn test_solid_image() {
        let img = ImageData::solid(2, 3, [10, 20, 30, 40], ColorSpace::Linear);
        assert_eq!(img.pixels.len(), 2 * 3 * 4);
        assert_eq!(img.get_pixel(1, 2), [10, 20, 30, 40]);
    }

    #[test]
    fn test_source_view() {
        let img = ImageData::solid(4, 4, [1, 2, 3, 4], ColorSpace::Perceptual);
        let view = img.as_source(7);
        assert_eq!(view.id(), 7);
        assert_eq!(view.width(), 4);
        assert_eq!(view.max_dimension(), 4);
        assert_eq!(view.get_pixel(3, 3), [1, 2, 3, 4]);
    }

    #[test]
    fn test_source_image_rejects_short_buffer() {
        let buf = vec![0u8; 12];
        assert!(SourceImage::new(0, 2, 2, &buf, ColorSpace::Linear).is_err());
    }
}
