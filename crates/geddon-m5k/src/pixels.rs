//! Decoded texture pixels.

use std::path::Path;

use geddon_common::Error as CommonError;
use image::{ImageFormat, RgbaImage};

use crate::header::{pixel_len, BYTES_PER_PIXEL};
use crate::{Error, Result};

/// A single 32-bit pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Build from four bytes in storage order (B, G, R, A).
    #[inline]
    pub const fn from_bgra(bytes: [u8; 4]) -> Self {
        Self {
            b: bytes[0],
            g: bytes[1],
            r: bytes[2],
            a: bytes[3],
        }
    }

    /// Packed `0xAARRGGBB`.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Pixels recovered from a texture container, row-major from the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u16,
    height: u16,
    pixels: Vec<Argb>,
}

impl DecodedImage {
    /// An image with no pixel data.
    pub fn empty(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: Vec::new(),
        }
    }

    /// Remap a BGRA byte buffer.
    ///
    /// An empty buffer yields an empty image. Otherwise the buffer must hold
    /// at least `width * height * 4` bytes; anything past that is ignored.
    pub fn from_bgra(width: u16, height: u16, data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty(width, height));
        }

        let needed = pixel_len(width, height);
        if data.len() < needed {
            return Err(CommonError::TruncatedRead {
                offset: 0,
                needed: needed as u64,
                available: data.len() as u64,
            }
            .into());
        }

        let pixels = data[..needed]
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| Argb::from_bgra([px[0], px[1], px[2], px[3]]))
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[Argb] {
        &self.pixels
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Argb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = usize::from(y) * usize::from(self.width) + usize::from(x);
        self.pixels.get(index).copied()
    }

    /// Convert to an RGBA buffer for the `image` crate.
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        if self.is_empty() {
            return None;
        }
        let raw = self.pixels.iter().flat_map(|px| px.to_rgba()).collect();
        RgbaImage::from_raw(u32::from(self.width), u32::from(self.height), raw)
    }

    /// Encode as PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let buffer = self.to_rgba_image().ok_or(Error::EmptyImage)?;
        buffer.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_remap() {
        let image = DecodedImage::from_bgra(2, 1, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        assert_eq!(image.pixels(), &[Argb::new(4, 3, 2, 1), Argb::new(8, 7, 6, 5)]);
        assert_eq!(image.pixel(0, 0).unwrap().to_u32(), 0x0403_0201);
        assert_eq!(image.pixel(1, 0).unwrap().to_rgba(), [7, 6, 5, 8]);
        assert_eq!(image.pixel(2, 0), None);
    }

    #[test]
    fn test_empty_buffer() {
        let image = DecodedImage::from_bgra(64, 64, &[]).unwrap();
        assert!(image.is_empty());
        assert_eq!(image.width(), 64);
        assert!(image.to_rgba_image().is_none());
    }

    #[test]
    fn test_short_buffer() {
        let result = DecodedImage::from_bgra(2, 2, &[0; 8]);
        assert!(matches!(
            result,
            Err(Error::Common(CommonError::TruncatedRead {
                needed: 16,
                available: 8,
                ..
            }))
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let image = DecodedImage::from_bgra(1, 1, &[9, 9, 9, 9, 0xAA]).unwrap();
        assert_eq!(image.pixels().len(), 1);
    }

    #[test]
    fn test_save_empty() {
        let dir = tempfile::tempdir().unwrap();
        let image = DecodedImage::empty(4, 4);
        assert!(matches!(
            image.save_png(dir.path().join("x.png")),
            Err(Error::EmptyImage)
        ));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tex.png");
        let image = DecodedImage::from_bgra(1, 2, &[10, 20, 30, 255, 1, 2, 3, 128]).unwrap();
        image.save_png(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (1, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [30, 20, 10, 255]);
        assert_eq!(loaded.get_pixel(0, 1).0, [3, 2, 1, 128]);
    }
}
