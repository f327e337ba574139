use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage, RgbaImage};

use crate::error::{EffectError, Result};

/// Single-channel mask buffer, `[0,255]` per pixel
///
/// Used either as a boolean-like compositing stencil (noise lines) or as a
/// continuous blend operand (grain, scanlines).
pub type Mask = GrayImage;

/// Channel layout of a [`PixelBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Rgb,
    Rgba,
}

impl Channels {
    /// Number of samples per pixel
    pub fn count(self) -> u8 {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }
}

/// A row-major 8-bit pixel buffer in RGB or RGBA layout
///
/// This is the unit every effect consumes and produces. Effects never mutate
/// their input; they return a fresh buffer, which keeps the caller's undo
/// stack in charge of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zeroed buffer
    pub fn new(width: u32, height: u32, channels: Channels) -> Result<Self> {
        check_dimensions(width, height)?;
        let len = width as usize * height as usize * channels.count() as usize;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0; len],
        })
    }

    /// Create a buffer filled with a flat color (alpha ignored for RGB)
    pub fn filled(width: u32, height: u32, channels: Channels, color: [u8; 4]) -> Result<Self> {
        let mut buffer = Self::new(width, height, channels)?;
        let c = channels.count() as usize;
        for pixel in buffer.data.chunks_exact_mut(c) {
            pixel.copy_from_slice(&color[..c]);
        }
        Ok(buffer)
    }

    /// Wrap raw samples; length must match `width * height * channels`
    pub fn from_raw(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * channels.count() as usize;
        if data.len() != expected {
            return Err(EffectError::ShapeMismatch {
                expected: format!("{} samples", expected),
                actual: format!("{} samples", data.len()),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Convert a decoded image, rejecting layouts without color channels
    ///
    /// Grayscale sources would silently lose the channel-split and chroma
    /// effects, so they are refused rather than widened.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        let channels = img.color().channel_count();
        match channels {
            1 | 2 => Err(EffectError::UnsupportedImageFormat { channels }.into()),
            4 => Ok(Self::from_rgba_image(img.to_rgba8())),
            _ => Ok(Self::from_rgb_image(img.to_rgb8())),
        }
    }

    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: Channels::Rgb,
            data: img.into_raw(),
        }
    }

    pub fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            channels: Channels::Rgba,
            data: img.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Whether two buffers share spatial shape (channel count may differ)
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Read a pixel as RGBA; RGB buffers report alpha 255
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let c = self.channels.count() as usize;
        let idx = (y as usize * self.width as usize + x as usize) * c;
        match self.channels {
            Channels::Rgb => [self.data[idx], self.data[idx + 1], self.data[idx + 2], 255],
            Channels::Rgba => [
                self.data[idx],
                self.data[idx + 1],
                self.data[idx + 2],
                self.data[idx + 3],
            ],
        }
    }

    /// Write a pixel from RGBA; alpha is dropped for RGB buffers
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let c = self.channels.count() as usize;
        let idx = (y as usize * self.width as usize + x as usize) * c;
        self.data[idx..idx + c].copy_from_slice(&rgba[..c]);
    }

    /// Normalize to RGBA, required before any alpha-aware blend
    pub fn to_rgba(&self) -> PixelBuffer {
        match self.channels {
            Channels::Rgba => self.clone(),
            Channels::Rgb => {
                let mut data = Vec::with_capacity(self.data.len() / 3 * 4);
                for px in self.data.chunks_exact(3) {
                    data.extend_from_slice(px);
                    data.push(255);
                }
                PixelBuffer {
                    width: self.width,
                    height: self.height,
                    channels: Channels::Rgba,
                    data,
                }
            }
        }
    }

    /// View as an `image` crate RGBA buffer (converting if needed)
    pub fn to_rgba_image(&self) -> RgbaImage {
        let rgba = self.to_rgba();
        ImageBuffer::from_raw(rgba.width, rgba.height, rgba.data)
            .expect("buffer length invariant")
    }

    /// View as an `image` crate RGB buffer, dropping alpha if present
    pub fn to_rgb_image(&self) -> RgbImage {
        let data = match self.channels {
            Channels::Rgb => self.data.clone(),
            Channels::Rgba => self
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        };
        ImageBuffer::from_raw(self.width, self.height, data).expect("buffer length invariant")
    }

    /// Float working copy for blend math
    pub fn to_float(&self) -> FloatBuffer {
        let rgba = self.to_rgba();
        FloatBuffer {
            width: rgba.width,
            height: rgba.height,
            data: rgba.data.iter().map(|&v| v as f32).collect(),
        }
    }

    /// Trim a uniform border of `border` pixels on all sides
    pub fn crop_border(&self, border: u32) -> Result<PixelBuffer> {
        if border == 0 {
            return Ok(self.clone());
        }
        let new_w = self.width.saturating_sub(2 * border);
        let new_h = self.height.saturating_sub(2 * border);
        check_dimensions(new_w, new_h)?;

        let c = self.channels.count() as usize;
        let mut data = Vec::with_capacity(new_w as usize * new_h as usize * c);
        for y in border..border + new_h {
            let start = (y as usize * self.width as usize + border as usize) * c;
            let end = start + new_w as usize * c;
            data.extend_from_slice(&self.data[start..end]);
        }
        Ok(PixelBuffer {
            width: new_w,
            height: new_h,
            channels: self.channels,
            data,
        })
    }
}

/// Float RGBA working buffer, samples scaled to `[0,255]`
///
/// Blend operators work on these to keep intermediate precision; finalization
/// clamps back to 8-bit.
#[derive(Debug, Clone)]
pub struct FloatBuffer {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) data: Vec<f32>,
}

impl FloatBuffer {
    /// Flat-color RGBA float buffer
    pub fn flat(width: u32, height: u32, rgba: [f32; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Expand a single-channel mask into an opaque gray RGBA float buffer
    pub fn from_mask(mask: &Mask) -> Self {
        let (width, height) = mask.dimensions();
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for px in mask.pixels() {
            let v = px.0[0] as f32;
            data.extend_from_slice(&[v, v, v, 255.0]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn same_shape(&self, other: &FloatBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Clamp to `[0,255]` and reduce to an 8-bit RGBA buffer
    pub fn finalize(&self) -> PixelBuffer {
        let data = self
            .data
            .iter()
            .map(|&v| v.round().clamp(0.0, 255.0) as u8)
            .collect();
        PixelBuffer {
            width: self.width,
            height: self.height,
            channels: Channels::Rgba,
            data,
        }
    }
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EffectError::InvalidDimensions { width, height }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(PixelBuffer::new(0, 10, Channels::Rgb).is_err());
        assert!(PixelBuffer::new(10, 0, Channels::Rgba).is_err());
    }

    #[test]
    fn test_rgb_to_rgba_normalization() {
        let rgb = PixelBuffer::filled(4, 4, Channels::Rgb, [10, 20, 30, 0]).unwrap();
        let rgba = rgb.to_rgba();
        assert_eq!(rgba.channels(), Channels::Rgba);
        assert_eq!(rgba.pixel(2, 2), [10, 20, 30, 255]);
    }

    #[test]
    fn test_float_roundtrip_preserves_samples() {
        let buf = PixelBuffer::filled(3, 3, Channels::Rgba, [1, 128, 254, 200]).unwrap();
        let back = buf.to_float().finalize();
        assert_eq!(buf, back);
    }

    #[test]
    fn test_crop_border() {
        let buf = PixelBuffer::filled(10, 8, Channels::Rgb, [5, 5, 5, 0]).unwrap();
        let cropped = buf.crop_border(2).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (6, 4));

        // Border larger than half the image collapses the buffer
        assert!(buf.crop_border(5).is_err());
    }

    #[test]
    fn test_grayscale_source_rejected() {
        let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(PixelBuffer::from_dynamic(gray).is_err());

        let rgb = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let buf = PixelBuffer::from_dynamic(rgb).unwrap();
        assert_eq!(buf.channels(), Channels::Rgb);
    }

    #[test]
    fn test_from_raw_length_mismatch() {
        assert!(PixelBuffer::from_raw(2, 2, Channels::Rgb, vec![0; 11]).is_err());
    }
}
