//! # Text Rendering Collaborator
//!
//! Rasterizes overlay layout instructions onto a pixel buffer with `fontdue`.
//! The font is loaded from the configured path at call time; a missing file
//! surfaces as [`ImageError::FontResourceMissing`] so the caller can treat it
//! as fatal to the timestamp effect only.

use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::{
    buffer::PixelBuffer,
    effects::timestamp::OverlayItem,
    error::{ImageError, Result, RetrofyError},
};

/// Glyph rasterizer for the OSD overlay
pub struct TextRenderer {
    font: Font,
}

impl TextRenderer {
    /// Load a TrueType font from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|_| ImageError::FontResourceMissing {
            path: path.display().to_string(),
        })?;
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| RetrofyError::generic(format!("font parse failed: {}", e)))?;
        Ok(Self { font })
    }

    /// Draw one run of text; `(item.x, item.y)` is the top-left of the line
    ///
    /// Glyph coverage is used as per-pixel opacity against the flat overlay
    /// color, which gives the slightly soft edges of a real OSD generator.
    pub fn draw(&self, buffer: &mut PixelBuffer, item: &OverlayItem, size: f32, color: [u8; 3]) {
        let baseline = item.y as i64 + size as i64;
        let mut pen_x = item.x as f32;

        for ch in item.text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size);
            let glyph_x = pen_x as i64 + metrics.xmin as i64;
            let glyph_y = baseline - metrics.height as i64 - metrics.ymin as i64;

            for (row, chunk) in bitmap.chunks_exact(metrics.width.max(1)).enumerate() {
                let y = glyph_y + row as i64;
                if y < 0 || y >= buffer.height() as i64 {
                    continue;
                }
                for (col, &coverage) in chunk.iter().enumerate() {
                    if coverage == 0 {
                        continue;
                    }
                    let x = glyph_x + col as i64;
                    if x < 0 || x >= buffer.width() as i64 {
                        continue;
                    }
                    let (x, y) = (x as u32, y as u32);
                    let base = buffer.pixel(x, y);
                    let a = coverage as f32 / 255.0;
                    let mut out = base;
                    for c in 0..3 {
                        out[c] = (color[c] as f32 * a + base[c] as f32 * (1.0 - a))
                            .round()
                            .clamp(0.0, 255.0) as u8;
                    }
                    buffer.set_pixel(x, y, out);
                }
            }

            pen_x += metrics.advance_width;
        }
    }
}
