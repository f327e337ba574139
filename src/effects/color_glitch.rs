//! RGB channel misalignment
//!
//! Splits the image into single-channel sub-images, shifts red and blue in
//! opposite diagonal directions, and recombines them additively. The result
//! is the chromatic fringing of a misaligned analog signal. Shifts are
//! wrap-free: pixels pushed off one edge do not reappear on the other, they
//! leave a transparent margin that `crop` can trim away.

use rand::RngCore;

use crate::{
    buffer::{FloatBuffer, PixelBuffer},
    config::{ColorGlitchConfig, Config},
    effects::{blend, params, Effect},
    error::Result,
};

/// Normalized inputs for the channel-split glitch
#[derive(Debug, Clone)]
pub struct ColorGlitchParams {
    /// Offset driver, `[0,1]`; mapped to a pixel offset via the config max
    pub intensity: f64,

    /// Trim the offset-introduced transparent border from the result
    pub crop: bool,
}

impl ColorGlitchParams {
    pub fn from_config(config: &ColorGlitchConfig) -> Self {
        Self {
            intensity: config.default_intensity,
            crop: true,
        }
    }
}

/// Chromatic-aberration-style channel offset effect
pub struct ColorGlitch {
    params: ColorGlitchParams,
}

impl ColorGlitch {
    pub fn new(params: ColorGlitchParams) -> Self {
        Self { params }
    }

    pub fn with_defaults(config: &Config) -> Self {
        Self::new(ColorGlitchParams::from_config(&config.color_glitch))
    }

    /// The pixel offset this effect would use at its configured intensity
    pub fn mapped_offset(&self, config: &ColorGlitchConfig) -> u32 {
        let intensity = params::clamp(self.params.intensity, 0.0, 1.0);
        params::pctg_to_value(intensity, config.max_offset as f64, 0.0) as u32
    }
}

/// Isolate one RGB channel of `src` and shift it by `(dx, dy)` without wrap
///
/// Vacated pixels are fully transparent so the later additive recombine
/// contributes nothing there.
fn isolated_shifted(src: &PixelBuffer, keep: usize, dx: i64, dy: i64) -> FloatBuffer {
    let (width, height) = (src.width(), src.height());
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let sx = x - dx;
            let sy = y - dy;
            if sx >= 0 && sx < width as i64 && sy >= 0 && sy < height as i64 {
                let px = src.pixel(sx as u32, sy as u32);
                let mut out = [0.0f32; 4];
                out[keep] = px[keep] as f32;
                out[3] = px[3] as f32;
                data.extend_from_slice(&out);
            } else {
                data.extend_from_slice(&[0.0, 0.0, 0.0, 0.0]);
            }
        }
    }
    FloatBuffer {
        width,
        height,
        data,
    }
}

impl Effect for ColorGlitch {
    fn name(&self) -> &str {
        "color_glitch"
    }

    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        _rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let offset = self.mapped_offset(&config.color_glitch) as i64;
        let rgba = image.to_rgba();

        // Red drifts up-right, blue down-left, green stays put
        let red = isolated_shifted(&rgba, 0, offset, -offset);
        let green = isolated_shifted(&rgba, 1, 0, 0);
        let blue = isolated_shifted(&rgba, 2, -offset, offset);

        let combined = blend::add(&green, &red, 1.0)?;
        let combined = blend::add(&combined, &blue, 1.0)?;
        let result = combined.finalize();

        if self.params.crop {
            result.crop_border(offset as u32)
        } else {
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use rand::{rngs::StdRng, SeedableRng};

    fn solid(w: u32, h: u32, rgb: [u8; 3]) -> PixelBuffer {
        PixelBuffer::filled(w, h, Channels::Rgb, [rgb[0], rgb[1], rgb[2], 0]).unwrap()
    }

    #[test]
    fn test_identity_at_zero_intensity() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(0);
        let image = solid(20, 20, [120, 60, 30]);

        let effect = ColorGlitch::new(ColorGlitchParams {
            intensity: 0.0,
            crop: true,
        });
        let out = effect.apply(&image, &config, &mut rng).unwrap();

        assert!(out.same_shape(&image));
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(out.pixel(x, y), [120, 60, 30, 255]);
            }
        }
    }

    #[test]
    fn test_full_intensity_crops_by_configured_max() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(0);
        let image = solid(100, 100, [200, 100, 50]);

        let effect = ColorGlitch::new(ColorGlitchParams {
            intensity: 1.0,
            crop: true,
        });
        let offset = effect.mapped_offset(&config.color_glitch);
        assert_eq!(offset, config.color_glitch.max_offset);

        let out = effect.apply(&image, &config, &mut rng).unwrap();
        assert_eq!(out.width(), 100 - 2 * offset);
        assert_eq!(out.height(), 100 - 2 * offset);
    }

    #[test]
    fn test_uncropped_keeps_shape_and_shifts_red() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(0);
        let image = solid(40, 40, [255, 0, 0]);

        let effect = ColorGlitch::new(ColorGlitchParams {
            intensity: 1.0,
            crop: false,
        });
        let offset = effect.mapped_offset(&config.color_glitch);
        let out = effect.apply(&image, &config, &mut rng).unwrap();
        assert!(out.same_shape(&image));

        // Red shifted right by `offset`: the left margin lost its red
        assert_eq!(out.pixel(0, 20)[0], 0);
        // Interior pixels keep it (shifted copy covers them)
        assert_eq!(out.pixel(offset + 1, 20)[0], 255);
    }

    #[test]
    fn test_interior_of_solid_image_unchanged() {
        // On a solid color, every channel's shifted copy still covers the
        // interior, so recombination reproduces the original color there.
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(0);
        let image = solid(50, 50, [90, 140, 30]);

        let effect = ColorGlitch::new(ColorGlitchParams {
            intensity: 1.0,
            crop: true,
        });
        let out = effect.apply(&image, &config, &mut rng).unwrap();
        let center = out.pixel(out.width() / 2, out.height() / 2);
        assert_eq!(&center[..3], &[90, 140, 30]);
    }
}
