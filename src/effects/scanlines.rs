//! Periodic scanline mask
//!
//! Builds a mask with one opaque full-width row at a fixed spacing, blurs it,
//! and soft-light composites it onto the image. The intensity is first pulled
//! into a narrower working band, then mapped to a line count oriented so that
//! higher intensity always produces more lines.

use image::imageops;
use rand::RngCore;

use crate::{
    buffer::{check_dimensions, FloatBuffer, Mask, PixelBuffer},
    config::{Config, ScanlineConfig},
    effects::{blend, params, Effect},
    error::Result,
};

/// Working band the raw intensity is remapped into before the count mapping
const INTENSITY_BAND: (f64, f64) = (0.35, 0.75);

/// Normalized inputs for the scanline effect
#[derive(Debug, Clone)]
pub struct ScanlineParams {
    /// Line density and composite opacity driver, `[0,1]`
    pub intensity: f64,

    /// Mask blur driver, `[0,1]`
    pub blur: f64,
}

impl ScanlineParams {
    pub fn from_config(config: &ScanlineConfig) -> Self {
        Self {
            intensity: config.default_intensity,
            blur: config.default_blur,
        }
    }
}

/// Remap raw intensity into the working band
fn banded_intensity(intensity: f64) -> f64 {
    let clamped = params::clamp(intensity, 0.0, 1.0);
    // Source range is non-degenerate, the remap cannot fail
    params::translate_range(clamped, 0.0, 1.0, INTENSITY_BAND.0, INTENSITY_BAND.1)
        .expect("static non-degenerate range")
}

/// Row spacing for the given height and raw intensity
///
/// The banded intensity scales the configured maximum divider into a target
/// line count; spacing is `floor(height / count)`. A count that rounds to
/// zero substitutes the full height (a single line at row 0), and a count
/// above the height clamps spacing at one row.
pub fn line_spacing(height: u32, intensity: f64, config: &ScanlineConfig) -> u32 {
    let line_count = params::pctg_to_value(banded_intensity(intensity), config.max_height_divider, 0.0);
    if line_count < 1.0 {
        return height;
    }
    ((height as f64 / line_count).floor() as u32).max(1)
}

/// Build the unblurred scanline mask: opaque rows every `spacing` rows
///
/// Rows land at 0, spacing, 2*spacing, ...; when `spacing` does not divide
/// the height the trailing partial block still opens with a line.
pub fn generate_mask(width: u32, height: u32, spacing: u32) -> Result<Mask> {
    check_dimensions(width, height)?;
    let mut mask = Mask::new(width, height);
    for y in (0..height).step_by(spacing.max(1) as usize) {
        for x in 0..width {
            mask.put_pixel(x, y, image::Luma([255u8]));
        }
    }
    Ok(mask)
}

/// Synthetic CRT/VHS scanline effect
pub struct Scanlines {
    params: ScanlineParams,
}

impl Scanlines {
    pub fn new(params: ScanlineParams) -> Self {
        Self { params }
    }

    pub fn with_defaults(config: &Config) -> Self {
        Self::new(ScanlineParams::from_config(&config.scanlines))
    }
}

impl Effect for Scanlines {
    fn name(&self) -> &str {
        "scanlines"
    }

    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        _rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let opacity = banded_intensity(self.params.intensity);
        let blur = params::clamp(self.params.blur, 0.0, 1.0);
        let blur_sigma = params::pctg_to_value(blur, config.scanlines.max_blur as f64, 0.0) as f32;

        let spacing = line_spacing(image.height(), self.params.intensity, &config.scanlines);
        let mut mask = generate_mask(image.width(), image.height(), spacing)?;
        if blur_sigma > 0.0 {
            mask = imageops::blur(&mask, blur_sigma);
        }

        let base = image.to_float();
        let lines = FloatBuffer::from_mask(&mask);
        let composited = blend::soft_light(&base, &lines, opacity)?;
        Ok(composited.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use rand::{rngs::StdRng, SeedableRng};

    fn opaque_rows(mask: &Mask) -> u32 {
        (0..mask.height())
            .filter(|&y| mask.get_pixel(0, y).0[0] == 255)
            .count() as u32
    }

    #[test]
    fn test_mask_row_count_matches_spacing() {
        let mask = generate_mask(40, 100, 10).unwrap();
        // Rows 0, 10, ..., 90
        assert_eq!(opaque_rows(&mask), 10);
        assert_eq!(mask.get_pixel(39, 0).0[0], 255);
        assert_eq!(mask.get_pixel(0, 5).0[0], 0);
    }

    #[test]
    fn test_mask_row_count_non_divisible_spacing() {
        // The partial trailing block still opens with a line: rows at
        // 0, 30, 60 and 90, so the count rounds up rather than down
        let mask = generate_mask(8, 100, 30).unwrap();
        assert_eq!(opaque_rows(&mask), 4);
    }

    #[test]
    fn test_line_count_monotonic_in_intensity() {
        let config = ScanlineConfig::default();
        let height = 1000;
        let mut last = 0;
        for step in 0..=10 {
            let intensity = step as f64 / 10.0;
            let spacing = line_spacing(height, intensity, &config);
            let mask = generate_mask(8, height, spacing).unwrap();
            let count = opaque_rows(&mask);
            assert!(
                count >= last,
                "line count decreased at intensity {}: {} < {}",
                intensity,
                count,
                last
            );
            last = count;
        }
    }

    #[test]
    fn test_degenerate_line_count_guard() {
        let mut config = ScanlineConfig::default();
        config.max_height_divider = 1.0; // Count rounds to zero at any intensity
        let spacing = line_spacing(480, 0.0, &config);
        assert_eq!(spacing, 480);
        let mask = generate_mask(8, 480, spacing).unwrap();
        assert_eq!(opaque_rows(&mask), 1);
    }

    #[test]
    fn test_small_image_spacing_clamps_to_one() {
        let config = ScanlineConfig::default();
        // Height far below the mapped line count: every row becomes a line
        let spacing = line_spacing(50, 1.0, &config);
        assert_eq!(spacing, 1);
    }

    #[test]
    fn test_apply_preserves_shape() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(0);
        let image = PixelBuffer::filled(64, 480, Channels::Rgb, [100, 100, 100, 0]).unwrap();

        let effect = Scanlines::with_defaults(&config);
        let out = effect.apply(&image, &config, &mut rng).unwrap();
        assert!(out.same_shape(&image));
    }
}
