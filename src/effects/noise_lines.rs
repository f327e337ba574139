//! Tape noise-line synthesis
//!
//! Simulates dropout lines: bright horizontal streaks where the tape lost
//! signal. A single-channel mask is generated probabilistically per row, with
//! the draw biased toward the frame edges where real tapes degrade first, then
//! blurred, brightness-scaled, and used as a stencil pulling the image toward
//! white.

use image::imageops;
use rand::{distributions::WeightedIndex, prelude::Distribution, seq::SliceRandom, Rng, RngCore};

use crate::{
    config::{Config, NoiseLineConfig},
    effects::{blend, params, Effect},
    assets::NoiseLineAssets,
    buffer::{check_dimensions, Mask, PixelBuffer},
    error::{RetrofyError, Result},
};

/// Line lengths are drawn as `columns / divisor`; shorter lines are likelier.
const LENGTH_DIVISORS: [usize; 4] = [5, 10, 15, 20];
const LENGTH_WEIGHTS: [f64; 4] = [0.1, 0.2, 0.3, 0.4];

/// Probability that a noise line is two rows thick instead of one
const THICK_LINE_P: f64 = 0.05;

/// Normalized inputs for the noise-line effect
#[derive(Debug, Clone)]
pub struct NoiseLineParams {
    /// Line density and pass count driver, `[0,1]`
    pub intensity: f64,

    /// Mask blur driver, `[0,1]`
    pub blur: f64,

    /// Mask brightness driver, `[0,1]`
    pub bright: f64,

    /// Use a pre-rendered mask by id instead of synthesizing one
    pub mask_id: Option<u32>,
}

impl NoiseLineParams {
    /// Defaults from the read-only config table
    pub fn from_config(config: &NoiseLineConfig) -> Self {
        Self {
            intensity: config.default_intensity,
            blur: config.default_blur,
            bright: config.default_bright,
            mask_id: None,
        }
    }
}

/// Rows in the outer tenth of the frame get a probability boost
fn edge_biased(row: usize, rows: usize) -> bool {
    row < rows / 10 || rows - row < rows / 10
}

/// Draw a length divisor; larger divisors (shorter lines) are likelier
fn length_divisor(dist: &WeightedIndex<f64>, rng: &mut dyn RngCore) -> usize {
    LENGTH_DIVISORS[dist.sample(rng)]
}

/// Generate a noise-line mask for a `width` x `height` target
///
/// High intensity maps to a low probability threshold (more rows become
/// lines) and to more accumulation passes. Rows in the outer tenth of the
/// frame get a 10% probability boost.
pub fn generate_mask(
    width: u32,
    height: u32,
    intensity: f64,
    blur: f64,
    bright: f64,
    config: &NoiseLineConfig,
    rng: &mut dyn RngCore,
) -> Result<Mask> {
    check_dimensions(width, height)?;

    let intensity = params::clamp(intensity, 0.0, 1.0);
    let blur = params::clamp(blur, 0.0, 1.0);
    let bright = params::clamp(bright, 0.0, 1.0);

    // Inverted range: intensity 1.0 hits the configured minimum threshold
    let p_threshold =
        params::translate_range(intensity, 1.0, 0.0, config.min_p_threshold, 1.0)?;
    let iterations = params::pctg_to_value(intensity, config.max_iterations as f64, 0.0) as u32;
    let blur_sigma = params::pctg_to_value(blur, config.max_blur as f64, 0.0) as f32;
    let bright_factor = params::pctg_to_value(bright, config.max_bright as f64, 0.0) as f32;

    let rows = height as usize;
    let cols = width as usize;
    let mut mask = vec![0u8; rows * cols];

    let length_dist = WeightedIndex::new(LENGTH_WEIGHTS)
        .map_err(|e| RetrofyError::generic(format!("length weights: {}", e)))?;

    for _ in 0..iterations {
        for row in 0..rows {
            let mut p: f64 = rng.gen();
            // Edge bias toward the top and bottom of the frame
            if edge_biased(row, rows) {
                p += p * 0.1;
            }

            if p <= p_threshold {
                continue;
            }

            let thickness = if rng.gen_bool(THICK_LINE_P) { 2 } else { 1 };
            let start = rng.gen_range(0..cols);
            let divisor = length_divisor(&length_dist, rng);
            let max_len = cols / divisor;
            let len = if max_len > 0 {
                rng.gen_range(0..=max_len)
            } else {
                0
            };

            let end = (start + len).min(cols);
            for r in row..(row + thickness).min(rows) {
                mask[r * cols + start..r * cols + end].fill(255);
            }

            // Shuffle an extended window around the line so each streak gets
            // its own speckle texture instead of a solid bar
            let window_end = (start + len + cols / 15).min(cols);
            mask[row * cols + start..row * cols + window_end].shuffle(rng);
        }
    }

    let mut mask = Mask::from_raw(width, height, mask).expect("mask length invariant");
    if blur_sigma > 0.0 {
        mask = imageops::blur(&mask, blur_sigma);
    }
    for px in mask.pixels_mut() {
        px.0[0] = (px.0[0] as f32 * bright_factor).min(255.0) as u8;
    }
    Ok(mask)
}

/// Tape dropout-line effect
pub struct NoiseLines {
    params: NoiseLineParams,
}

impl NoiseLines {
    pub fn new(params: NoiseLineParams) -> Self {
        Self { params }
    }

    /// Construct with the table defaults
    pub fn with_defaults(config: &Config) -> Self {
        Self::new(NoiseLineParams::from_config(&config.noise_lines))
    }
}

impl Effect for NoiseLines {
    fn name(&self) -> &str {
        "noise_lines"
    }

    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let mask = match self.params.mask_id {
            Some(id) => NoiseLineAssets::new(&config.assets.noise_lines_dir).get_resized(
                id,
                image.width(),
                image.height(),
            )?,
            None => generate_mask(
                image.width(),
                image.height(),
                self.params.intensity,
                self.params.blur,
                self.params.bright,
                &config.noise_lines,
                rng,
            )?,
        };

        // Dropout rows flash toward white, not black
        blend::composite_stencil(image, &mask, [255, 255, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_mask_shape_and_range() {
        let config = NoiseLineConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let mask = generate_mask(120, 90, 1.0, 0.5, 0.8, &config, &mut rng).unwrap();
        assert_eq!(mask.dimensions(), (120, 90));
        // Luma<u8> guarantees range; make sure something was actually drawn
        assert!(mask.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn test_length_divisors_favor_short_lines() {
        // Divisor 20 carries the heaviest weight, divisor 5 the lightest,
        // so shorter lines must dominate any sizable seeded sample
        let mut rng = StdRng::seed_from_u64(21);
        let dist = WeightedIndex::new(LENGTH_WEIGHTS).unwrap();

        let mut counts = [0usize; LENGTH_DIVISORS.len()];
        for _ in 0..4000 {
            let divisor = length_divisor(&dist, &mut rng);
            let slot = LENGTH_DIVISORS.iter().position(|&d| d == divisor).unwrap();
            counts[slot] += 1;
        }

        assert!(counts[3] > counts[2]);
        assert!(counts[2] > counts[1]);
        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn test_edge_rows_are_biased() {
        assert!(edge_biased(0, 100));
        assert!(edge_biased(3, 100));
        assert!(edge_biased(95, 100));
        assert!(!edge_biased(10, 100));
        assert!(!edge_biased(50, 100));
        assert!(!edge_biased(90, 100));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = NoiseLineConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_mask(0, 50, 0.5, 0.5, 0.5, &config, &mut rng).is_err());
    }

    #[test]
    fn test_zero_intensity_yields_empty_mask() {
        // No iterations means no lines regardless of the rng
        let config = NoiseLineConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mask = generate_mask(64, 64, 0.0, 0.0, 1.0, &config, &mut rng).unwrap();
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_out_of_range_intensity_is_clamped() {
        let config = NoiseLineConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        assert!(generate_mask(32, 32, 4.2, -1.0, 0.5, &config, &mut rng).is_ok());
    }

    #[test]
    fn test_apply_preserves_shape_and_channels() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(11);
        let image = PixelBuffer::filled(80, 60, Channels::Rgb, [10, 10, 10, 0]).unwrap();

        let effect = NoiseLines::new(NoiseLineParams {
            intensity: 1.0,
            blur: 0.2,
            bright: 1.0,
            mask_id: None,
        });
        let out = effect.apply(&image, &config, &mut rng).unwrap();
        assert!(out.same_shape(&image));
        assert_eq!(out.channels(), Channels::Rgb);
    }

    #[test]
    fn test_missing_mask_id_fails() {
        let mut config = Config::default();
        config.assets.noise_lines_dir = std::env::temp_dir().join("retrofy-no-such-dir");
        let mut rng = StdRng::seed_from_u64(1);
        let image = PixelBuffer::filled(16, 16, Channels::Rgb, [0, 0, 0, 0]).unwrap();

        let effect = NoiseLines::new(NoiseLineParams {
            mask_id: Some(99),
            ..NoiseLineParams::from_config(&config.noise_lines)
        });
        assert!(effect.apply(&image, &config, &mut rng).is_err());
    }
}
