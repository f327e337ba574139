//! Film grain synthesis
//!
//! A full-frame gaussian noise field is pulled toward neutral gray by the
//! intensity, softened, and overlay-composited onto the image. The noise
//! source uses a deliberately huge standard deviation so the wrapping 8-bit
//! reduction spreads samples across the whole byte range.

use image::imageops;
use rand::RngCore;
use rand_distr::{Distribution, Normal};

use crate::{
    buffer::{FloatBuffer, PixelBuffer},
    config::{Config, FilmGrainConfig},
    effects::{blend, params, Effect},
    error::{RetrofyError, Result},
};

/// Neutral gray the grain is blended against; chosen slightly below middle
/// gray so the overlay pass darkens marginally more than it brightens.
const GRAIN_GRAY: f32 = 119.0;

/// Normalized inputs for the film grain effect
#[derive(Debug, Clone)]
pub struct FilmGrainParams {
    /// Grain visibility driver, `[0,1]`
    pub intensity: f64,

    /// Grain softness driver, `[0,1]`
    pub blur: f64,
}

impl FilmGrainParams {
    pub fn from_config(config: &FilmGrainConfig) -> Self {
        Self {
            intensity: config.default_intensity,
            blur: config.default_blur,
        }
    }
}

/// Gaussian grain overlay effect
pub struct FilmGrain {
    params: FilmGrainParams,
}

impl FilmGrain {
    pub fn new(params: FilmGrainParams) -> Self {
        Self { params }
    }

    pub fn with_defaults(config: &Config) -> Self {
        Self::new(FilmGrainParams::from_config(&config.film_grain))
    }
}

/// Sample a grain field and reduce it to gray RGBA floats
fn grain_field(
    width: u32,
    height: u32,
    std_dev: f64,
    rng: &mut dyn RngCore,
) -> Result<FloatBuffer> {
    let normal = Normal::new(0.0, std_dev)
        .map_err(|e| RetrofyError::generic(format!("grain distribution: {}", e)))?;

    let pixels = width as usize * height as usize;
    let mut data = Vec::with_capacity(pixels * 4);
    for _ in 0..pixels {
        // Wrapping cast to u8; with a large sigma this is close to uniform
        let sample = normal.sample(rng);
        let v = (sample as i64).rem_euclid(256) as f32;
        data.extend_from_slice(&[v, v, v, 255.0]);
    }
    Ok(FloatBuffer {
        width,
        height,
        data,
    })
}

impl Effect for FilmGrain {
    fn name(&self) -> &str {
        "film_grain"
    }

    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let intensity = params::clamp(self.params.intensity, 0.0, 1.0);
        let blur = params::clamp(self.params.blur, 0.0, 1.0);
        let blur_sigma = params::pctg_to_value(blur, config.film_grain.max_blur as f64, 0.0) as f32;

        let (width, height) = (image.width(), image.height());
        let noise = grain_field(width, height, config.film_grain.gaussian_std, rng)?;
        let gray = FloatBuffer::flat(width, height, [GRAIN_GRAY, GRAIN_GRAY, GRAIN_GRAY, 255.0])?;

        // At intensity 0 this collapses to the flat gray field
        let mut grain = blend::linear(&gray, &noise, intensity)?;
        if blur_sigma > 0.0 {
            let blurred = imageops::blur(&grain.finalize().to_rgba_image(), blur_sigma);
            grain = PixelBuffer::from_rgba_image(blurred).to_float();
        }

        let base = image.to_float();
        let composited = blend::overlay(&base, &grain, intensity / 2.0)?;
        Ok(composited.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_zero_intensity_is_identity() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(5);
        let image = PixelBuffer::filled(32, 32, Channels::Rgb, [83, 41, 200, 0]).unwrap();

        let effect = FilmGrain::new(FilmGrainParams {
            intensity: 0.0,
            blur: 0.3,
        });
        let out = effect.apply(&image, &config, &mut rng).unwrap();

        let expected = image.to_rgba();
        for y in 0..32 {
            for x in 0..32 {
                let a = expected.pixel(x, y);
                let b = out.pixel(x, y);
                for c in 0..3 {
                    assert!(
                        (a[c] as i32 - b[c] as i32).abs() <= 1,
                        "channel {} drifted: {} vs {}",
                        c,
                        a[c],
                        b[c]
                    );
                }
            }
        }
    }

    #[test]
    fn test_full_intensity_changes_pixels() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(5);
        let image = PixelBuffer::filled(32, 32, Channels::Rgb, [90, 90, 90, 0]).unwrap();

        let effect = FilmGrain::new(FilmGrainParams {
            intensity: 1.0,
            blur: 0.0,
        });
        let out = effect.apply(&image, &config, &mut rng).unwrap();
        assert!(out.same_shape(&image));

        let changed = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| out.pixel(x, y)[0] != 90)
            .count();
        assert!(changed > 100, "grain barely visible: {} pixels changed", changed);
    }

    #[test]
    fn test_grain_field_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = grain_field(16, 9, 100_000.0, &mut rng).unwrap();
        assert_eq!((field.width(), field.height()), (16, 9));
    }
}
