use std::collections::HashMap;

use rand::RngCore;
use tracing::{debug, info, warn};

use crate::{
    buffer::PixelBuffer,
    config::Config,
    effects::{ColorGlitch, Effect, FilmGrain, NoiseLines, Scanlines, Timestamp, WaveWarp},
    error::{ImageError, Result, RetrofyError},
};

/// Ordered sequence of effects applied over one working buffer
///
/// Each stage consumes the previous stage's output, so the order is
/// semantically significant: grain laid over scanlines looks different from
/// scanlines cut through grain. The input buffer is never mutated; callers
/// keep their own history.
pub struct EffectPipeline {
    stages: Vec<Box<dyn Effect>>,
}

impl EffectPipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The canonical VHS look: noise lines, color glitch, scanlines, grain
    pub fn classic_vhs(config: &Config) -> Self {
        Self::new()
            .with(Box::new(NoiseLines::with_defaults(config)))
            .with(Box::new(ColorGlitch::with_defaults(config)))
            .with(Box::new(Scanlines::with_defaults(config)))
            .with(Box::new(FilmGrain::with_defaults(config)))
    }

    /// Append a stage
    pub fn with(mut self, effect: Box<dyn Effect>) -> Self {
        self.stages.push(effect);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, producing a new buffer
    ///
    /// A missing font resource skips the timestamp overlay with a warning
    /// instead of aborting the whole pipeline; any other failure propagates
    /// and leaves the caller's buffer untouched.
    pub fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let mut working = image.clone();
        for (index, stage) in self.stages.iter().enumerate() {
            debug!("Stage {}/{}: {}", index + 1, self.stages.len(), stage.name());
            match stage.apply(&working, config, rng) {
                Ok(next) => {
                    info!(
                        "Applied {} ({}x{} -> {}x{})",
                        stage.name(),
                        working.width(),
                        working.height(),
                        next.width(),
                        next.height()
                    );
                    working = next;
                }
                Err(RetrofyError::Image(ImageError::FontResourceMissing { path })) => {
                    warn!("Skipping {}: font resource missing at {}", stage.name(), path);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(working)
    }
}

impl Default for EffectPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry for constructing effects by name
///
/// Factories build each effect with its table defaults; the CLI uses this to
/// turn a comma-separated effect list into a pipeline.
pub struct EffectRegistry {
    factories: HashMap<String, Box<dyn Fn(&Config) -> Box<dyn Effect>>>,
}

impl EffectRegistry {
    /// Create a registry with all built-in effects
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register_builtin_effects();
        registry
    }

    fn register_builtin_effects(&mut self) {
        self.register("noise_lines".to_string(), |config| {
            Box::new(NoiseLines::with_defaults(config))
        });
        self.register("color_glitch".to_string(), |config| {
            Box::new(ColorGlitch::with_defaults(config))
        });
        self.register("scanlines".to_string(), |config| {
            Box::new(Scanlines::with_defaults(config))
        });
        self.register("film_grain".to_string(), |config| {
            Box::new(FilmGrain::with_defaults(config))
        });
        self.register("wave_warp".to_string(), |config| {
            Box::new(WaveWarp::with_defaults(config))
        });
        self.register("timestamp".to_string(), |config| {
            Box::new(Timestamp::with_defaults(config))
        });
    }

    /// Register a custom effect factory
    pub fn register<F>(&mut self, name: String, factory: F)
    where
        F: Fn(&Config) -> Box<dyn Effect> + 'static,
    {
        self.factories.insert(name, Box::new(factory));
    }

    /// Construct an effect by name with table defaults
    pub fn get_effect(&self, name: &str, config: &Config) -> Option<Box<dyn Effect>> {
        self.factories.get(name).map(|factory| factory(config))
    }

    /// All registered effect names
    pub fn available_effects(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build a pipeline from an ordered list of effect names
    pub fn build_pipeline(&self, names: &[&str], config: &Config) -> Result<EffectPipeline> {
        let mut pipeline = EffectPipeline::new();
        for name in names {
            let effect = self.get_effect(name, config).ok_or_else(|| {
                RetrofyError::generic(format!(
                    "Unknown effect '{}'. Available: {}",
                    name,
                    self.available_effects().join(", ")
                ))
            })?;
            pipeline = pipeline.with(effect);
        }
        Ok(pipeline)
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Channels;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_builtin_effects_available() {
        let registry = EffectRegistry::new();
        for name in [
            "noise_lines",
            "color_glitch",
            "scanlines",
            "film_grain",
            "wave_warp",
            "timestamp",
        ] {
            assert!(registry.has_effect(name), "missing builtin {}", name);
        }
        assert_eq!(registry.available_effects().len(), 6);
    }

    #[test]
    fn test_unknown_effect_rejected() {
        let registry = EffectRegistry::new();
        let config = Config::default();
        assert!(registry.build_pipeline(&["vignette"], &config).is_err());
    }

    #[test]
    fn test_classic_vhs_order_and_length() {
        let config = Config::default();
        let pipeline = EffectPipeline::classic_vhs(&config);
        assert_eq!(pipeline.len(), 4);
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let config = Config::default();
        let mut rng = StdRng::seed_from_u64(99);
        let image = PixelBuffer::filled(100, 100, Channels::Rgb, [60, 80, 120, 0]).unwrap();

        let pipeline = EffectPipeline::classic_vhs(&config);
        let out = pipeline.apply(&image, &config, &mut rng).unwrap();

        // Color glitch crops by the configured max offset at its default
        // intensity; every later stage is shape-preserving
        let offset = (config.color_glitch.default_intensity
            * config.color_glitch.max_offset as f64) as u32;
        assert_eq!(out.width(), 100 - 2 * offset);
        assert_eq!(out.height(), 100 - 2 * offset);
    }

    #[test]
    fn test_missing_font_skips_timestamp_stage() {
        let mut config = Config::default();
        config.timestamp.font_path = std::env::temp_dir().join("retrofy-no-such-font.ttf");
        let mut rng = StdRng::seed_from_u64(4);
        let image = PixelBuffer::filled(64, 64, Channels::Rgb, [10, 10, 10, 0]).unwrap();

        let registry = EffectRegistry::new();
        let pipeline = registry.build_pipeline(&["timestamp"], &config).unwrap();
        let out = pipeline.apply(&image, &config, &mut rng).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_seeded_pipeline_is_reproducible() {
        let config = Config::default();
        let image = PixelBuffer::filled(48, 48, Channels::Rgb, [90, 30, 150, 0]).unwrap();
        let pipeline = EffectPipeline::classic_vhs(&config);

        let mut rng_a = StdRng::seed_from_u64(2024);
        let mut rng_b = StdRng::seed_from_u64(2024);
        let out_a = pipeline.apply(&image, &config, &mut rng_a).unwrap();
        let out_b = pipeline.apply(&image, &config, &mut rng_b).unwrap();
        assert_eq!(out_a, out_b);
    }
}
