use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Main configuration for Retrofy
///
/// Holds the per-effect numeric bounds and defaults that the effect core maps
/// normalized `[0,1]` inputs through. The table is read-only from the point of
/// view of the effects: they borrow it, never own or mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tape noise-line synthesis bounds
    pub noise_lines: NoiseLineConfig,

    /// RGB channel misalignment bounds
    pub color_glitch: ColorGlitchConfig,

    /// Film grain bounds
    pub film_grain: FilmGrainConfig,

    /// Scanline mask bounds
    pub scanlines: ScanlineConfig,

    /// Vertical wave warp bounds
    pub wave_warp: WaveWarpConfig,

    /// Timestamp overlay bounds
    pub timestamp: TimestampConfig,

    /// External asset locations
    pub assets: AssetConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            noise_lines: NoiseLineConfig::default(),
            color_glitch: ColorGlitchConfig::default(),
            film_grain: FilmGrainConfig::default(),
            scanlines: ScanlineConfig::default(),
            wave_warp: WaveWarpConfig::default(),
            timestamp: TimestampConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.noise_lines.validate()?;
        self.color_glitch.validate()?;
        self.scanlines.validate()?;
        self.wave_warp.validate()?;
        self.timestamp.validate()?;
        Ok(())
    }
}

/// Bounds for the tape noise-line synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLineConfig {
    /// Maximum number of accumulation passes at intensity 1.0
    pub max_iterations: u32,

    /// Maximum gaussian blur sigma applied to the mask
    pub max_blur: f32,

    /// Maximum brightness multiplier applied to the mask
    pub max_bright: f32,

    /// Probability threshold at intensity 1.0; lower means more lines
    pub min_p_threshold: f64,

    /// Default normalized inputs
    pub default_intensity: f64,
    pub default_blur: f64,
    pub default_bright: f64,
}

impl Default for NoiseLineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            max_blur: 3.0,
            max_bright: 2.5,
            min_p_threshold: 0.99,
            default_intensity: 0.4,
            default_blur: 0.8,
            default_bright: 0.6,
        }
    }
}

impl NoiseLineConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.min_p_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "noise_lines.min_p_threshold".to_string(),
                value: self.min_p_threshold.to_string(),
            }
            .into());
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "noise_lines.max_iterations".to_string(),
                value: self.max_iterations.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Bounds for the RGB channel-split glitch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGlitchConfig {
    /// Maximum channel offset in pixels at intensity 1.0
    pub max_offset: u32,

    pub default_intensity: f64,
}

impl Default for ColorGlitchConfig {
    fn default() -> Self {
        Self {
            max_offset: 10,
            default_intensity: 0.3,
        }
    }
}

impl ColorGlitchConfig {
    fn validate(&self) -> Result<()> {
        if self.max_offset == 0 {
            return Err(ConfigError::InvalidValue {
                key: "color_glitch.max_offset".to_string(),
                value: self.max_offset.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Bounds for the film grain synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilmGrainConfig {
    /// Maximum gaussian blur sigma applied to the grain buffer
    pub max_blur: f32,

    /// Standard deviation of the gaussian noise source. Deliberately huge so
    /// the wrapping u8 reduction spreads samples across the full byte range.
    pub gaussian_std: f64,

    pub default_intensity: f64,
    pub default_blur: f64,
}

impl Default for FilmGrainConfig {
    fn default() -> Self {
        Self {
            max_blur: 1.5,
            gaussian_std: 100_000.0,
            default_intensity: 0.5,
            default_blur: 0.3,
        }
    }
}

/// Bounds for the scanline mask
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanlineConfig {
    /// Maximum line count at full mapped intensity
    pub max_height_divider: f64,

    /// Maximum gaussian blur sigma applied to the mask
    pub max_blur: f32,

    pub default_intensity: f64,
    pub default_blur: f64,
}

impl Default for ScanlineConfig {
    fn default() -> Self {
        Self {
            max_height_divider: 500.0,
            max_blur: 2.0,
            default_intensity: 0.5,
            default_blur: 0.5,
        }
    }
}

impl ScanlineConfig {
    fn validate(&self) -> Result<()> {
        if self.max_height_divider <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "scanlines.max_height_divider".to_string(),
                value: self.max_height_divider.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Bounds for the vertical wave warp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveWarpConfig {
    /// Maximum warp-band count at intensity 1.0; block size is height / bands
    pub max_bands: u32,

    pub default_intensity: f64,
}

impl Default for WaveWarpConfig {
    fn default() -> Self {
        Self {
            max_bands: 10,
            default_intensity: 0.5,
        }
    }
}

impl WaveWarpConfig {
    fn validate(&self) -> Result<()> {
        if self.max_bands == 0 {
            return Err(ConfigError::InvalidValue {
                key: "wave_warp.max_bands".to_string(),
                value: self.max_bands.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Bounds for the timestamp overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampConfig {
    /// Width divisor at intensity 0.0 (smallest type)
    pub max_font_divisor: f64,

    /// Width divisor at intensity 1.0 (largest type)
    pub min_font_divisor: f64,

    /// Inclusive year range for synthesized timestamps
    pub min_year: i32,
    pub max_year: i32,

    /// Font file used by the text-rendering collaborator
    pub font_path: PathBuf,

    pub default_intensity: f64,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            max_font_divisor: 18.0,
            min_font_divisor: 8.0,
            min_year: 1980,
            max_year: 1990,
            font_path: PathBuf::from("assets/fonts/vcr_osd_mono.ttf"),
            default_intensity: 0.5,
        }
    }
}

impl TimestampConfig {
    fn validate(&self) -> Result<()> {
        if self.min_year > self.max_year {
            return Err(ConfigError::InvalidValue {
                key: "timestamp.year_range".to_string(),
                value: format!("{}-{}", self.min_year, self.max_year),
            }
            .into());
        }
        if self.min_font_divisor <= 0.0 || self.max_font_divisor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "timestamp.font_divisor".to_string(),
                value: format!("{}-{}", self.min_font_divisor, self.max_font_divisor),
            }
            .into());
        }
        Ok(())
    }
}

/// Locations of pre-rendered assets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Folder holding pre-rendered noise-line masks named `{id}.png`
    pub noise_lines_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            noise_lines_dir: PathBuf::from("assets/noise_lines"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let original = Config::default();
        original.save_to_file(&file_path).unwrap();
        let loaded = Config::from_file(&file_path).unwrap();

        assert_eq!(original.noise_lines.max_iterations, loaded.noise_lines.max_iterations);
        assert_eq!(original.color_glitch.max_offset, loaded.color_glitch.max_offset);
        assert_eq!(original.scanlines.max_height_divider, loaded.scanlines.max_height_divider);
        assert_eq!(original.timestamp.min_year, loaded.timestamp.min_year);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        config.noise_lines.min_p_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_year_range_rejected() {
        let mut config = Config::default();
        config.timestamp.min_year = 1995;
        config.timestamp.max_year = 1985;
        assert!(config.validate().is_err());
    }
}
