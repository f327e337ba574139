//! Vertical wave warp
//!
//! Emulates a tape-tracking glitch by duplicating one horizontal row band
//! downward by a block: the band `[row-2s, row-s)` is copied over
//! `[row-s, row)`. When the target row sits too close to the top for the
//! required lookback, the image passes through unchanged.

use rand::{Rng, RngCore};

use crate::{
    buffer::PixelBuffer,
    config::{Config, WaveWarpConfig},
    effects::{params, Effect},
    error::Result,
};

/// Normalized inputs for the wave warp
#[derive(Debug, Clone)]
pub struct WaveWarpParams {
    /// Band-count driver, `[0,1]`; more bands means a thinner warp block
    pub intensity: f64,

    /// Target row; random when absent
    pub row: Option<u32>,
}

impl WaveWarpParams {
    pub fn from_config(config: &WaveWarpConfig) -> Self {
        Self {
            intensity: config.default_intensity,
            row: None,
        }
    }
}

/// Row-band duplication effect
pub struct WaveWarp {
    params: WaveWarpParams,
}

impl WaveWarp {
    pub fn new(params: WaveWarpParams) -> Self {
        Self { params }
    }

    pub fn with_defaults(config: &Config) -> Self {
        Self::new(WaveWarpParams::from_config(&config.wave_warp))
    }

    /// Warp block size in rows for the given image height
    pub fn block_size(&self, height: u32, config: &WaveWarpConfig) -> u32 {
        let intensity = params::clamp(self.params.intensity, 0.0, 1.0);
        let bands = params::pctg_to_value(intensity, config.max_bands as f64, 0.0) as u32;
        if bands == 0 {
            0
        } else {
            height / bands
        }
    }
}

impl Effect for WaveWarp {
    fn name(&self) -> &str {
        "wave_warp"
    }

    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let size = self.block_size(image.height(), &config.wave_warp);
        if size == 0 {
            return Ok(image.clone());
        }

        let row = match self.params.row {
            Some(row) => row.min(image.height() - 1),
            None => rng.gen_range(0..image.height()),
        };
        if row < 2 * size {
            // Not enough lookback above the target row
            return Ok(image.clone());
        }

        let mut out = image.clone();
        let stride = image.width() as usize * image.channels().count() as usize;
        let src_start = (row - 2 * size) as usize * stride;
        let dst_start = (row - size) as usize * stride;
        let band_len = size as usize * stride;

        let data = out.as_raw_mut();
        data.copy_within(src_start..src_start + band_len, dst_start);
        Ok(out)
    }
}
