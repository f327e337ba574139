//! # Effect System
//!
//! Procedural analog-artifact synthesis and compositing. Each effect is a
//! pure function of `(buffer, params, rng)` returning a new buffer; the
//! normalized inputs are mapped through [`params`] into physical units and
//! combined with the source image through the [`blend`] operators.
//!
//! ## Built-in effects
//!
//! - **Noise lines**: probabilistic tape-dropout line mask, edge-biased
//! - **Color glitch**: channel-split chromatic offset
//! - **Film grain**: gaussian grain overlay
//! - **Scanlines**: periodic horizontal line mask, soft-light composited
//! - **Wave warp**: vertical row-band duplication (tracking error)
//! - **Timestamp**: VCR on-screen-display overlay
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rand::{rngs::SmallRng, SeedableRng};
//! use retrofy::{
//!     config::Config,
//!     buffer::{Channels, PixelBuffer},
//!     effects::{Effect, EffectPipeline},
//! };
//!
//! # fn main() -> retrofy::error::Result<()> {
//! let config = Config::default();
//! let mut rng = SmallRng::seed_from_u64(7);
//! let image = PixelBuffer::filled(640, 480, Channels::Rgb, [40, 40, 60, 0])?;
//!
//! let pipeline = EffectPipeline::classic_vhs(&config);
//! let styled = pipeline.apply(&image, &config, &mut rng)?;
//! # Ok(())
//! # }
//! ```

pub mod blend;
pub mod color_glitch;
pub mod film_grain;
pub mod noise_lines;
pub mod params;
pub mod pipeline;
pub mod scanlines;
pub mod timestamp;
pub mod wave_warp;

use rand::RngCore;

use crate::{buffer::PixelBuffer, config::Config, error::Result};

pub use color_glitch::{ColorGlitch, ColorGlitchParams};
pub use film_grain::{FilmGrain, FilmGrainParams};
pub use noise_lines::{NoiseLineParams, NoiseLines};
pub use pipeline::{EffectPipeline, EffectRegistry};
pub use scanlines::{ScanlineParams, Scanlines};
pub use timestamp::{OverlayItem, OverlayLayout, Timestamp, TimestampParams};
pub use wave_warp::{WaveWarp, WaveWarpParams};

/// Core trait implemented by every artifact effect
///
/// Effects never mutate their input buffer; a failed application leaves the
/// caller's buffer untouched. Stochastic effects draw from the injected rng,
/// so seeding the generator makes a whole pipeline reproducible.
pub trait Effect: Send + Sync {
    /// Unique name of this effect
    fn name(&self) -> &str;

    /// Apply the effect, producing a new buffer
    ///
    /// `config` is the read-only bounds table the normalized parameters are
    /// mapped through; effects borrow it and never copy or mutate it.
    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer>;
}
