//! # Retrofy
//!
//! Synthesize analog-video artifacts and composite them onto still images to
//! emulate VHS and retrowave aesthetics.
//!
//! The core is an effects-synthesis and compositing engine: procedural mask
//! generation (tape noise lines, scanlines, gaussian grain), normalized
//! intensity inputs mapped into physical units, and numerically specified
//! blend operators combining the generated buffers with the source image.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rand::{rngs::SmallRng, SeedableRng};
//! use retrofy::{config::Config, editor::Editor, effects::EffectPipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut rng = SmallRng::seed_from_u64(1986);
//!
//! let mut editor = Editor::load("photo.jpg")?;
//! let pipeline = EffectPipeline::classic_vhs(&config);
//! let styled = pipeline.apply(editor.current(), &config, &mut rng)?;
//! editor.commit(styled);
//! editor.save("photo_vhs.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`effects`] - Artifact synthesis, parameter mapping, blend operators
//! - [`buffer`] - Interleaved pixel buffers and float working copies
//! - [`editor`] - Load/save lifecycle with undo and redo history
//! - [`assets`] - Pre-rendered noise-line masks loaded from disk
//! - [`text`] - Glyph rasterization for the timestamp overlay
//! - [`config`] - Per-effect numeric bounds and defaults
//!
//! ## Custom effects
//!
//! Implement the [`Effect`](effects::Effect) trait and append the effect to a
//! pipeline, or register it with an [`EffectRegistry`](effects::EffectRegistry):
//!
//! ```rust,no_run
//! use rand::RngCore;
//! use retrofy::{buffer::PixelBuffer, config::Config, effects::Effect, error::Result};
//!
//! struct Invert;
//!
//! impl Effect for Invert {
//!     fn name(&self) -> &str {
//!         "invert"
//!     }
//!
//!     fn apply(
//!         &self,
//!         image: &PixelBuffer,
//!         _config: &Config,
//!         _rng: &mut dyn RngCore,
//!     ) -> Result<PixelBuffer> {
//!         let mut out = image.clone();
//!         for v in out.as_raw_mut() {
//!             *v = 255 - *v;
//!         }
//!         Ok(out)
//!     }
//! }
//! ```

pub mod assets;
pub mod buffer;
pub mod config;
pub mod editor;
pub mod effects;
pub mod error;
pub mod text;

// Re-export commonly used types for convenience
pub use crate::{
    buffer::{Channels, PixelBuffer},
    config::Config,
    editor::Editor,
    effects::{Effect, EffectPipeline, EffectRegistry},
    error::{Result, RetrofyError},
};
