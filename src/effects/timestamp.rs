//! VCR on-screen-display overlay
//!
//! Derives the layout of the classic camcorder OSD: transport status in the
//! top corners, a counter and a date/time block at the bottom. This effect
//! computes geometry and strings only; glyph rasterization is delegated to
//! the text collaborator, so a missing font is fatal to this effect alone.

use chrono::{NaiveDate, NaiveDateTime};
use rand::{Rng, RngCore};

use crate::{
    buffer::PixelBuffer,
    config::{Config, TimestampConfig},
    effects::{params, Effect},
    error::{EffectError, Result, RetrofyError},
    text::TextRenderer,
};

/// Inputs for the timestamp overlay
///
/// `datetime` and `hour` are mutually exclusive: an explicit timestamp
/// already carries its hour.
#[derive(Debug, Clone, Default)]
pub struct TimestampParams {
    /// Type-size driver, `[0,1]`
    pub intensity: f64,

    /// Explicit timestamp to display
    pub datetime: Option<NaiveDateTime>,

    /// Hour constraint for a synthesized timestamp, `0..=23`
    pub hour: Option<u32>,
}

impl TimestampParams {
    pub fn from_config(config: &TimestampConfig) -> Self {
        Self {
            intensity: config.default_intensity,
            datetime: None,
            hour: None,
        }
    }
}

/// One positioned run of text for the text collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayItem {
    pub text: String,
    pub x: u32,
    pub y: u32,
}

/// Complete layout instructions for one overlay rendering pass
#[derive(Debug, Clone)]
pub struct OverlayLayout {
    pub items: Vec<OverlayItem>,
    pub font_size: f32,
    /// The timestamp being displayed, synthesized or explicit
    pub datetime: NaiveDateTime,
}

/// Timestamp overlay effect
pub struct Timestamp {
    params: TimestampParams,
}

impl Timestamp {
    pub fn new(params: TimestampParams) -> Self {
        Self { params }
    }

    pub fn with_defaults(config: &Config) -> Self {
        Self::new(TimestampParams::from_config(&config.timestamp))
    }

    /// Pick or synthesize the timestamp to display
    fn resolve_datetime(
        &self,
        config: &TimestampConfig,
        rng: &mut dyn RngCore,
    ) -> Result<NaiveDateTime> {
        if self.params.datetime.is_some() && self.params.hour.is_some() {
            return Err(EffectError::ConflictingParameters {
                details: "'datetime' and 'hour' are mutually exclusive".to_string(),
            }
            .into());
        }
        if let Some(dt) = self.params.datetime {
            return Ok(dt);
        }
        if let Some(hour) = self.params.hour {
            if hour > 23 {
                return Err(EffectError::InvalidParameterRange {
                    details: format!("hour {} outside 0..=23", hour),
                }
                .into());
            }
        }

        let year = rng.gen_range(config.min_year..=config.max_year);
        let month = rng.gen_range(1..=12);
        // Capped at 28 so every month/year combination is valid
        let day = rng.gen_range(1..=28);
        let hour = self.params.hour.unwrap_or_else(|| rng.gen_range(0..24));
        let minute = rng.gen_range(0..60);

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| RetrofyError::generic("synthesized timestamp out of range"))
    }

    /// Derive overlay geometry and strings for a `width` x `height` target
    pub fn layout(
        &self,
        width: u32,
        height: u32,
        config: &TimestampConfig,
        rng: &mut dyn RngCore,
    ) -> Result<OverlayLayout> {
        let datetime = self.resolve_datetime(config, rng)?;

        let intensity = params::clamp(self.params.intensity, 0.0, 1.0);
        // Higher intensity shrinks the divisor, growing the type
        let divisor = params::translate_range(
            intensity,
            0.0,
            1.0,
            config.max_font_divisor,
            config.min_font_divisor,
        )?;
        let font_size = width as f32 / divisor as f32;

        let margin_x = width / 16;
        let margin_y = height / 14;
        let line_gap = (font_size * 1.3) as u32;

        // Rough advance for right-aligning without font metrics; the OSD
        // aesthetic is tolerant of a few pixels of slack
        let advance = font_size * 0.6;

        let sp_x = width.saturating_sub(margin_x + (advance * 2.0) as u32);
        let bottom_y = height.saturating_sub(margin_y + 2 * line_gap);

        let time_line = datetime.format("%H:%M").to_string();
        let date_line = datetime.format("%b. %d %Y").to_string().to_uppercase();

        let items = vec![
            OverlayItem {
                text: "\u{25B6} PLAY".to_string(),
                x: margin_x,
                y: margin_y,
            },
            OverlayItem {
                text: "SP".to_string(),
                x: sp_x,
                y: margin_y,
            },
            OverlayItem {
                text: "--:--".to_string(),
                x: margin_x,
                y: bottom_y.saturating_sub(line_gap),
            },
            OverlayItem {
                text: time_line,
                x: margin_x,
                y: bottom_y,
            },
            OverlayItem {
                text: date_line,
                x: margin_x,
                y: bottom_y + line_gap,
            },
        ];

        Ok(OverlayLayout {
            items,
            font_size,
            datetime,
        })
    }
}

impl Effect for Timestamp {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn apply(
        &self,
        image: &PixelBuffer,
        config: &Config,
        rng: &mut dyn RngCore,
    ) -> Result<PixelBuffer> {
        let layout = self.layout(image.width(), image.height(), &config.timestamp, rng)?;
        let renderer = TextRenderer::load(&config.timestamp.font_path)?;

        let mut out = image.clone();
        for item in &layout.items {
            renderer.draw(&mut out, item, layout.font_size, [235, 235, 235]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rand::{rngs::StdRng, SeedableRng};

    fn timestamp(params: TimestampParams) -> Timestamp {
        Timestamp::new(params)
    }

    #[test]
    fn test_conflicting_parameters_rejected() {
        let config = TimestampConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let dt = NaiveDate::from_ymd_opt(1987, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let effect = timestamp(TimestampParams {
            intensity: 0.5,
            datetime: Some(dt),
            hour: Some(8),
        });
        assert!(effect.layout(640, 480, &config, &mut rng).is_err());
    }

    #[test]
    fn test_hour_constraint_respected() {
        let config = TimestampConfig::default();
        let mut rng = StdRng::seed_from_u64(17);

        let effect = timestamp(TimestampParams {
            intensity: 0.5,
            datetime: None,
            hour: Some(23),
        });
        let layout = effect.layout(640, 480, &config, &mut rng).unwrap();
        assert_eq!(layout.datetime.hour(), 23);
        assert_eq!(layout.datetime.format("%H").to_string(), "23");
    }

    #[test]
    fn test_synthesized_year_in_configured_range() {
        let config = TimestampConfig::default();
        let mut rng = StdRng::seed_from_u64(3);

        let effect = timestamp(TimestampParams::from_config(&config));
        for _ in 0..32 {
            let layout = effect.layout(320, 240, &config, &mut rng).unwrap();
            let year = layout.datetime.format("%Y").to_string().parse::<i32>().unwrap();
            assert!((config.min_year..=config.max_year).contains(&year));
        }
    }

    #[test]
    fn test_invalid_hour_rejected() {
        let config = TimestampConfig::default();
        let mut rng = StdRng::seed_from_u64(0);

        let effect = timestamp(TimestampParams {
            intensity: 0.5,
            datetime: None,
            hour: Some(24),
        });
        assert!(effect.layout(640, 480, &config, &mut rng).is_err());
    }

    #[test]
    fn test_layout_contains_osd_literals() {
        let config = TimestampConfig::default();
        let mut rng = StdRng::seed_from_u64(0);

        let effect = timestamp(TimestampParams::from_config(&config));
        let layout = effect.layout(640, 480, &config, &mut rng).unwrap();

        let texts: Vec<&str> = layout.items.iter().map(|i| i.text.as_str()).collect();
        assert!(texts.iter().any(|t| t.contains("PLAY")));
        assert!(texts.contains(&"SP"));
        assert!(texts.contains(&"--:--"));
        assert_eq!(layout.items.len(), 5);
    }

    #[test]
    fn test_font_size_grows_with_intensity() {
        let config = TimestampConfig::default();
        let mut rng = StdRng::seed_from_u64(0);

        let small = timestamp(TimestampParams {
            intensity: 0.0,
            ..Default::default()
        })
        .layout(640, 480, &config, &mut rng)
        .unwrap();
        let large = timestamp(TimestampParams {
            intensity: 1.0,
            ..Default::default()
        })
        .layout(640, 480, &config, &mut rng)
        .unwrap();
        assert!(large.font_size > small.font_size);
    }
}
