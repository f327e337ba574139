//! Normalized parameter mapping
//!
//! Every effect takes intensity-like inputs in `[0,1]` and maps them through
//! these helpers into physical units: pixel offsets, blur radii, probability
//! thresholds, iteration counts. All three functions are pure.

use crate::error::{EffectError, Result};

/// Saturating clamp with inclusive bounds
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Scale a normalized percentage onto `[min, max]`
///
/// `pctg * max`, then clamped. The percentage itself is clamped to `[0,1]`
/// first so out-of-domain inputs degrade gracefully instead of erroring.
pub fn pctg_to_value(pctg: f64, max: f64, min: f64) -> f64 {
    let pctg = clamp(pctg, 0.0, 1.0);
    clamp(pctg * max, min, max)
}

/// Affine remap of `value` from `[from_min, from_max]` onto `[to_min, to_max]`
///
/// The source range may be inverted (`from_min > from_max`) to flip the
/// mapping, which is how intensity becomes a probability threshold for the
/// noise lines. A degenerate source range is rejected.
pub fn translate_range(
    value: f64,
    from_min: f64,
    from_max: f64,
    to_min: f64,
    to_max: f64,
) -> Result<f64> {
    let from_range = from_max - from_min;
    if from_range == 0.0 {
        return Err(EffectError::DegenerateRange {
            from_min,
            from_max,
        }
        .into());
    }
    let scaled = (value - from_min) / from_range;
    Ok(to_min + scaled * (to_max - to_min))
}
