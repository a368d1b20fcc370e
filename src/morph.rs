//! Interpolation primitives shared by the morph engines.
//!
//! Both engines use frame-rate dependent exponential smoothing:
//! `value = lerp(value, target, dt * rate)`. A larger `dt` or `rate` moves
//! the value proportionally closer each tick, approaching the target
//! asymptotically.

use crate::Vec3;

/// Number of speed bands particles are spread across.
pub const SPEED_BANDS: usize = 5;
/// Extra speed per band.
pub const SPEED_BAND_STEP: f32 = 0.1;

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lerp factor for one frame of exponential smoothing.
///
/// Clamped to `[0, 1]` so a long frame lands on the target instead of
/// overshooting it.
#[inline]
pub fn step_factor(delta: f32, rate: f32) -> f32 {
    (delta * rate).clamp(0.0, 1.0)
}

/// Per-index speed multiplier: `1.0, 1.1, 1.2, 1.3, 1.4`, repeating.
///
/// Staggers arrival so a group doesn't snap into place in lockstep.
#[inline]
pub fn speed_band(index: usize) -> f32 {
    1.0 + (index % SPEED_BANDS) as f32 * SPEED_BAND_STEP
}

/// Idle spin for instance `index` at `elapsed` seconds, as XYZ Euler angles.
///
/// The index offset decorrelates neighbouring instances.
#[inline]
pub fn idle_rotation(index: usize, elapsed: f32) -> Vec3 {
    let phase = index as f32;
    Vec3::new(elapsed * 0.5 + phase, elapsed * 0.3 + phase, 0.0)
}
