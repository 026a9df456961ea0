//! Portamento.
//!
//! A one-pole smoother on frequency: every sample the current value moves a
//! fraction `λ = sampleTime / glideTime` of the way towards the target.
//! λ is clamped to [0, 1] so a glide time shorter than one sample snaps
//! straight to the target instead of overshooting.

use crate::dsp::modulate::FREQ_C4;

/// Shortest glide time in seconds.
pub const MIN_GLIDE_TIME: f32 = 0.001;
/// Glide time added at full glide amount.
pub const GLIDE_RANGE: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct Portamento {
    current: f32,
    initial: f32,
}

impl Portamento {
    /// Start resting at `initial` Hz.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            initial,
        }
    }

    /// Glide time for a normalized glide amount.
    #[inline]
    pub fn glide_time(amount: f32) -> f32 {
        MIN_GLIDE_TIME + amount * GLIDE_RANGE
    }

    /// Move towards `target` and return the smoothed value.
    #[inline]
    pub fn next(&mut self, target: f32, amount: f32, sample_time: f32) -> f32 {
        let lambda = (sample_time / Self::glide_time(amount)).clamp(0.0, 1.0);
        self.current += (target - self.current) * lambda;
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Portamento {
    fn default() -> Self {
        Self::new(FREQ_C4)
    }
}
