//! First-order all-pass dispersion.
//!
//! An all-pass filter passes every frequency at the same level and only
//! shifts phase. One first-order stage has a single memory cell:
//!
//! ```text
//! H(z) = (c + z⁻¹) / (1 + c·z⁻¹)
//!
//! output = −c·input + state
//! state  = input + c·output
//! ```
//!
//! Low frequencies pass almost untouched; the phase lag grows towards 180°
//! at Nyquist, and larger `c` moves the transition lower. Cascading several
//! stages with rising coefficients smears transients in time ("dispersion")
//! while leaving the magnitude spectrum flat.
//!
//! # Stability
//!
//! |c| < 1 keeps the pole inside the unit circle. Callers clamp coefficients
//! to [0, 0.95], and the memory cell is clamped after each update.

use crate::dsp::STATE_LIMIT;

/// Envelope for all-pass memory cells.
///
/// The cell holds `input + c·output`, not a signal, so a full-scale input
/// settles it at up to `(1 + c)·10`: 19.5 at c = 0.95. Clamping it at the
/// signal limit would distort a ±10 V input.
pub const ALLPASS_STATE_LIMIT: f32 = 2.0 * STATE_LIMIT;

/// Single first-order all-pass section.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllpassStage {
    state: f32,
}

impl AllpassStage {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, input: f32, coefficient: f32) -> f32 {
        let output = -coefficient * input + self.state;
        self.state = (input + coefficient * output).clamp(-ALLPASS_STATE_LIMIT, ALLPASS_STATE_LIMIT);
        output
    }

    pub fn state(&self) -> f32 {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// `N` all-pass stages in series.
#[derive(Debug, Clone, Copy)]
pub struct AllpassCascade<const N: usize> {
    stages: [AllpassStage; N],
}

impl<const N: usize> AllpassCascade<N> {
    pub fn new() -> Self {
        Self {
            stages: [AllpassStage::default(); N],
        }
    }

    /// Run one sample through every stage; `coefficient(i)` gives stage i's `c`.
    #[inline]
    pub fn process(&mut self, input: f32, coefficient: impl Fn(usize) -> f32) -> f32 {
        self.stages
            .iter_mut()
            .enumerate()
            .fold(input, |signal, (i, stage)| stage.process(signal, coefficient(i)))
    }

    pub fn stages(&self) -> &[AllpassStage] {
        &self.stages
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl<const N: usize> Default for AllpassCascade<N> {
    fn default() -> Self {
        Self::new()
    }
}
