//! Morphing oscillator with bit-reduction and drive.
//!
//! ```text
//! V/Oct ─→ MorphOscillator ─→ artifact ─→ drive ─→ ×5 ─→ ±10 V
//!          (shape, harmonics)  16→4 bits   tanh ≤10×
//! ```
//!
//! Artifact and drive both blend from dry (amount 0) to fully processed
//! (amount 1), and are exact no-ops below 0.01.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::clamp_state;
use crate::dsp::distortion::{bit_reduce, tanh_drive};
use crate::dsp::mix::crossfade;
use crate::dsp::modulate::voct_to_freq;
use crate::dsp::oscillator::MorphOscillator;

const EFFECT_THRESHOLD: f32 = 0.01;
const OUTPUT_GAIN: f32 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeoGenParams {
    pub shape: f32,
    pub artifact: f32,
    pub harmonics: f32,
    pub drive: f32,
    /// Pitch in volts, 0 V = C4.
    pub voct: f32,
}

impl Default for NeoGenParams {
    fn default() -> Self {
        Self {
            shape: 0.0,
            artifact: 0.0,
            harmonics: 0.5,
            drive: 0.0,
            voct: 0.0,
        }
    }
}

impl ParamSet for NeoGenParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("shape", 0.0),
        ParamInfo::unit("artifact", 0.0),
        ParamInfo::unit("harmonics", 0.5),
        ParamInfo::unit("drive", 0.0),
        ParamInfo::new("voct", -5.0, 5.0, 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.shape),
            1 => Some(self.artifact),
            2 => Some(self.harmonics),
            3 => Some(self.drive),
            4 => Some(self.voct),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.shape = value,
            1 => self.artifact = value,
            2 => self.harmonics = value,
            3 => self.drive = value,
            4 => self.voct = value,
            _ => return false,
        }
        true
    }
}

/// Quantize towards 16 − 12·amount bits, blended by amount.
#[inline]
pub fn artifact(sample: f32, amount: f32) -> f32 {
    if amount < EFFECT_THRESHOLD {
        return sample;
    }
    let bits = 16.0 - amount * 12.0;
    crossfade(sample, bit_reduce(sample, bits), amount)
}

/// tanh at up to 10× gain, blended by amount.
#[inline]
pub fn drive(sample: f32, amount: f32) -> f32 {
    if amount < EFFECT_THRESHOLD {
        return sample;
    }
    crossfade(sample, tanh_drive(sample, 1.0 + amount * 9.0), amount)
}

#[derive(Debug, Clone, Default)]
pub struct NeoGen {
    osc: MorphOscillator,
}

impl NeoGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, ctx: &ProcessCtx, params: &NeoGenParams) -> f32 {
        let freq = voct_to_freq(params.voct);
        let raw = self
            .osc
            .next(freq, ctx.sample_time, params.shape, params.harmonics);
        let shaped = drive(artifact(raw, params.artifact), params.drive);
        clamp_state(shaped * OUTPUT_GAIN)
    }
}

impl Module for NeoGen {
    type Params = NeoGenParams;

    const NAME: &'static str = "NeoGen";

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx, params);
        }
    }

    fn reset(&mut self) {
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::fractal_saw;

    #[test]
    fn test_clean_output_is_scaled_fractal_saw() {
        let ctx = ProcessCtx::new(48_000.0);
        let params = NeoGenParams {
            harmonics: 0.0,
            ..NeoGenParams::default()
        };
        let mut gen = NeoGen::new();
        let mut reference = crate::dsp::lfo::Phasor::new();
        for _ in 0..4_800 {
            let phase = reference.advance(voct_to_freq(0.0), ctx.sample_time);
            let expected = fractal_saw(phase, 0.0) * 5.0;
            assert_eq!(gen.process(&ctx, &params), expected);
        }
    }

    #[test]
    fn test_effects_bypass_below_threshold() {
        for n in 0..1_000 {
            let x = (n as f32 * 0.013).sin();
            assert_eq!(artifact(x, 0.009), x);
            assert_eq!(drive(x, 0.009), x);
        }
    }

    #[test]
    fn test_full_artifact_quantizes_to_four_bits() {
        let y = artifact(0.3, 1.0);
        assert_eq!(y, (0.3f32 * 16.0).round() / 16.0);
    }

    #[test]
    fn test_full_drive_is_tanh_ten() {
        let y = drive(0.2, 1.0);
        assert!((y - (2.0f32).tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_one_volt_doubles_frequency() {
        // count rising zero crossings of a plain saw over one second
        let ctx = ProcessCtx::new(48_000.0);
        let count = |voct: f32| {
            let params = NeoGenParams {
                harmonics: 0.0,
                voct,
                ..NeoGenParams::default()
            };
            let mut gen = NeoGen::new();
            let mut last = gen.process(&ctx, &params);
            let mut wraps = 0;
            for _ in 0..48_000 {
                let y = gen.process(&ctx, &params);
                if y < last - 5.0 {
                    wraps += 1;
                }
                last = y;
            }
            wraps
        };
        let c4 = count(0.0);
        let c5 = count(1.0);
        assert!((260..=262).contains(&c4), "C4 wraps {}", c4);
        assert!((522..=524).contains(&c5), "C5 wraps {}", c5);
    }

    #[test]
    fn test_output_clamped() {
        let ctx = ProcessCtx::new(44_100.0);
        let params = NeoGenParams {
            shape: 0.6,
            artifact: 1.0,
            harmonics: 0.0,
            drive: 0.0,
            voct: -3.0,
        };
        let mut gen = NeoGen::new();
        for _ in 0..88_200 {
            let y = gen.process(&ctx, &params);
            assert!(y.is_finite() && y.abs() <= 10.0);
        }
    }
}
