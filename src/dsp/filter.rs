use std::f32::consts::PI;

use crate::dsp::clamp_state;
use crate::dsp::mix::crossfade;
use crate::dsp::modulate::cutoff_from_control;

/*
Chamberlin State-Variable Filter
================================

Two integrators in a loop, one feedback path for damping:

    lowpass  += f · bandpass
    highpass  = input − lowpass − q · bandpass
    bandpass += f · highpass

  f   frequency coefficient, 2 · sin(π · freq / sampleRate)
  q   damping; 2.0 is heavily damped, values near 0 ring for a long time

All three taps come out of every tick, so a module can pick one or blend
them. The structure is cheap but only stable while f stays well below 2,
which is why every caller clamps the coefficient and bypasses (or fades to
dry) near Nyquist.

    | tap       | passes           | at cutoff        |
    | --------- | ---------------- | ---------------- |
    | lowpass   | below cutoff     | −3 dB-ish, peaks |
    | bandpass  | around cutoff    | unity at q = 1   |
    | highpass  | above cutoff     | −3 dB-ish, peaks |


State Clamping
--------------

Every state cell is clamped to ±10 after every update, unconditionally. That
is a numerical guard rather than a signal-range policy: with extreme
coefficients the recurrence can diverge, and the clamp keeps it finite.


Multi-Pole Cascade
------------------

Chaining N lowpass taps gives an N × 12 dB/oct slope. Spreading each pole a
little above the previous one (freq × (1 + i · 0.15 · control)) softens the
knee. Near Nyquist the cascade is crossfaded into the dry signal over the top
15 % of the safe range instead of being switched off abruptly:

    blend
      1 ┤                    ╭──────
        │                   ╱
        │                  ╱
      0 ┼─────────────────╯
        0        0.85·safe   safe      base cutoff
*/

/// All three taps of a state-variable filter tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Frequency as a fraction of the sample rate, clamped to a stable window.
///
/// The cutoff is first limited to `[20 Hz, max_ratio · sampleRate]`.
#[inline]
pub fn normalized_frequency(freq_hz: f32, sample_rate: f32, max_ratio: f32) -> f32 {
    let safe = freq_hz.clamp(20.0, sample_rate * max_ratio);
    (safe / sample_rate).clamp(0.0001, max_ratio)
}

/// `2 · sin(π · ratio)` clamped to `[0.0001, max_f]`.
#[inline]
pub fn frequency_coefficient(ratio: f32, max_f: f32) -> f32 {
    (2.0 * (PI * ratio).sin()).clamp(0.0001, max_f)
}

/// Chamberlin state-variable filter with three clamped state cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateVariableFilter {
    lowpass: f32,
    bandpass: f32,
    highpass: f32,
}

impl StateVariableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one sample through the filter.
    #[inline]
    pub fn tick(&mut self, input: f32, f: f32, q: f32) -> FilterOutputs {
        self.lowpass += f * self.bandpass;
        self.highpass = input - self.lowpass - q * self.bandpass;
        self.bandpass += f * self.highpass;

        self.lowpass = clamp_state(self.lowpass);
        self.bandpass = clamp_state(self.bandpass);
        self.highpass = clamp_state(self.highpass);

        self.outputs()
    }

    /// Soft `tanh` character on the lowpass cell while it is below `threshold`.
    ///
    /// Writes back into the filter state, so it shapes the recursion too.
    #[inline]
    pub fn saturate_lowpass(&mut self, drive: f32, threshold: f32) {
        if self.lowpass.abs() < threshold {
            self.lowpass = (self.lowpass * drive).tanh() / drive;
        }
    }

    #[inline]
    pub fn outputs(&self) -> FilterOutputs {
        FilterOutputs {
            lowpass: self.lowpass,
            bandpass: self.bandpass,
            highpass: self.highpass,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// RC-style one-pole lowpass.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnePole {
    state: f32,
}

impl OnePole {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, input: f32, cutoff_hz: f32, sample_time: f32) -> f32 {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        let alpha = sample_time / (rc + sample_time);
        self.state = clamp_state(self.state + alpha * (input - self.state));
        self.state
    }

    pub fn value(&self) -> f32 {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// N cascaded lowpass poles with spread cutoffs and a near-Nyquist dry fade.
#[derive(Debug, Clone, Copy)]
pub struct PoleCascade<const N: usize> {
    poles: [StateVariableFilter; N],
}

impl<const N: usize> PoleCascade<N> {
    /// Upper edge of the usable cutoff range, as a fraction of the sample rate.
    pub const SAFE_RATIO: f32 = 0.33;
    /// Per-pole cutoff ceiling.
    pub const POLE_RATIO: f32 = 0.38;

    pub fn new() -> Self {
        Self {
            poles: [StateVariableFilter::default(); N],
        }
    }

    /// Dry share for a given base cutoff: 0 below 85 % of the safe range,
    /// 1 at and above it, linear in between.
    #[inline]
    pub fn bypass_blend(base_hz: f32, sample_rate: f32) -> f32 {
        let max_safe = sample_rate * Self::SAFE_RATIO;
        let knee = max_safe * 0.85;
        if base_hz > knee {
            ((base_hz - knee) / (max_safe * 0.15)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Filter one sample; `control` is the normalized cutoff knob.
    pub fn process(&mut self, input: f32, control: f32, sample_rate: f32) -> f32 {
        let base = cutoff_from_control(control);
        let blend = Self::bypass_blend(base, sample_rate);

        let mut signal = input;
        for (i, pole) in self.poles.iter_mut().enumerate() {
            let spread = 1.0 + i as f32 * 0.15 * control;
            let ratio = normalized_frequency(base * spread, sample_rate, Self::POLE_RATIO);
            let f = frequency_coefficient(ratio, 1.5);
            let q = 0.7 + (1.0 - ratio) * 0.2;
            signal = pole.tick(signal, f, q).lowpass;
        }

        crossfade(signal, input, blend)
    }

    pub fn pole(&self, index: usize) -> Option<&StateVariableFilter> {
        self.poles.get(index)
    }

    pub fn reset(&mut self) {
        for pole in &mut self.poles {
            pole.reset();
        }
    }
}

impl<const N: usize> Default for PoleCascade<N> {
    fn default() -> Self {
        Self::new()
    }
}
