use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::clamp_state;
use crate::dsp::distortion::fold_passes;
use crate::dsp::filter::{frequency_coefficient, normalized_frequency, StateVariableFilter};
use crate::dsp::modulate::cutoff_from_control;

/*
NeoFiltre
=========

A resonant state-variable lowpass wrapped in two experimental shapers.

    input ─→ pre-sat ─→ SVF ─→ gauss ─→ satine ─→ ±10 V
             (satine)         (shape)  (4 stages)

Coupure maps exponentially onto 20 Hz – 20 kHz. Above 0.4 × sampleRate the
SVF is skipped entirely: the Chamberlin recursion is unstable up there and
a lowpass that high would be inaudible anyway.

The lowpass cell gets a gentle tanh while it sits below ±5, and resonance
mixes some bandpass back in so the peak is audible.


Gauss (spectral curvature)
--------------------------

Three overlapping regions, all applied in order:

    0.00 ──── 0.40          dark tilt: tanh(x · (1 − 0.7 · 2.5g))
          0.30 ──── 0.70    formant: x · (1 + sin(10πx) · 2.5(g − 0.3) · 0.8)
                0.60 ── 1   fold:   x → sin(x · (1 + 8a) · π), a = 2.5(g − 0.6)

The tilt region only ever runs its dark branch (the bright branch would need
gauss above 0.5, outside the region).


Satine (saturation)
-------------------

    velvet     tanh(x · (1 + 8s)) / (1 + 0.3s)           s > 0
    diode      asymmetric: x / (1 + 4xa) or x / (1 + |x|a) s > 0.3
    harmonic   + sin(3πx) · (s − 0.5)                    s > 0.5
    fold       ×(1 + 4a), three reflections at ±1         s > 0.7

Both shapers are exact no-ops below 0.01.
*/

const BYPASS_RATIO: f32 = 0.4;
const SHAPER_THRESHOLD: f32 = 0.01;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeoFiltreParams {
    /// Cutoff control, 0..1 → 20 Hz..20 kHz.
    pub coupure: f32,
    pub resonance: f32,
    pub gauss: f32,
    pub satine: f32,
}

impl Default for NeoFiltreParams {
    fn default() -> Self {
        Self {
            coupure: 0.5,
            resonance: 0.0,
            gauss: 0.5,
            satine: 0.0,
        }
    }
}

impl ParamSet for NeoFiltreParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("coupure", 0.5),
        ParamInfo::unit("resonance", 0.0),
        ParamInfo::unit("gauss", 0.5),
        ParamInfo::unit("satine", 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.coupure),
            1 => Some(self.resonance),
            2 => Some(self.gauss),
            3 => Some(self.satine),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.coupure = value,
            1 => self.resonance = value,
            2 => self.gauss = value,
            3 => self.satine = value,
            _ => return false,
        }
        true
    }
}

/// Gentle saturation ahead of the filter.
#[inline]
pub fn pre_saturate(input: f32, satine: f32) -> f32 {
    if satine > SHAPER_THRESHOLD {
        (input * (1.0 + satine * 0.5)).tanh() / (1.0 + satine * 0.3)
    } else {
        input
    }
}

pub fn gauss_shape(sample: f32, gauss: f32) -> f32 {
    if gauss < SHAPER_THRESHOLD {
        return sample;
    }

    let mut x = sample;
    if gauss < 0.4 {
        let tilt = gauss * 2.5;
        x = (x * (1.0 - tilt * 0.7)).tanh();
    }
    if gauss > 0.3 && gauss < 0.7 {
        let formant = (gauss - 0.3) * 2.5;
        x *= 1.0 + (x * 10.0 * PI).sin() * formant * 0.8;
    }
    if gauss > 0.6 {
        let fold = (gauss - 0.6) * 2.5;
        let folded = (x * (1.0 + fold * 8.0) * PI).sin();
        x = x * (1.0 - fold) + folded * fold;
    }
    clamp_state(x)
}

pub fn satine_shape(sample: f32, satine: f32) -> f32 {
    if satine < SHAPER_THRESHOLD {
        return sample;
    }

    let mut x = (sample * (1.0 + satine * 8.0)).tanh() / (1.0 + satine * 0.3);

    if satine > 0.3 {
        let asym = (satine - 0.3) * 2.5;
        x = if x > 0.0 {
            x / (1.0 + x * asym * 4.0)
        } else {
            x / (1.0 + x.abs() * asym)
        };
    }
    if satine > 0.5 {
        let harmonic = (satine - 0.5) * 2.0;
        x += (x * 3.0 * PI).sin() * harmonic * 0.5;
    }
    if satine > 0.7 {
        let fold = (satine - 0.7) * 3.33;
        x = fold_passes(x * (1.0 + fold * 4.0), 3);
    }
    clamp_state(x)
}

#[derive(Debug, Clone, Default)]
pub struct NeoFiltre {
    svf: StateVariableFilter,
}

impl NeoFiltre {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter(&mut self, input: f32, cutoff_hz: f32, resonance: f32, sample_rate: f32) -> f32 {
        let ratio = normalized_frequency(cutoff_hz, sample_rate, 0.45);
        let f = frequency_coefficient(ratio, 1.99);
        let q = (1.0 - resonance * 0.95).clamp(0.01, 0.99);

        self.svf.tick(input, f, q);
        self.svf.saturate_lowpass(1.1, 5.0);

        let out = self.svf.outputs();
        clamp_state(out.lowpass + out.bandpass * resonance * 0.5)
    }

    pub fn process(&mut self, ctx: &ProcessCtx, params: &NeoFiltreParams, input: f32) -> f32 {
        let driven = pre_saturate(input, params.satine);

        let cutoff = cutoff_from_control(params.coupure);
        let filtered = if cutoff > ctx.sample_rate * BYPASS_RATIO {
            driven
        } else {
            self.filter(driven, cutoff, params.resonance, ctx.sample_rate)
        };

        satine_shape(gauss_shape(filtered, params.gauss), params.satine)
    }

    pub fn filter_state(&self) -> &StateVariableFilter {
        &self.svf
    }
}

impl Module for NeoFiltre {
    type Params = NeoFiltreParams;

    const NAME: &'static str = "NeoFiltre";

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx, params, *sample);
        }
    }

    fn reset(&mut self) {
        self.svf.reset();
    }
}
