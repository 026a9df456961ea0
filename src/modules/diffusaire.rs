//! Four-stage texture filter.
//!
//! ```text
//! input ─→ cinétiques ─→ contours ─→ résonance ─→ écart ─→ ±10 V
//!          tape wobble    4-pole LP   3 characters  6 all-pass
//! ```
//!
//! - **Cinétiques**: a 50-sample delay swept by wow (0.3 Hz, ±30 samples)
//!   and flutter (2.7 Hz, ±8 samples), both scaled by the amount; 40 % wet
//!   at full amount. Below 0.01 the stage is skipped and its delay line is
//!   left untouched.
//! - **Contours**: the morphing pole cascade; it fades to dry near Nyquist.
//! - **Résonance**: soft / metallic / fractal, tracking the contours cutoff.
//! - **Écart**: phase dispersion, up to 85 % wet.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::allpass::AllpassCascade;
use crate::dsp::clamp_state;
use crate::dsp::delay::{ModulatedDelay, WowFlutter};
use crate::dsp::filter::PoleCascade;
use crate::dsp::mix::blend_scaled;
use crate::dsp::modulate::cutoff_from_control;
use crate::dsp::resonance::CharacterResonance;

const DELAY_CAPACITY: usize = 8192;
const BASE_DELAY: f32 = 50.0;
const STAGE_THRESHOLD: f32 = 0.01;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusaireParams {
    pub contours: f32,
    pub resonance: f32,
    pub ecart: f32,
    pub cinetiques: f32,
}

impl Default for DiffusaireParams {
    fn default() -> Self {
        Self {
            contours: 0.5,
            resonance: 0.0,
            ecart: 0.0,
            cinetiques: 0.0,
        }
    }
}

impl ParamSet for DiffusaireParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("contours", 0.5),
        ParamInfo::unit("resonance", 0.0),
        ParamInfo::unit("ecart", 0.0),
        ParamInfo::unit("cinetiques", 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.contours),
            1 => Some(self.resonance),
            2 => Some(self.ecart),
            3 => Some(self.cinetiques),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.contours = value,
            1 => self.resonance = value,
            2 => self.ecart = value,
            3 => self.cinetiques = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct Diffusaire {
    delay: ModulatedDelay,
    wobble: WowFlutter,
    contours: PoleCascade<4>,
    resonance: CharacterResonance,
    dispersion: AllpassCascade<6>,
}

impl Diffusaire {
    pub fn new() -> Self {
        Self {
            delay: ModulatedDelay::new(DELAY_CAPACITY),
            wobble: WowFlutter::new(0.3, 2.7),
            contours: PoleCascade::new(),
            resonance: CharacterResonance::new(),
            dispersion: AllpassCascade::new(),
        }
    }

    fn cinetiques(&mut self, input: f32, amount: f32, sample_rate: f32) -> f32 {
        if amount < STAGE_THRESHOLD {
            return input;
        }
        let modulation = self.wobble.next(sample_rate, amount * 30.0, amount * 8.0);
        let delay = (BASE_DELAY + modulation).clamp(1.0, (DELAY_CAPACITY - 2) as f32);
        self.delay.process(input, delay, amount * 0.4)
    }

    fn ecart(&mut self, input: f32, amount: f32) -> f32 {
        if amount < STAGE_THRESHOLD {
            return input;
        }
        let dispersed = self
            .dispersion
            .process(input, |i| (0.5 + i as f32 * 0.15 * amount).clamp(0.0, 0.95));
        blend_scaled(input, dispersed, amount, 0.85)
    }

    pub fn process(&mut self, ctx: &ProcessCtx, params: &DiffusaireParams, input: f32) -> f32 {
        let sr = ctx.sample_rate;
        let moved = self.cinetiques(input, params.cinetiques, sr);
        let shaped = self.contours.process(moved, params.contours, sr);
        let cutoff = cutoff_from_control(params.contours);
        let resonant = self.resonance.process(shaped, params.resonance, cutoff, sr);
        clamp_state(self.ecart(resonant, params.ecart))
    }

    pub fn delay_line(&self) -> &crate::dsp::delay::DelayLine {
        self.delay.line()
    }
}

impl Default for Diffusaire {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Diffusaire {
    type Params = DiffusaireParams;

    const NAME: &'static str = "Diffusaire";

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx, params, *sample);
        }
    }

    fn reset(&mut self) {
        self.delay.reset();
        self.wobble.reset();
        self.contours.reset();
        self.resonance.reset();
        self.dispersion.reset();
    }
}
