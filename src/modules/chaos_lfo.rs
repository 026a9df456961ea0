//! Sine LFO with chaotic frequency modulation.
//!
//! A slow 0.5 Hz "chaos" phasor, offset by a seed-derived phase, wobbles the
//! LFO frequency by up to ±300 %:
//!
//! ```text
//! chaos = sin(2π · (chaosPhase + offset))
//! freq  = max(base · (1 + chaos · amount · 3), 0.01 Hz)
//! ```
//!
//! A connected gate input below 1 V switches the chaos off.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{write_secondary, Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::lfo::Phasor;
use crate::dsp::modulate::apply_modulation;
use crate::dsp::rng::{XorShift32, DEFAULT_SEED};

const CHAOS_RATE_HZ: f32 = 0.5;
const MIN_FREQ_HZ: f32 = 0.01;
const GATE_THRESHOLD: f32 = 1.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosLfoParams {
    /// Base rate in Hz.
    pub frequency: f32,
    pub chaos: f32,
}

impl Default for ChaosLfoParams {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            chaos: 0.0,
        }
    }
}

impl ParamSet for ChaosLfoParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::new("frequency", 0.1, 10.0, 1.0),
        ParamInfo::unit("chaos", 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.frequency),
            1 => Some(self.chaos),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.frequency = value,
            1 => self.chaos = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosLfoOutputs {
    /// ±5 V sine.
    pub sine: f32,
    /// 10 V while the sine is non-negative, else 0 V.
    pub gate: f32,
}

#[derive(Debug, Clone)]
pub struct ChaosLfo {
    phase: Phasor,
    chaos_phase: Phasor,
    offset: f32,
}

impl ChaosLfo {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// The seed only picks the chaos phase offset.
    pub fn with_seed(seed: u32) -> Self {
        let rng = XorShift32::new(seed);
        Self {
            phase: Phasor::new(),
            chaos_phase: Phasor::new(),
            offset: (rng.state() & 0xFFFF) as f32 / 65_536.0,
        }
    }

    pub fn process(
        &mut self,
        ctx: &ProcessCtx,
        params: &ChaosLfoParams,
        gate: Option<f32>,
    ) -> ChaosLfoOutputs {
        let amount = match gate {
            Some(volts) if volts < GATE_THRESHOLD => 0.0,
            _ => params.chaos,
        };

        self.chaos_phase.advance(CHAOS_RATE_HZ, ctx.sample_time);
        let chaos = (TAU * (self.chaos_phase.phase() + self.offset)).sin();

        let multiplier = apply_modulation(1.0, chaos, amount * 3.0);
        let freq = (params.frequency * multiplier).max(MIN_FREQ_HZ);

        let sine = (TAU * self.phase.advance(freq, ctx.sample_time)).sin();
        ChaosLfoOutputs {
            sine: 5.0 * sine,
            gate: if sine >= 0.0 { 10.0 } else { 0.0 },
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase.phase()
    }
}

impl Default for ChaosLfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ChaosLfo {
    type Params = ChaosLfoParams;

    const NAME: &'static str = "ChaosLfo";

    const OUTPUTS: &'static [&'static str] = &["sine", "gate"];

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        self.render_outputs(buffer, &mut [], ctx, params);
    }

    fn render_outputs(
        &mut self,
        buffer: &mut [f32],
        secondary: &mut [&mut [f32]],
        ctx: &ProcessCtx,
        params: &Self::Params,
    ) {
        for (n, sample) in buffer.iter_mut().enumerate() {
            let out = self.process(ctx, params, None);
            *sample = out.sine;
            write_secondary(secondary, n, &[out.gate]);
        }
    }

    fn reset(&mut self) {
        self.phase.reset();
        self.chaos_phase.reset();
    }
}
