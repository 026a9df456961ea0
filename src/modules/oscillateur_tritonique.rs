//! Tritone wavetable oscillator.
//!
//! ```text
//! V/Oct ─→ tritone glide ─→ table (sine → saw → fold) ─┐
//!                      └──→ 12-harmonic tritone bloom ──┴─ 0.6/0.4 ─→ skew ─→ ×5
//! ```
//!
//! The glide target swings around the played pitch by up to a tritone
//! (√2) on a 0.7 Hz sine, and a one-pole portamento of 1–500 ms chases
//! it. Skew reads the mix back up to 10 ms late, with a 1.3 Hz wobble of up
//! to ±100 samples on the read position.

use std::f32::consts::SQRT_2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::additive::TritoneBloom;
use crate::dsp::clamp_state;
use crate::dsp::delay::DelayLine;
use crate::dsp::glide::Portamento;
use crate::dsp::lfo::Phasor;
use crate::dsp::modulate::{voct_to_freq, FREQ_C4};
use crate::dsp::wavetable::{MorphingTable, TableShape};

const HARMONICS: usize = 12;
const SKEW_CAPACITY: usize = 4096;
const GLIDE_SWING_HZ: f32 = 0.7;
const SKEW_WOBBLE_HZ: f32 = 1.3;
const OUTPUT_GAIN: f32 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillateurTritoniqueParams {
    pub topology: f32,
    pub skew: f32,
    pub bloom: f32,
    pub glide: f32,
    pub voct: f32,
}

impl Default for OscillateurTritoniqueParams {
    fn default() -> Self {
        Self {
            topology: 0.33,
            skew: 0.0,
            bloom: 0.2,
            glide: 0.1,
            voct: 0.0,
        }
    }
}

impl ParamSet for OscillateurTritoniqueParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("topology", 0.33),
        ParamInfo::unit("skew", 0.0),
        ParamInfo::unit("bloom", 0.2),
        ParamInfo::unit("glide", 0.1),
        ParamInfo::new("voct", -5.0, 5.0, 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.topology),
            1 => Some(self.skew),
            2 => Some(self.bloom),
            3 => Some(self.glide),
            4 => Some(self.voct),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.topology = value,
            1 => self.skew = value,
            2 => self.bloom = value,
            3 => self.glide = value,
            4 => self.voct = value,
            _ => return false,
        }
        true
    }
}

/// Glide target: `freq · √2^(glide · swing)`.
#[inline]
pub fn tritone_target(freq: f32, glide: f32, swing: f32) -> f32 {
    freq * SQRT_2.powf(glide * swing)
}

#[derive(Debug, Clone)]
pub struct OscillateurTritonique {
    portamento: Portamento,
    table: MorphingTable,
    phase: Phasor,
    bloom: TritoneBloom<HARMONICS>,
    skew: DelayLine,
    swing_lfo: Phasor,
    wobble_lfo: Phasor,
}

impl OscillateurTritonique {
    pub fn new() -> Self {
        Self {
            portamento: Portamento::new(FREQ_C4),
            table: MorphingTable::new(TableShape::TritoneMorph),
            phase: Phasor::new(),
            bloom: TritoneBloom::new(),
            skew: DelayLine::new(SKEW_CAPACITY),
            swing_lfo: Phasor::new(),
            wobble_lfo: Phasor::new(),
        }
    }

    /// `wobble` is the current value of the 1.3 Hz sine.
    fn temporal_skew(&mut self, input: f32, skew: f32, sample_time: f32, wobble: f32) -> f32 {
        self.skew.write(input);
        let delay = ((skew * 10.0 * 0.001 / sample_time) as i64).clamp(0, SKEW_CAPACITY as i64 - 1);
        let offset = (wobble * skew * 100.0) as i64;
        let read = (delay - offset).clamp(0, SKEW_CAPACITY as i64 - 1);
        self.skew.read(read as usize)
    }

    pub fn process(&mut self, ctx: &ProcessCtx, params: &OscillateurTritoniqueParams) -> f32 {
        let dt = ctx.sample_time;

        let swing = self.swing_lfo.sine();
        let target = tritone_target(voct_to_freq(params.voct), params.glide, swing);
        let freq = self.portamento.next(target, params.glide, dt);

        self.table.update(params.topology);
        let phase = self.phase.advance(freq, dt);
        let base = self.table.table().read_linear(phase);
        let bloom = self.bloom.process(freq, params.bloom, ctx.sample_rate);
        let mixed = base * 0.6 + bloom * 0.4;

        let output = self.temporal_skew(mixed, params.skew, dt, self.wobble_lfo.sine());
        self.swing_lfo.advance(GLIDE_SWING_HZ, dt);
        self.wobble_lfo.advance(SKEW_WOBBLE_HZ, dt);
        clamp_state(output * OUTPUT_GAIN)
    }

    /// Current portamento frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.portamento.value()
    }

    pub fn table(&self) -> &MorphingTable {
        &self.table
    }
}

impl Default for OscillateurTritonique {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for OscillateurTritonique {
    type Params = OscillateurTritoniqueParams;

    const NAME: &'static str = "OscillateurTritonique";

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx, params);
        }
    }

    fn reset(&mut self) {
        self.portamento.reset();
        self.table.reset();
        self.phase.reset();
        self.bloom.reset();
        self.skew.reset();
        self.swing_lfo.reset();
        self.wobble_lfo.reset();
    }
}
