//! Spectral generator built on a morphing wavetable.
//!
//! ```text
//!            ┌─ bloom > 0.05 ─→ SpreadBloom<16>
//! V/Oct ──→ ─┤                                   ─→ fragmentation ─→ warp ─→ skew ─→ ×5
//!            └─ otherwise ───→ sin(2π·phase)        (> 0.05 only)
//! ```
//!
//! Fragmentation replaces the signal with Hann-windowed grains scrubbed out
//! of the topology wavetable. Grain length shrinks from 1024 to ~102
//! samples as fragmentation rises; every read is jittered by the module's
//! RNG and every new grain starts where the main oscillator currently is.
//!
//! Topology both morphs the wavetable (sine → T₅ → fold → impulse) and
//! blends in a Chebyshev polynomial of order 2–9 on the output.
//!
//! Skew reads the output back from a short delay whose length (up to 100
//! samples) is warped by the oscillator phase. Skew 0.5 is the neutral
//! centre: the delayed copy gets zero weight there.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::additive::SpreadBloom;
use crate::dsp::clamp_state;
use crate::dsp::delay::DelayLine;
use crate::dsp::distortion::chebyshev;
use crate::dsp::granular::hann;
use crate::dsp::lfo::Phasor;
use crate::dsp::mix::{blend_scaled, crossfade};
use crate::dsp::modulate::voct_to_freq;
use crate::dsp::rng::{XorShift32, DEFAULT_SEED};
use crate::dsp::wavetable::{MorphingTable, TableShape, Wavetable, TABLE_SIZE};

const HARMONICS: usize = 16;
const STAGE_THRESHOLD: f32 = 0.05;
const WARP_THRESHOLD: f32 = 0.01;
const SKEW_THRESHOLD: f32 = 0.01;
const SKEW_CAPACITY: usize = 4096;
const MAX_GRAIN_LENGTH: f32 = 1024.0;
const OUTPUT_GAIN: f32 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SonogeneseParams {
    pub fragmentation: f32,
    pub topology: f32,
    pub skew: f32,
    pub bloom: f32,
    pub voct: f32,
}

impl Default for SonogeneseParams {
    fn default() -> Self {
        Self {
            fragmentation: 0.0,
            topology: 0.0,
            skew: 0.5,
            bloom: 0.5,
            voct: 0.0,
        }
    }
}

impl ParamSet for SonogeneseParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("fragmentation", 0.0),
        ParamInfo::unit("topology", 0.0),
        ParamInfo::unit("skew", 0.5),
        ParamInfo::unit("bloom", 0.5),
        ParamInfo::new("voct", -5.0, 5.0, 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.fragmentation),
            1 => Some(self.topology),
            2 => Some(self.skew),
            3 => Some(self.bloom),
            4 => Some(self.voct),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.fragmentation = value,
            1 => self.topology = value,
            2 => self.skew = value,
            3 => self.bloom = value,
            4 => self.voct = value,
            _ => return false,
        }
        true
    }
}

/// Grain scrubber over a wavetable.
#[derive(Debug, Clone, Copy, Default)]
struct Fragmenter {
    position: usize,
    elapsed: f32,
    crossfade: f32,
}

impl Fragmenter {
    fn process(&mut self, table: &Wavetable, phase: f32, amount: f32, rng: &mut XorShift32) -> f32 {
        let length = MAX_GRAIN_LENGTH * (1.0 - amount * 0.9);
        let jitter = (rng.next_f32() * amount * 0.3 * length) as usize;

        let read = (self.position + jitter) % TABLE_SIZE;
        let sample = crossfade(table.at(read), table.at(read + 1), self.crossfade);
        let window = hann(self.elapsed / length);

        self.elapsed += 1.0;
        if self.elapsed >= length {
            self.elapsed = 0.0;
            self.position = (phase * TABLE_SIZE as f32) as usize % TABLE_SIZE;
            self.crossfade = rng.next_f32();
        }

        sample * window
    }
}

/// Chebyshev order 2–9 blended in by up to half.
#[inline]
pub fn topology_warp(sample: f32, topology: f32) -> f32 {
    if topology < WARP_THRESHOLD {
        return sample;
    }
    let order = (topology * 7.0) as u32 + 2;
    blend_scaled(sample, chebyshev(order, sample), topology, 0.5)
}

#[derive(Debug, Clone)]
pub struct Sonogenese {
    phase: Phasor,
    table: MorphingTable,
    bloom: SpreadBloom<HARMONICS>,
    fragmenter: Fragmenter,
    skew_line: DelayLine,
    rng: XorShift32,
}

impl Sonogenese {
    pub fn new() -> Self {
        Self {
            phase: Phasor::new(),
            table: MorphingTable::new(TableShape::SpectralFold),
            bloom: SpreadBloom::new(),
            fragmenter: Fragmenter::default(),
            skew_line: DelayLine::new(SKEW_CAPACITY),
            rng: XorShift32::new(DEFAULT_SEED),
        }
    }

    fn temporal_skew(&mut self, sample: f32, skew: f32, phase: f32) -> f32 {
        self.skew_line.write(sample);
        if skew < SKEW_THRESHOLD {
            return sample;
        }
        let amount = (skew - 0.5) * 2.0;
        let depth = amount.abs();
        let warped = depth * 100.0 * (1.0 + (TAU * phase).sin() * amount);
        let delay = warped.clamp(1.0, (SKEW_CAPACITY - 1) as f32);
        crossfade(sample, self.skew_line.read_interpolated(delay), depth)
    }

    pub fn process(&mut self, ctx: &ProcessCtx, params: &SonogeneseParams) -> f32 {
        let freq = voct_to_freq(params.voct);
        self.table.update(params.topology);

        let phase = self.phase.phase();
        let mut output = if params.bloom > STAGE_THRESHOLD {
            self.bloom.process(freq, params.bloom, ctx.sample_rate)
        } else {
            (TAU * phase).sin()
        };

        if params.fragmentation > STAGE_THRESHOLD {
            output = self.fragmenter.process(
                self.table.table(),
                phase,
                params.fragmentation,
                &mut self.rng,
            );
        }

        output = topology_warp(output, params.topology);
        output = self.temporal_skew(output, params.skew, phase);

        self.phase.advance(freq, ctx.sample_time);
        clamp_state(output * OUTPUT_GAIN)
    }

    pub fn table(&self) -> &Wavetable {
        self.table.table()
    }
}

impl Default for Sonogenese {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Sonogenese {
    type Params = SonogeneseParams;

    const NAME: &'static str = "Sonogenese";

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx, params);
        }
    }

    fn reset(&mut self) {
        self.phase.reset();
        self.table.reset();
        self.bloom.reset();
        self.fragmenter = Fragmenter::default();
        self.skew_line.reset();
        self.rng.reseed(DEFAULT_SEED);
    }
}
