//! Dub siren voice.
//!
//! ```text
//! V/Oct ─→ saw+overtones table ─→ grain morph ─→ spectral shift ─→ phase drift ─→ echo bloom ─→ ×5
//! ```
//!
//! The base oscillator reads its table without interpolation. Grain morph
//! crossfades into an 8-grain cloud reading the same table; spectral shift
//! layers a transposed 16-partial series; phase drift mixes in a second
//! read of the table at a slowly wobbling phase offset; echo bloom adds 8
//! coloured taps, the first at 50–250 ms (rising with bloom) and the last
//! 2.05× further out, so up to ~512 ms. Every stage is a no-op below 0.01.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::additive::SpectralShift;
use crate::dsp::clamp_state;
use crate::dsp::diffusion::MultiTapEcho;
use crate::dsp::granular::GrainCloud;
use crate::dsp::lfo::{CompoundLfo, Partial, Phasor};
use crate::dsp::modulate::voct_to_freq;
use crate::dsp::rng::DEFAULT_SEED;
use crate::dsp::wavetable::{siren_saw, Wavetable};

const GRAINS: usize = 8;
const SHIFT_PARTIALS: usize = 16;
const ECHO_TAPS: usize = 8;
const DRIFT_THRESHOLD: f32 = 0.01;
const OUTPUT_GAIN: f32 = 5.0;

const DRIFT_PARTIALS: [Partial; 2] = [Partial::new(1.0, 1.0), Partial::new(2.3, 0.3)];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SirenConcreteParams {
    pub grain_morph: f32,
    pub spectral_shift: f32,
    pub phase_drift: f32,
    pub echo_bloom: f32,
    pub voct: f32,
}

impl ParamSet for SirenConcreteParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("grain morph", 0.0),
        ParamInfo::unit("spectral shift", 0.0),
        ParamInfo::unit("phase drift", 0.0),
        ParamInfo::unit("echo bloom", 0.0),
        ParamInfo::new("voct", -5.0, 5.0, 0.0),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.grain_morph),
            1 => Some(self.spectral_shift),
            2 => Some(self.phase_drift),
            3 => Some(self.echo_bloom),
            4 => Some(self.voct),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.grain_morph = value,
            1 => self.spectral_shift = value,
            2 => self.phase_drift = value,
            3 => self.echo_bloom = value,
            4 => self.voct = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct SirenConcrete {
    table: Wavetable,
    phase: Phasor,
    grains: GrainCloud<GRAINS>,
    shift: SpectralShift<SHIFT_PARTIALS>,
    drift: CompoundLfo<2>,
    echo: MultiTapEcho<ECHO_TAPS>,
}

impl SirenConcrete {
    pub fn new() -> Self {
        Self {
            table: Wavetable::from_fn(siren_saw),
            phase: Phasor::new(),
            grains: GrainCloud::new(DEFAULT_SEED),
            shift: SpectralShift::new(),
            drift: CompoundLfo::new(DRIFT_PARTIALS),
            echo: MultiTapEcho::new(),
        }
    }

    fn phase_drift(&mut self, input: f32, drift: f32, sample_time: f32) -> f32 {
        if drift < DRIFT_THRESHOLD {
            return input;
        }
        let lfo = self.drift.next(0.5 + drift * 3.0, sample_time);
        let offset = lfo * drift * 0.05;
        let drifted = self.table.read_nearest(self.phase.phase() + offset);
        input * (1.0 - drift * 0.5) + drifted * drift * 0.5
    }

    pub fn process(&mut self, ctx: &ProcessCtx, params: &SirenConcreteParams) -> f32 {
        let sr = ctx.sample_rate;
        let freq = voct_to_freq(params.voct);

        let phase = self.phase.advance_by(freq / sr);
        let mut output = self.table.read_nearest(phase);

        output = self
            .grains
            .process(output, params.grain_morph, freq, sr, &self.table);
        output = self.shift.process(output, params.spectral_shift, freq, sr);
        output = self.phase_drift(output, params.phase_drift, ctx.sample_time);
        output = self.echo.process(output, params.echo_bloom, sr);

        clamp_state(output * OUTPUT_GAIN)
    }

    pub fn table(&self) -> &Wavetable {
        &self.table
    }
}

impl Default for SirenConcrete {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for SirenConcrete {
    type Params = SirenConcreteParams;

    const NAME: &'static str = "SirenConcrete";

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        for sample in buffer.iter_mut() {
            *sample = self.process(ctx, params);
        }
    }

    fn reset(&mut self) {
        self.phase.reset();
        self.grains.reset();
        self.shift.reset();
        self.drift.reset();
        self.echo.reset();
    }
}
