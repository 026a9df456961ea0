//! Stochastic polyrhythm engine.
//!
//! Four rhythm layers listen to one clock. Each layer divides the clock and
//! walks its own pattern:
//!
//! ```text
//!  layer   division   pattern   eligible steps
//!    1        1          4       every edge
//!    2        2          8       0 2 4 6
//!    3        3          6       0 3
//!    4        4         16       0 4 8 12
//! ```
//!
//! Density decides how many layers take part (1–4) and scales their base
//! probability, higher layers a little less likely. On an eligible step a
//! layer draws one uniform value and fires a 10 ms pulse when it falls under
//! the drifted probability:
//!
//! ```text
//! p' = p · (1 − drift/2) + drift · r / 2
//! ```
//!
//! Active gates sit at 5 V, with accent mixing in the first three harmonics
//! of 100 + 50·layer Hz. Time-space shift only computes per-layer timing
//! offsets; they are exposed for display and do not move the gates.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{write_secondary, Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::clamp_state;
use crate::dsp::lfo::Phasor;
use crate::dsp::rng::{XorShift32, DEFAULT_SEED};
use crate::dsp::trigger::{PulseGenerator, SchmittTrigger};

pub const LAYERS: usize = 4;

const DIVISIONS: [u32; LAYERS] = [1, 2, 3, 4];
const PATTERN_LENGTHS: [u32; LAYERS] = [4, 8, 6, 16];

const PULSE_SECONDS: f32 = 0.01;
const GATE_VOLTS: f32 = 5.0;
const ACCENT_THRESHOLD: f32 = 0.1;
const SHIFT_WOBBLE_HZ: f32 = 0.37;
/// Longest time-space delay, in samples.
const SHIFT_CAPACITY: i64 = 8191;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalisteParams {
    pub density: f32,
    pub drift: f32,
    pub accent: f32,
    pub timeshift: f32,
}

impl Default for TemporalisteParams {
    fn default() -> Self {
        Self {
            density: 0.75,
            drift: 0.3,
            accent: 0.5,
            timeshift: 0.2,
        }
    }
}

impl ParamSet for TemporalisteParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("density", 0.75),
        ParamInfo::unit("drift", 0.3),
        ParamInfo::unit("accent", 0.5),
        ParamInfo::unit("timeshift", 0.2),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0 => Some(self.density),
            1 => Some(self.drift),
            2 => Some(self.accent),
            3 => Some(self.timeshift),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0 => self.density = value,
            1 => self.drift = value,
            2 => self.accent = value,
            3 => self.timeshift = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhythmLayer {
    pub division: u32,
    pub pattern_length: u32,
    pub step: u32,
    pub probability: f32,
    /// Time-space offset in seconds.
    pub phase: f32,
    pub active: bool,
}

impl RhythmLayer {
    fn new(index: usize) -> Self {
        Self {
            division: DIVISIONS[index],
            pattern_length: PATTERN_LENGTHS[index],
            step: 0,
            probability: 1.0,
            phase: 0.0,
            active: true,
        }
    }

    #[inline]
    fn eligible(&self) -> bool {
        self.step % self.division == 0
    }

    #[inline]
    fn advance(&mut self) {
        self.step = (self.step + 1) % self.pattern_length;
    }
}

/// Number of layers taking part at a given density.
#[inline]
pub fn active_layers(density: f32) -> usize {
    (1 + (density * 3.0) as i32).clamp(1, LAYERS as i32) as usize
}

/// Base trigger probability of `layer` at a given density.
#[inline]
pub fn layer_probability(layer: usize, density: f32) -> f32 {
    (1.0 - layer as f32 * 0.15) * (0.5 + density * 0.5)
}

#[derive(Debug, Clone)]
pub struct Temporaliste {
    layers: [RhythmLayer; LAYERS],
    pulses: [PulseGenerator; LAYERS],
    drift_phases: [f32; LAYERS],
    clock: SchmittTrigger,
    rng: XorShift32,
    seed: u32,
    /// Time-space wobble, 0.37·layer Hz.
    shift_lfos: [Phasor; LAYERS],
    /// Accent fundamentals, 100 + 50·layer Hz.
    accent_phases: [Phasor; LAYERS],
}

impl Temporaliste {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            layers: std::array::from_fn(RhythmLayer::new),
            pulses: [PulseGenerator::new(); LAYERS],
            drift_phases: [0.0; LAYERS],
            clock: SchmittTrigger::default(),
            rng: XorShift32::new(seed),
            seed,
            shift_lfos: [Phasor::new(); LAYERS],
            accent_phases: [Phasor::new(); LAYERS],
        }
    }

    fn apply_density(&mut self, density: f32) {
        let active = active_layers(density);
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.active = i < active;
            if layer.active {
                layer.probability = layer_probability(i, density);
            }
        }
    }

    fn apply_timeshift(&mut self, shift: f32, sample_time: f32) {
        for (i, (layer, lfo)) in self.layers.iter_mut().zip(&self.shift_lfos).enumerate() {
            let delay_ms = shift * (i as f32 + 1.0) * 5.0;
            let delay = ((delay_ms * 0.001 / sample_time) as i64).clamp(0, SHIFT_CAPACITY);
            let modulation = lfo.sine();
            let offset = (modulation * shift * 50.0) as i64;
            layer.phase = (delay + offset) as f32 * sample_time;
        }
    }

    /// Draw for one eligible layer; returns whether it fires.
    fn drift_decision(&mut self, layer: usize, drift: f32) -> bool {
        let r = self.rng.next_f32();
        let probability = self.layers[layer].probability * (1.0 - drift * 0.5) + drift * r * 0.5;

        let phase = &mut self.drift_phases[layer];
        *phase = (*phase + drift * (r - 0.5) * 0.1).clamp(-0.5, 0.5);

        r < probability
    }

    fn on_clock(&mut self, drift: f32) {
        for i in 0..LAYERS {
            if !self.layers[i].active {
                continue;
            }
            if self.layers[i].eligible() && self.drift_decision(i, drift) {
                self.pulses[i].trigger(PULSE_SECONDS);
            }
            self.layers[i].advance();
        }
    }

    fn accent_voltage(&self, layer: usize, accent: f32) -> f32 {
        if accent <= ACCENT_THRESHOLD {
            return GATE_VOLTS;
        }
        let phase = self.accent_phases[layer].phase();
        let spectral = (TAU * phase).sin()
            + (TAU * 2.0 * phase).sin() * 0.5
            + (TAU * 3.0 * phase).sin() * 0.33;
        GATE_VOLTS + spectral * accent * 0.3
    }

    fn advance_time(&mut self, sample_time: f32) {
        for (i, (lfo, accent)) in self.shift_lfos.iter_mut().zip(&mut self.accent_phases).enumerate() {
            lfo.advance(SHIFT_WOBBLE_HZ * i as f32, sample_time);
            accent.advance(100.0 + i as f32 * 50.0, sample_time);
        }
    }

    /// Process one sample of `clock` and return the four gate voltages.
    pub fn process(&mut self, ctx: &ProcessCtx, params: &TemporalisteParams, clock: f32) -> [f32; LAYERS] {
        self.apply_density(params.density);
        self.apply_timeshift(params.timeshift, ctx.sample_time);

        if self.clock.process(clock) {
            self.on_clock(params.drift);
        }

        let mut gates = [0.0; LAYERS];
        for (i, gate) in gates.iter_mut().enumerate() {
            if self.pulses[i].process(ctx.sample_time) {
                *gate = clamp_state(self.accent_voltage(i, params.accent));
            }
        }

        self.advance_time(ctx.sample_time);
        gates
    }

    pub fn layers(&self) -> &[RhythmLayer; LAYERS] {
        &self.layers
    }

    pub fn drift_phases(&self) -> [f32; LAYERS] {
        self.drift_phases
    }
}

impl Default for Temporaliste {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Temporaliste {
    type Params = TemporalisteParams;

    const NAME: &'static str = "Temporaliste";

    const OUTPUTS: &'static [&'static str] = &["gate 1", "gate 2", "gate 3", "gate 4"];

    /// The buffer carries the clock in and gate 1 out.
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
            let gates = self.process(ctx, params, *sample);
            *sample = gates[0];
            write_secondary(secondary, n, &gates[1..]);
        }
    }

    fn reset(&mut self) {
        self.layers = std::array::from_fn(RhythmLayer::new);
        for pulse in &mut self.pulses {
            pulse.reset();
        }
        self.drift_phases = [0.0; LAYERS];
        self.clock.reset();
        self.rng.reseed(self.seed);
        for (lfo, accent) in self.shift_lfos.iter_mut().zip(&mut self.accent_phases) {
            lfo.reset();
            accent.reset();
        }
    }
}
