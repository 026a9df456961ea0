//! Free-running grain cloud.
//!
//! Classic granular synthesis schedules grains from a clock. Here the grains
//! schedule themselves: each one is a phase accumulator reading a wavetable
//! under a Hann window, and every time its phase wraps the grain "re-triggers"
//! with a fresh random amplitude and playback-rate jitter.
//!
//! ```text
//! grain phase   0 ──────────────→ 1 │ 0 ──────────→ 1 │ ...
//! envelope      ╭──────╮            │ ╭──────╮
//!              ╱        ╲           │╱        ╲
//!             ╯          ╰          ╯          ╰
//!                                   ↑ new amp, new rate
//! ```
//!
//! Grains start evenly spread over the cycle (phase i/N) with zero
//! amplitude, so the cloud fades in over its first cycle. Because every
//! grain drifts at its own jittered rate the cloud slowly decorrelates into
//! a shimmering texture rather than a fixed chord.
//!
//! The cloud's output is `input × (1 − morph) + Σ grains × morph / N`.

use std::f32::consts::TAU;

use crate::dsp::lfo::Phasor;
use crate::dsp::mix::crossfade;
use crate::dsp::rng::XorShift32;
use crate::dsp::wavetable::Wavetable;

/// Morph below this passes the input through.
pub const MORPH_THRESHOLD: f32 = 0.01;

/// Raised-cosine window over a normalized position in [0, 1].
#[inline]
pub fn hann(position: f32) -> f32 {
    0.5 * (1.0 - (TAU * position).cos())
}

#[derive(Debug, Clone, Copy)]
struct Grain {
    phase: Phasor,
    amp: f32,
    rate: f32,
}

#[derive(Debug, Clone)]
pub struct GrainCloud<const N: usize> {
    grains: [Grain; N],
    rng: XorShift32,
    seed: u32,
}

impl<const N: usize> GrainCloud<N> {
    pub fn new(seed: u32) -> Self {
        Self {
            grains: Self::initial_grains(),
            rng: XorShift32::new(seed),
            seed,
        }
    }

    fn initial_grains() -> [Grain; N] {
        std::array::from_fn(|i| Grain {
            phase: Phasor::with_phase(i as f32 / N as f32),
            amp: 0.0,
            rate: 1.0,
        })
    }

    pub fn process(
        &mut self,
        input: f32,
        morph: f32,
        base_freq: f32,
        sample_rate: f32,
        table: &Wavetable,
    ) -> f32 {
        if morph < MORPH_THRESHOLD {
            return input;
        }

        let base_increment = base_freq / sample_rate;
        let mut cloud = 0.0;
        for grain in &mut self.grains {
            if grain.phase.advance_wrapping(base_increment * grain.rate) {
                grain.amp = 0.5 + self.rng.next_f32() * 0.5;
                grain.rate = 1.0 + (self.rng.next_f32() - 0.5) * morph * 0.3;
            }
            let phase = grain.phase.phase();
            cloud += table.read_nearest(phase) * hann(phase) * grain.amp;
        }

        crossfade(input, cloud / N as f32, morph)
    }

    /// Amplitudes of every grain, for inspection.
    pub fn amplitudes(&self) -> [f32; N] {
        std::array::from_fn(|i| self.grains[i].amp)
    }

    /// Restore initial phases and reseed the generator.
    pub fn reset(&mut self) {
        self.grains = Self::initial_grains();
        self.rng.reseed(self.seed);
    }
}
