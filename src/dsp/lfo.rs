//! Phase accumulators and Low Frequency Oscillator (LFO) helpers.

/*
Phase Accumulators
==================

Every oscillator in this crate, audio-rate or control-rate, is driven by the
same primitive: a phase in [0, 1) that is advanced once per sample.

    phase += frequency × sample_time
    phase  = phase mod 1.0

The waveform is then a pure function of the phase:

    sine      sin(2π × phase)
    saw       2 × phase − 1
    table     table[phase × len]

Keeping phase normalized (rather than in radians) makes wavetable lookup and
sub-cycle logic (attack windows, grain envelopes) trivial.


Wrapping
--------

The classic `if phase >= 1.0 { phase -= 1.0 }` only works when the increment
is below 1.0. Here wrapping uses `x - floor(x)`, which also copes with
negative increments (drift) and increments above 1.0 (frequency above the
sample rate). One subtle case: for a tiny negative x, `x - floor(x)` rounds to
exactly 1.0 in f32, so the result is folded back to 0.0 to keep the
invariant 0 ≤ phase < 1.


Compound LFOs
-------------

Tape wow and flutter is not a single sine. Several modules sum a fundamental
with a few inharmonic partials read off the SAME phase:

    lfo = Σ gain_k × sin(2π × phase × ratio_k)

Because the partials share one phase, non-integer ratios produce a small
discontinuity each time the phase wraps. That "hiccup" is part of the
character, so it is kept.

    ratio 1.0 ────╮   ╭───╮   ╭──   smooth fundamental
                  ╰───╯   ╰───╯
    ratio 2.7 ─╮╭╮╭╮╭╮╮╭╮╭╮╭╮╭╮╮╭  jumps at every wrap


Bipolar and Unipolar
--------------------

    unipolar = (bipolar + 1.0) × 0.5

    bipolar   unipolar
    -1.0      0.0
     0.0      0.5
    +1.0      1.0
*/

use std::f32::consts::TAU;

/// Wrap any finite value into [0, 1).
#[inline]
pub fn wrap_unit(value: f32) -> f32 {
    let wrapped = value - value.floor();
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalized phase accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f32,
}

impl Phasor {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Start at an arbitrary phase (wrapped into range).
    pub fn with_phase(phase: f32) -> Self {
        Self {
            phase: wrap_unit(phase),
        }
    }

    /// Advance by `frequency × sample_time` and return the new phase.
    #[inline]
    pub fn advance(&mut self, frequency: f32, sample_time: f32) -> f32 {
        self.advance_by(frequency * sample_time)
    }

    /// Advance by a raw normalized increment and return the new phase.
    #[inline]
    pub fn advance_by(&mut self, increment: f32) -> f32 {
        self.phase = wrap_unit(self.phase + increment);
        self.phase
    }

    /// Advance and report whether the phase wrapped past 1.0.
    #[inline]
    pub fn advance_wrapping(&mut self, increment: f32) -> bool {
        let before = self.phase;
        let after = self.advance_by(increment);
        increment > 0.0 && after < before
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_unit(phase);
    }

    /// Sine of the current phase.
    #[inline]
    pub fn sine(&self) -> f32 {
        (TAU * self.phase).sin()
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// One partial of a compound LFO, read off the shared phase.
#[derive(Debug, Clone, Copy)]
pub struct Partial {
    pub ratio: f32,
    pub gain: f32,
}

impl Partial {
    pub const fn new(ratio: f32, gain: f32) -> Self {
        Self { ratio, gain }
    }
}

/// Sum of sinusoidal partials sharing one phase (wow/flutter style motion).
#[derive(Debug, Clone, Copy)]
pub struct CompoundLfo<const N: usize> {
    phasor: Phasor,
    partials: [Partial; N],
}

impl<const N: usize> CompoundLfo<N> {
    pub const fn new(partials: [Partial; N]) -> Self {
        Self {
            phasor: Phasor { phase: 0.0 },
            partials,
        }
    }

    /// Advance at `rate_hz` and return the summed value.
    #[inline]
    pub fn next(&mut self, rate_hz: f32, sample_time: f32) -> f32 {
        self.phasor.advance(rate_hz, sample_time);
        self.value()
    }

    /// Summed value at the current phase.
    pub fn value(&self) -> f32 {
        let phase = self.phasor.phase();
        self.partials
            .iter()
            .map(|p| (TAU * phase * p.ratio).sin() * p.gain)
            .sum()
    }

    pub fn phase(&self) -> f32 {
        self.phasor.phase()
    }

    pub fn reset(&mut self) {
        self.phasor.reset();
    }
}
