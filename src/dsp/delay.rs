//! Circular delay lines.
//!
//! A delay line is a ring buffer with a write cursor. Each sample is written
//! at the cursor, the cursor advances, and reads look back from the most
//! recently written sample:
//!
//! ```text
//!            newest
//!              ↓
//! [ x  x  x  x  n  o  o  o  o  o ]     read(0) = newest
//!                 ↑                    read(d) = written d samples earlier
//!            write_pos (next write, also the oldest sample)
//! ```
//!
//! # Fractional Delay
//!
//! Modulated effects need delays between integer samples. `read_interpolated`
//! blends the two neighbouring taps linearly:
//!
//! ```text
//! delay 12.25 → read(12) × 0.75 + read(13) × 0.25
//! ```
//!
//! The delay is clamped to [0, capacity − 2] so the second tap always exists,
//! and a whole-number delay returns the integer tap exactly.
//!
//! # Wow and Flutter
//!
//! Tape-style motion modulates the delay time with slow sinusoids: a sub-Hz
//! "wow" and a few-Hz "flutter". The delay is sampled every tick, so the
//! pitch of the delayed signal bends smoothly as the read head speeds up and
//! slows down.

use std::f32::consts::TAU;

use crate::dsp::lfo::Phasor;
use crate::dsp::mix::crossfade;

#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Allocate a line holding `capacity` samples (at least 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2)],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Sample written `delay` writes before the newest (clamped to capacity − 1).
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.min(len - 1);
        self.buffer[(self.write_pos + len - 1 - delay) % len]
    }

    /// Linearly interpolated read; `delay` is clamped to [0, capacity − 2].
    #[inline]
    pub fn read_interpolated(&self, delay: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let delay = if delay.is_finite() {
            delay.clamp(0.0, max)
        } else {
            0.0
        };
        let whole = delay.floor();
        let frac = delay - whole;
        let index = whole as usize;
        crossfade(self.read(index), self.read(index + 1), frac)
    }

    /// Write then read at an integer delay.
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        self.write(sample);
        self.read(delay_samples)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Delay line with an interpolated, per-sample delay time and dry/wet blend.
#[derive(Debug, Clone)]
pub struct ModulatedDelay {
    line: DelayLine,
}

impl ModulatedDelay {
    pub fn new(capacity: usize) -> Self {
        Self {
            line: DelayLine::new(capacity),
        }
    }

    /// Write `input`, read back at `delay_samples`, blend by `wet`.
    #[inline]
    pub fn process(&mut self, input: f32, delay_samples: f32, wet: f32) -> f32 {
        self.line.write(input);
        let delayed = self.line.read_interpolated(delay_samples);
        crossfade(input, delayed, wet)
    }

    pub fn line(&self) -> &DelayLine {
        &self.line
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

/// Two free-running sinusoids summed into a delay offset in samples.
#[derive(Debug, Clone, Copy)]
pub struct WowFlutter {
    wow: Phasor,
    flutter: Phasor,
    wow_hz: f32,
    flutter_hz: f32,
}

impl WowFlutter {
    pub fn new(wow_hz: f32, flutter_hz: f32) -> Self {
        Self {
            wow: Phasor::new(),
            flutter: Phasor::new(),
            wow_hz,
            flutter_hz,
        }
    }

    /// Advance both oscillators and return `wow·wow_depth + flutter·flutter_depth`.
    #[inline]
    pub fn next(&mut self, sample_rate: f32, wow_depth: f32, flutter_depth: f32) -> f32 {
        self.wow.advance_by(self.wow_hz / sample_rate);
        self.flutter.advance_by(self.flutter_hz / sample_rate);
        (TAU * self.wow.phase()).sin() * wow_depth + (TAU * self.flutter.phase()).sin() * flutter_depth
    }

    /// Current phase of the slow oscillator.
    pub fn wow_phase(&self) -> f32 {
        self.wow.phase()
    }

    pub fn reset(&mut self) {
        self.wow.reset();
        self.flutter.reset();
    }
}
