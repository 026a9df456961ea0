//! Feed-forward diffusion and multi-tap echo.
//!
//! Both structures here are the "early reflections" half of a reverberator:
//! many delayed copies of the input, summed, with no feedback path.
//!
//! ```text
//!          ┌─→ [delay 10 ms] × g₀ ─┐
//! input ───┼─→ [delay 20 ms] × g₁ ─┼──→ Σ / N × amount ──→ output
//!          ├─→      ...            │
//!          └─→ [delay 80 ms] × g₇ ─┘
//! ```
//!
//! Without feedback the impulse response is exactly N taps long, so neither
//! structure can ring or self-oscillate no matter the settings.
//!
//! # Brightness Tilt
//!
//! Each diffusion path gets a fixed gain by `index % 3`: 0.7, 0.85, 1.0. The
//! later, brighter reflections sit a little louder than the darker ones,
//! which reads as a gentle spectral tilt across the cluster.
//!
//! # Echo Coloration
//!
//! The echo taps alternate: even taps are darkened by `1 − 0.3·bloom`, odd
//! taps brightened by `1 + 0.2·bloom`, and every tap decays as `1/(i+1)`.

use crate::dsp::delay::DelayLine;

/// Samples held by each diffusion path.
pub const DIFFUSION_CAPACITY: usize = 16_384;

/// Samples held by the echo buffer: the longest tap (0.5125 s) at 192 kHz.
pub const ECHO_CAPACITY: usize = 131_072;

/// Below this amount a stage is switched off.
pub const ACTIVE_THRESHOLD: f32 = 0.01;

const TILT: [f32; 3] = [0.7, 0.85, 1.0];

/// Gain of diffusion path `index`.
#[inline]
pub fn path_tilt(index: usize) -> f32 {
    TILT[index % 3]
}

/// Delay of diffusion path `index` in samples (10 ms steps, clamped to the buffer).
#[inline]
pub fn path_delay_samples(index: usize, sample_rate: f32) -> usize {
    let ms = 10.0 + 10.0 * index as f32;
    ((ms * sample_rate / 1000.0) as usize).min(DIFFUSION_CAPACITY - 1)
}

/// `N` parallel delay paths summed with a brightness tilt.
#[derive(Debug, Clone)]
pub struct DiffusionNetwork<const N: usize> {
    paths: Vec<DelayLine>,
}

impl<const N: usize> DiffusionNetwork<N> {
    pub fn new() -> Self {
        Self {
            paths: (0..N).map(|_| DelayLine::new(DIFFUSION_CAPACITY)).collect(),
        }
    }

    /// Wet output only; returns 0 and leaves the paths untouched below threshold.
    pub fn process(&mut self, input: f32, amount: f32, sample_rate: f32) -> f32 {
        if amount < ACTIVE_THRESHOLD {
            return 0.0;
        }

        let mut sum = 0.0;
        for (i, path) in self.paths.iter_mut().enumerate() {
            let delayed = path.next_sample(input, path_delay_samples(i, sample_rate));
            sum += delayed * path_tilt(i) / N as f32;
        }
        sum * amount
    }

    pub fn reset(&mut self) {
        for path in &mut self.paths {
            path.reset();
        }
    }
}

impl<const N: usize> Default for DiffusionNetwork<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Bloom-scaled multi-tap echo with alternating tap coloration.
#[derive(Debug, Clone)]
pub struct MultiTapEcho<const TAPS: usize> {
    line: DelayLine,
}

impl<const TAPS: usize> MultiTapEcho<TAPS> {
    pub fn new() -> Self {
        Self {
            line: DelayLine::new(ECHO_CAPACITY),
        }
    }

    /// Tap `index` delay in samples for a given bloom.
    ///
    /// Taps start at `50 + 200·bloom` ms and each one sits 15 % further out,
    /// so the last of eight lands at 2.05× the first (up to 512.5 ms).
    #[inline]
    pub fn tap_delay_samples(index: usize, bloom: f32, sample_rate: f32) -> usize {
        let base_seconds = 0.05 + bloom * 0.2;
        let seconds = base_seconds * (1.0 + index as f32 * 0.15);
        ((seconds * sample_rate) as usize).min(ECHO_CAPACITY - 1)
    }

    pub fn process(&mut self, input: f32, bloom: f32, sample_rate: f32) -> f32 {
        if bloom < ACTIVE_THRESHOLD {
            return input;
        }

        self.line.write(input);

        let mut output = input;
        for i in 0..TAPS {
            let tap = self.line.read(Self::tap_delay_samples(i, bloom, sample_rate));
            let amp = bloom * 0.6 / (i + 1) as f32;
            let color = if i % 2 == 0 {
                1.0 - 0.3 * bloom
            } else {
                1.0 + 0.2 * bloom
            };
            output += tap * color * amp;
        }
        output * 0.6
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

impl<const TAPS: usize> Default for MultiTapEcho<TAPS> {
    fn default() -> Self {
        Self::new()
    }
}
