//! Additive harmonic banks.
//!
//! Additive synthesis builds a tone from sine partials, one phase
//! accumulator each:
//!
//! ```text
//! output = Σ sin(2π · phase_k) · amp_k,    phase_k += freq_k / sampleRate
//! ```
//!
//! The banks here differ in how the partial frequencies and amplitudes
//! respond to a single "bloom" or "shift" control:
//!
//! - [`SpreadBloom`]: harmonic spacing stretched by up to 9×, amplitudes
//!   tilted up (bloom > 0.5) or down (bloom < 0.5), normalized by bloom.
//! - [`TritoneBloom`]: natural 1/h series whose upper partials swell with
//!   bloom; even partials bend towards a tritone (×√2) above bloom 0.5.
//! - [`SpectralShift`]: a 1/h series transposed by up to 3×, mixed on top
//!   of an input signal.
//!
//! # Nyquist Guard
//!
//! Any partial at or above 0.45 × sampleRate is skipped outright: its phase
//! does not advance and it contributes nothing. A sine above Nyquist does
//! not disappear when sampled, it folds back down as an alias, so leaving it
//! out is the only clean option.

use std::f32::consts::{SQRT_2, TAU};

use crate::dsp::lfo::Phasor;

/// Fraction of the sample rate above which partials are dropped.
pub const NYQUIST_RATIO: f32 = 0.45;

/// Highest partial frequency allowed at `sample_rate`.
#[inline]
pub fn nyquist_limit(sample_rate: f32) -> f32 {
    sample_rate * NYQUIST_RATIO
}

/// One phase accumulator per partial.
#[derive(Debug, Clone, Copy)]
pub struct HarmonicBank<const N: usize> {
    phases: [Phasor; N],
}

impl<const N: usize> HarmonicBank<N> {
    pub fn new() -> Self {
        Self {
            phases: [Phasor::new(); N],
        }
    }

    /// Advance partial `index` to `freq` and return its new phase, or `None`
    /// when `freq` is at or above the Nyquist guard.
    #[inline]
    pub fn advance(&mut self, index: usize, freq: f32, sample_rate: f32) -> Option<f32> {
        if freq >= nyquist_limit(sample_rate) {
            return None;
        }
        Some(self.phases[index].advance_by(freq / sample_rate))
    }

    pub fn phase(&self, index: usize) -> f32 {
        self.phases[index].phase()
    }

    pub fn reset(&mut self) {
        for phase in &mut self.phases {
            phase.reset();
        }
    }
}

impl<const N: usize> Default for HarmonicBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stretched, tilted harmonic series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadBloom<const N: usize> {
    bank: HarmonicBank<N>,
}

impl<const N: usize> SpreadBloom<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amplitude of partial `index` at a given bloom.
    #[inline]
    pub fn amplitude(index: usize, bloom: f32) -> f32 {
        let natural = 1.0 / (index as f32 + 1.0);
        let k = index as f32;
        if bloom > 0.5 {
            natural * (1.0 + (bloom - 0.5) * k * 1.5)
        } else {
            natural * (1.0 - (0.5 - bloom) * k * 0.8)
        }
    }

    pub fn process(&mut self, base_freq: f32, bloom: f32, sample_rate: f32) -> f32 {
        let spread = 1.0 + bloom * 8.0;
        let mut output = 0.0;
        for i in 0..N {
            let freq = base_freq * (i as f32 + 1.0) * spread;
            let Some(phase) = self.bank.advance(i, freq, sample_rate) else {
                continue;
            };
            let detune = bloom * 0.02 * ((i % 3) as f32 - 1.0);
            output += (TAU * (phase + detune)).sin() * Self::amplitude(i, bloom);
        }
        output / (N as f32 * 0.3 * (1.0 + bloom))
    }

    pub fn reset(&mut self) {
        self.bank.reset();
    }
}

/// Harmonic series with tritone-bent even partials.
#[derive(Debug, Clone, Copy, Default)]
pub struct TritoneBloom<const N: usize> {
    bank: HarmonicBank<N>,
}

impl<const N: usize> TritoneBloom<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amplitude of harmonic number `harmonic` (1-based).
    #[inline]
    pub fn amplitude(harmonic: usize, bloom: f32) -> f32 {
        let h = harmonic as f32;
        (1.0 / h) * (0.3 + bloom * 0.7) * (1.0 - bloom).powf(h * 0.5)
    }

    /// Frequency of harmonic number `harmonic` (1-based).
    #[inline]
    pub fn frequency(harmonic: usize, base_freq: f32, bloom: f32) -> f32 {
        let freq = base_freq * harmonic as f32;
        if harmonic % 2 == 0 && bloom > 0.5 {
            freq * (1.0 + (bloom - 0.5) * (SQRT_2 - 1.0))
        } else {
            freq
        }
    }

    pub fn process(&mut self, base_freq: f32, bloom: f32, sample_rate: f32) -> f32 {
        let mut output = 0.0;
        for i in 0..N {
            let harmonic = i + 1;
            let freq = Self::frequency(harmonic, base_freq, bloom);
            let Some(phase) = self.bank.advance(i, freq, sample_rate) else {
                continue;
            };
            output += (TAU * phase).sin() * Self::amplitude(harmonic, bloom);
        }
        output
    }

    pub fn reset(&mut self) {
        self.bank.reset();
    }
}

/// Transposed 1/h series layered over an input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralShift<const N: usize> {
    bank: HarmonicBank<N>,
}

impl<const N: usize> SpectralShift<N> {
    /// Shift below this passes the input through.
    pub const THRESHOLD: f32 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, input: f32, shift: f32, base_freq: f32, sample_rate: f32) -> f32 {
        if shift < Self::THRESHOLD {
            return input;
        }

        let ratio = 1.0 + shift * 2.0;
        let mut output = input * (1.0 - shift * 0.7);
        for i in 0..N {
            let freq = (i as f32 + 1.0) * ratio * base_freq;
            let Some(phase) = self.bank.advance(i, freq, sample_rate) else {
                continue;
            };
            let amp = 1.0 / (i as f32 + 1.0);
            output += (TAU * phase).sin() * amp * shift * 0.5;
        }
        output
    }

    pub fn reset(&mut self) {
        self.bank.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::{num_complex::Complex, FftPlanner};

    fn magnitudes(signal: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer.len());
        fft.process(&mut buffer);
        buffer.iter().map(|c| c.norm()).collect()
    }

    #[test]
    fn test_nyquist_truncation_spread_bloom() {
        // 1 kHz at bloom 1 → partials at 9k, 18k, 27k... ; only 9k and 18k fit
        // under 0.45 × 48k. A leaked 27k partial would alias to 21k.
        let sample_rate = 48_000.0;
        let len = 4_800; // 10 Hz bins
        let mut bloom = SpreadBloom::<16>::new();
        let signal: Vec<f32> = (0..len).map(|_| bloom.process(1_000.0, 1.0, sample_rate)).collect();
        let mags = magnitudes(&signal);

        let fundamental = mags[900];
        println!("9k={} 18k={} 21k={}", mags[900], mags[1_800], mags[2_100]);
        assert!(fundamental > 1.0);
        assert!(mags[1_800] > 1.0);
        assert!(mags[2_100] < fundamental * 1e-3, "aliased partial at 21 kHz: {}", mags[2_100]);
        for (bin, &m) in mags.iter().enumerate().take(len / 2) {
            if bin != 900 && bin != 1_800 {
                assert!(m < fundamental * 1e-3, "unexpected energy at bin {}: {}", bin, m);
            }
        }
    }

    #[test]
    fn test_partials_at_limit_do_not_advance() {
        let mut bank = HarmonicBank::<2>::new();
        assert_eq!(bank.advance(0, 21_600.0, 48_000.0), None);
        assert_eq!(bank.phase(0), 0.0);
        assert!(bank.advance(1, 21_599.0, 48_000.0).is_some());
    }

    #[test]
    fn test_tritone_bloom_respects_nyquist() {
        // 4 kHz fundamental: only harmonics 1 and 2 (8 kHz) fit below 0.45 × 22.05 kHz
        let sample_rate = 22_050.0;
        let mut bloom = TritoneBloom::<12>::new();
        let mut reference = HarmonicBank::<2>::new();
        for _ in 0..2_000 {
            let y = bloom.process(4_000.0, 0.3, sample_rate);
            let p1 = reference.advance(0, 4_000.0, sample_rate).unwrap_or(0.0);
            let p2 = reference.advance(1, 8_000.0, sample_rate).unwrap_or(0.0);
            let expected = (TAU * p1).sin() * TritoneBloom::<12>::amplitude(1, 0.3)
                + (TAU * p2).sin() * TritoneBloom::<12>::amplitude(2, 0.3);
            assert!((y - expected).abs() < 1e-5, "got {}, expected {}", y, expected);
        }
    }

    #[test]
    fn test_tritone_even_harmonics_bend_above_half() {
        let base = 100.0;
        assert_eq!(TritoneBloom::<12>::frequency(2, base, 0.5), 200.0);
        let bent = TritoneBloom::<12>::frequency(2, base, 1.0);
        assert!((bent - 200.0 * (1.0 + 0.5 * (SQRT_2 - 1.0))).abs() < 1e-3);
        assert_eq!(TritoneBloom::<12>::frequency(3, base, 1.0), 300.0);
    }

    #[test]
    fn test_spread_bloom_amplitude_tilt() {
        // bloom 0.5 keeps the natural series
        for i in 0..16 {
            let natural = 1.0 / (i as f32 + 1.0);
            assert!((SpreadBloom::<16>::amplitude(i, 0.5) - natural).abs() < 1e-6);
        }
        assert!(SpreadBloom::<16>::amplitude(8, 1.0) > SpreadBloom::<16>::amplitude(8, 0.5));
        assert!(SpreadBloom::<16>::amplitude(1, 0.2) < SpreadBloom::<16>::amplitude(1, 0.5));
    }

    #[test]
    fn test_spectral_shift_bypass() {
        let mut shift = SpectralShift::<16>::new();
        for n in 0..1_000 {
            let x = n as f32 * 0.001;
            assert_eq!(shift.process(x, 0.005, 440.0, 48_000.0), x);
        }
    }
}
