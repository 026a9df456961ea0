use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::clamp_state;
use crate::dsp::lfo::{wrap_unit, Phasor};

/*
Morphing Oscillator
===================

One phase, four waveform algorithms, one "shape" knob sweeping through them.
A second "harmonics" knob changes the character inside each algorithm.

Algorithms (phase p in [0, 1), harmonics h in [0, 1]):

  Fractal saw   saw(p) · (1 − h) + (saw(2p) · 0.5 + saw(4p) · 0.25) · h
                Octave-stacked sawtooth. h = 0 is a plain saw.

  Polygon       triangle(p) · (1 − h) + square(p) · h
                Corners sharpen from triangle into square.

  String        y = 0.1 · sin(2πp) + y[n − 256] · 0.99 · (1 − 0.5h)
                A sine exciting a 256-sample feedback loop. Stateful: the
                loop only advances when this algorithm is evaluated.

  Neuron spike  sin(2πp) · (p / 0.1)²                  for p < 0.1
                sin(2πp) · e^(−5t(1 + 4h)),  t = (p − 0.1)/0.9  otherwise
                Fast attack, exponential decay.


Shape Regions
-------------

    shape   0.00     0.25         0.50         0.75        1.00
            ├─ fractal ─┼─ F→P │ P→S ─┼─ P→S │ S→N ─┼─ S→N │ N ─┤

  Region 1 (0.00–0.25)  fractal saw only
  Region 2 (0.25–0.50)  fractal→polygon, then polygon→string
  Region 3 (0.50–0.75)  polygon→string, then string→neuron
  Region 4 (0.75–1.00)  string→neuron, then neuron only

Each region's local position runs 0..1; the first half blends from the
previous algorithm, the second half towards the next one. Regions 2–4 each
restart their first blend, so the output jumps at shape 0.50 (string back to
polygon) and at 0.75 (neuron back to string). Those seams are part of the
instrument and are left as they are.

In region 1 the blend towards the polygon would only complete exactly at
0.25, which already belongs to region 2. The region is therefore the pure
fractal saw all the way, with no division that could reach a zero width.
*/

/// Length of the string feedback loop.
pub const STRING_LENGTH: usize = 256;

/// Which algorithm dominates a given shape position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    FractalSaw,
    Polygon,
    String,
    NeuronSpike,
}

impl Algorithm {
    pub fn for_shape(shape: f32) -> Self {
        if shape < 0.25 {
            Self::FractalSaw
        } else if shape < 0.5 {
            Self::Polygon
        } else if shape < 0.75 {
            Self::String
        } else {
            Self::NeuronSpike
        }
    }
}

#[inline]
fn saw(phase: f32) -> f32 {
    phase * 2.0 - 1.0
}

/// Octave-stacked sawtooth.
#[inline]
pub fn fractal_saw(phase: f32, harmonics: f32) -> f32 {
    let saw1 = saw(phase);
    let saw2 = saw(wrap_unit(phase * 2.0));
    let saw3 = saw(wrap_unit(phase * 4.0));
    saw1 * (1.0 - harmonics) + (saw2 * 0.5 + saw3 * 0.25) * harmonics
}

/// Triangle morphing into square.
#[inline]
pub fn polygon(phase: f32, harmonics: f32) -> f32 {
    let triangle = if phase < 0.5 {
        phase * 4.0 - 1.0
    } else {
        3.0 - phase * 4.0
    };
    let square = if phase < 0.5 { 1.0 } else { -1.0 };
    triangle * (1.0 - harmonics) + square * harmonics
}

/// Sine with a quadratic attack window and exponential decay.
#[inline]
pub fn neuron_spike(phase: f32, harmonics: f32) -> f32 {
    let carrier = (TAU * phase).sin();
    if phase < 0.1 {
        let t = phase / 0.1;
        carrier * t * t
    } else {
        let t = (phase - 0.1) / 0.9;
        carrier * (-t * 5.0 * (1.0 + harmonics * 4.0)).exp()
    }
}

/// Sine-excited feedback loop.
#[derive(Debug, Clone)]
pub struct StringSolver {
    buffer: [f32; STRING_LENGTH],
    pos: usize,
}

impl StringSolver {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; STRING_LENGTH],
            pos: 0,
        }
    }

    #[inline]
    pub fn next(&mut self, phase: f32, harmonics: f32) -> f32 {
        let excitation = (TAU * phase).sin();
        let feedback = self.buffer[self.pos] * 0.99 * (1.0 - harmonics * 0.5);
        let sample = clamp_state(excitation * 0.1 + feedback);
        self.buffer[self.pos] = sample;
        self.pos = (self.pos + 1) % STRING_LENGTH;
        sample
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

impl Default for StringSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Four-algorithm oscillator driven by one phase accumulator.
#[derive(Debug, Clone, Default)]
pub struct MorphOscillator {
    phase: Phasor,
    string: StringSolver,
}

impl MorphOscillator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance at `frequency` and return the morphed sample.
    #[inline]
    pub fn next(&mut self, frequency: f32, sample_time: f32, shape: f32, harmonics: f32) -> f32 {
        let phase = self.phase.advance(frequency, sample_time);
        self.morph(phase, shape, harmonics)
    }

    /// Evaluate the shape blend at an explicit phase.
    ///
    /// Only the algorithms the current region needs are evaluated, so the
    /// string loop advances only while it is audible.
    pub fn morph(&mut self, phase: f32, shape: f32, harmonics: f32) -> f32 {
        let shape = shape.clamp(0.0, 1.0);

        match Algorithm::for_shape(shape) {
            Algorithm::FractalSaw => fractal_saw(phase, harmonics),
            Algorithm::Polygon => {
                let local = (shape - 0.25) / 0.25;
                let poly = polygon(phase, harmonics);
                if local < 0.5 {
                    let fractal = fractal_saw(phase, harmonics);
                    fractal + (poly - fractal) * local * 2.0
                } else {
                    let string = self.string.next(phase, harmonics);
                    poly + (string - poly) * (local - 0.5) * 2.0
                }
            }
            Algorithm::String => {
                let local = (shape - 0.5) / 0.25;
                let string = self.string.next(phase, harmonics);
                if local < 0.5 {
                    let poly = polygon(phase, harmonics);
                    poly + (string - poly) * local * 2.0
                } else {
                    let spike = neuron_spike(phase, harmonics);
                    string + (spike - string) * (local - 0.5) * 2.0
                }
            }
            Algorithm::NeuronSpike => {
                let local = (shape - 0.75) / 0.25;
                let spike = neuron_spike(phase, harmonics);
                if local < 0.5 {
                    let string = self.string.next(phase, harmonics);
                    string + (spike - string) * local * 2.0
                } else {
                    spike
                }
            }
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase.phase()
    }

    pub fn reset(&mut self) {
        self.phase.reset();
        self.string.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep_phases() -> impl Iterator<Item = f32> {
        (0..1_000).map(|i| i as f32 / 1_000.0)
    }

    #[test]
    fn test_fractal_saw_plain_at_zero_harmonics() {
        for p in sweep_phases() {
            assert_eq!(fractal_saw(p, 0.0), p * 2.0 - 1.0);
        }
    }

    #[test]
    fn test_polygon_endpoints() {
        assert_eq!(polygon(0.25, 0.0), 0.0);
        assert_eq!(polygon(0.5, 0.0), 1.0);
        assert_eq!(polygon(0.1, 1.0), 1.0);
        assert_eq!(polygon(0.9, 1.0), -1.0);
    }

    #[test]
    fn test_neuron_spike_attack_then_decay() {
        assert_eq!(neuron_spike(0.0, 0.5), 0.0);
        let early = neuron_spike(0.2, 0.0).abs();
        let late = neuron_spike(0.45, 0.0).abs();
        assert!(late < early, "spike should decay: {} then {}", early, late);
    }

    #[test]
    fn test_every_shape_is_finite_and_bounded() {
        let mut osc = MorphOscillator::new();
        for step in 0..=100 {
            let shape = step as f32 / 100.0;
            for &h in &[0.0, 0.5, 1.0] {
                for _ in 0..512 {
                    let y = osc.next(440.0, 1.0 / 48_000.0, shape, h);
                    assert!(y.is_finite() && y.abs() <= 10.0, "shape {} h {} → {}", shape, h, y);
                }
            }
        }
    }

    #[test]
    fn test_first_region_never_divides_by_zero() {
        let mut osc = MorphOscillator::new();
        let just_below = 0.25f32 - f32::EPSILON;
        for p in sweep_phases() {
            let y = osc.morph(p, just_below, 0.7);
            assert_eq!(y, fractal_saw(p, 0.7));
        }
    }

    #[test]
    fn test_region_two_starts_at_fractal() {
        let mut osc = MorphOscillator::new();
        for p in sweep_phases() {
            assert_eq!(osc.morph(p, 0.25, 0.3), fractal_saw(p, 0.3));
        }
    }

    #[test]
    fn test_top_quarter_is_pure_spike() {
        let mut osc = MorphOscillator::new();
        for p in sweep_phases() {
            assert_eq!(osc.morph(p, 1.0, 0.2), neuron_spike(p, 0.2));
        }
    }

    #[test]
    fn test_string_loop_accumulates() {
        let mut string = StringSolver::new();
        let mut first_pass = 0.0f32;
        let mut later_pass = 0.0f32;
        for n in 0..(STRING_LENGTH * 20) {
            let p = (n % 64) as f32 / 64.0;
            let y = string.next(p, 0.0);
            if n < STRING_LENGTH {
                first_pass = first_pass.max(y.abs());
            } else {
                later_pass = later_pass.max(y.abs());
            }
        }
        assert!(later_pass > first_pass, "feedback should build: {} vs {}", first_pass, later_pass);
    }

    #[test]
    fn test_algorithm_for_shape() {
        assert_eq!(Algorithm::for_shape(0.1), Algorithm::FractalSaw);
        assert_eq!(Algorithm::for_shape(0.3), Algorithm::Polygon);
        assert_eq!(Algorithm::for_shape(0.6), Algorithm::String);
        assert_eq!(Algorithm::for_shape(0.9), Algorithm::NeuronSpike);
    }
}
