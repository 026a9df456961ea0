//! Fixed-size wavetables with gated regeneration.
//!
//! A wavetable is one cycle of a waveform stored at 2048 evenly spaced
//! phase points. Oscillators read it with a phase in [0, 1):
//!
//! ```text
//! position = phase × 2048
//! sample   = table[i] × (1 − frac) + table[(i + 1) mod 2048] × frac
//! ```
//!
//! The `mod 2048` on the second tap is the wraparound: reading just before
//! phase 1.0 blends the last entry with the first.
//!
//! # Regeneration
//!
//! Morphing tables are rebuilt from a "topology" control by blending through
//! a fixed sequence of basis shapes. Rebuilding 2048 entries every sample is
//! wasteful, so a table only regenerates when the control has moved more
//! than 0.01 since the last build. Generation is a pure function of the
//! control value: building twice from the same value gives bit-identical
//! tables.

use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::distortion::{chebyshev, foldback};
use crate::dsp::lfo::wrap_unit;
use crate::dsp::mix::crossfade;

pub const TABLE_SIZE: usize = 2048;

/// Minimum control movement that triggers a rebuild.
pub const REGEN_THRESHOLD: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Vec<f32>,
}

impl Wavetable {
    /// Build a table from a function of normalized phase.
    pub fn from_fn(f: impl Fn(f32) -> f32) -> Self {
        let mut table = Self {
            samples: vec![0.0; TABLE_SIZE],
        };
        table.fill(f);
        table
    }

    pub fn fill(&mut self, f: impl Fn(f32) -> f32) {
        for (i, sample) in self.samples.iter_mut().enumerate() {
            *sample = f(i as f32 / TABLE_SIZE as f32);
        }
    }

    /// Linear interpolation with wraparound.
    #[inline]
    pub fn read_linear(&self, phase: f32) -> f32 {
        let position = wrap_unit(phase) * TABLE_SIZE as f32;
        let whole = position.floor();
        let i0 = whole as usize % TABLE_SIZE;
        let i1 = (i0 + 1) % TABLE_SIZE;
        crossfade(self.samples[i0], self.samples[i1], position - whole)
    }

    /// Truncating lookup (no interpolation).
    #[inline]
    pub fn read_nearest(&self, phase: f32) -> f32 {
        let index = (wrap_unit(phase) * TABLE_SIZE as f32) as usize % TABLE_SIZE;
        self.samples[index]
    }

    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        self.samples[index % TABLE_SIZE]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

/// Sawtooth with second and third harmonic overtones.
pub fn siren_saw(t: f32) -> f32 {
    2.0 * t - 1.0 + 0.3 * (TAU * t * 2.0).sin() + 0.2 * (TAU * t * 3.0).sin()
}

/// Basis sequences a morphing table blends through.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// sine → Chebyshev T₅ → folded sine → discontinuous impulse
    SpectralFold,
    /// sine → sawtooth → folded sine
    TritoneMorph,
}

impl TableShape {
    /// Table value at phase `t` for a given topology control.
    pub fn sample(self, control: f32, t: f32) -> f32 {
        match self {
            Self::SpectralFold => spectral_fold(control, t),
            Self::TritoneMorph => tritone_morph(control, t),
        }
    }
}

fn spectral_fold(control: f32, t: f32) -> f32 {
    let sine = (TAU * t).sin();
    if control < 0.33 {
        let blend = control / 0.33;
        crossfade(sine, chebyshev(5, sine), blend)
    } else if control < 0.66 {
        let blend = (control - 0.33) / 0.33;
        let folded = foldback(sine, 1.0 + blend * 2.0, 1.0);
        crossfade(chebyshev(5, sine), folded, blend)
    } else {
        let blend = (control - 0.66) / 0.34;
        let folded = foldback(sine, 3.0, 1.0);
        let impulse = if t < 0.1 { 1.0 } else { -0.1 };
        crossfade(folded, impulse, blend)
    }
}

fn tritone_morph(control: f32, t: f32) -> f32 {
    let sine = (TAU * t).sin();
    let saw = 2.0 * t - 1.0;
    if control < 0.5 {
        crossfade(sine, saw, control * 2.0)
    } else {
        let folded = (3.0 * PI * t).sin() * 0.5 + sine * 0.5;
        crossfade(saw, folded, (control - 0.5) * 2.0)
    }
}

/// A wavetable rebuilt from a topology control when it moves far enough.
#[derive(Debug, Clone)]
pub struct MorphingTable {
    table: Wavetable,
    shape: TableShape,
    last_control: f32,
}

impl MorphingTable {
    /// Build at control 0.
    pub fn new(shape: TableShape) -> Self {
        Self {
            table: Wavetable::from_fn(|t| shape.sample(0.0, t)),
            shape,
            last_control: 0.0,
        }
    }

    /// Rebuild if `control` moved more than the threshold; returns whether it did.
    pub fn update(&mut self, control: f32) -> bool {
        if (control - self.last_control).abs() > REGEN_THRESHOLD {
            self.regenerate(control);
            true
        } else {
            false
        }
    }

    /// Unconditionally rebuild for `control`.
    pub fn regenerate(&mut self, control: f32) {
        let shape = self.shape;
        self.table.fill(|t| shape.sample(control, t));
        self.last_control = control;
    }

    pub fn table(&self) -> &Wavetable {
        &self.table
    }

    pub fn last_control(&self) -> f32 {
        self.last_control
    }

    /// Back to the control-0 table.
    pub fn reset(&mut self) {
        self.regenerate(0.0);
    }
}
