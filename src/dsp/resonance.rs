//! Character-switching resonance.
//!
//! One knob, three behaviours. The resonance amount picks a region and the
//! position inside that region sets the intensity:
//!
//! ```text
//!  0.00      0.33         0.66          1.00
//!   ├─ soft ──┼─ metallic ──┼─ fractal ────┤
//!   one-pole   ringing sine   tanh + fold
//!   feedback   at cutoff      + feedback
//! ```
//!
//! The boundaries are hard switches: crossing 0.33 or 0.66 changes the
//! algorithm in a single sample and keeps whatever is in the memory cell.
//! Sweeping the knob across a boundary therefore clicks. That is the
//! instrument's behaviour and is not smoothed here.
//!
//! A single memory register carries state between samples in every region;
//! it is clamped to ±10, as is the output.

use std::f32::consts::{PI, TAU};

use crate::dsp::clamp_state;
use crate::dsp::lfo::Phasor;

/// Resonance below this passes the input through untouched.
pub const RESONANCE_THRESHOLD: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Character {
    Soft,
    Metallic,
    Fractal,
}

impl Character {
    /// Region for a resonance amount, or `None` when the stage is off.
    pub fn from_resonance(resonance: f32) -> Option<Self> {
        if resonance < RESONANCE_THRESHOLD {
            None
        } else if resonance < 0.33 {
            Some(Self::Soft)
        } else if resonance < 0.66 {
            Some(Self::Metallic)
        } else {
            Some(Self::Fractal)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterResonance {
    memory: f32,
    ring: Phasor,
}

impl CharacterResonance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, input: f32, resonance: f32, cutoff_hz: f32, sample_rate: f32) -> f32 {
        let Some(character) = Character::from_resonance(resonance) else {
            return input;
        };

        let output = match character {
            Character::Soft => {
                let amount = resonance / 0.33;
                let output = input + self.memory * amount * 0.8;
                self.memory = output * 0.99;
                output
            }
            Character::Metallic => {
                let amount = (resonance - 0.33) / 0.33;
                let increment = (cutoff_hz / sample_rate).clamp(0.001, 0.45);
                self.ring.advance_by(increment);
                let ring = (TAU * self.ring.phase()).sin();

                let output = input + ring * amount * 0.6;
                self.memory = clamp_state((output + self.memory * 0.95) * 0.5);
                output + self.memory * amount
            }
            Character::Fractal => {
                let amount = (resonance - 0.66) / 0.34;
                let shaped = (input * (1.0 + amount * 3.0)).tanh();
                let fractal = shaped + (shaped * 20.0 * PI).sin() * amount * 0.4;

                self.memory = fractal * 0.98 + self.memory * amount * 0.7;
                input * (1.0 - amount) + (fractal + self.memory) * amount
            }
        };

        self.memory = clamp_state(self.memory);
        clamp_state(output)
    }

    pub fn memory(&self) -> f32 {
        self.memory
    }

    pub fn reset(&mut self) {
        self.memory = 0.0;
        self.ring.reset();
    }
}
