//! Control-voltage resolution and pitch conversion.

/*
Control Voltages
================

Every knob on a module is a normalized value, usually in [0, 1]. A patched
control voltage (CV) moves the knob around its panel position:

    value = clamp(knob + (cv / 10 V) × attenuverter, 0, 1)

  cv            the incoming voltage, ±10 V full scale
  attenuverter  bipolar scale in [-1, +1]; negative values invert the CV
  knob          the panel position


1 V/Oct Pitch
-------------

Pitch inputs follow the one-volt-per-octave convention. 0 V is middle C:

    frequency = 261.626 Hz × 2^volts

    volts   frequency
    -1.0    130.81 Hz  (C3)
     0.0    261.63 Hz  (C4)
    +1.0    523.25 Hz  (C5)


Exponential Cutoff
------------------

Filter-style knobs sweep 20 Hz to 20 kHz over the knob's travel, evenly in
octaves rather than in Hz:

    cutoff = 20 × 1000^c

    c = 0.0  →     20 Hz
    c = 0.5  →  ~632 Hz
    c = 1.0  →  20000 Hz
*/

/// Middle C, the 0 V reference for pitch inputs.
pub const FREQ_C4: f32 = 261.626;

/// Full-scale control voltage.
pub const CV_FULL_SCALE: f32 = 10.0;

/// Resolve a knob plus an attenuated CV into [0, 1].
#[inline]
pub fn apply_cv(knob: f32, cv_volts: f32, attenuverter: f32) -> f32 {
    (knob + cv_volts / CV_FULL_SCALE * attenuverter).clamp(0.0, 1.0)
}

/// Convert a 1 V/Oct voltage to Hz.
#[inline]
pub fn voct_to_freq(volts: f32) -> f32 {
    FREQ_C4 * volts.exp2()
}

/// Map a normalized control to the 20 Hz – 20 kHz exponential range.
#[inline]
pub fn cutoff_from_control(control: f32) -> f32 {
    20.0 * 1000.0_f32.powf(control)
}

/// Calculate the modulated parameter value.
///
/// The modulated value: base + (modulator × depth)
#[inline]
pub fn apply_modulation(base_value: f32, modulator: f32, depth: f32) -> f32 {
    base_value + (modulator * depth)
}
