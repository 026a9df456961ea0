//! Crossfades and dry/wet blending.

/*
Crossfading
===========

Almost every stage in the modules ends the same way: the processed signal is
blended back against whatever went in.

    output = a × (1 − t) + b × t

  t = 0.0  →  all A
  t = 0.5  →  half of each
  t = 1.0  →  all B

The weights always sum to 1.0, so two full-scale signals never sum above
full scale.


Scaled Wet Amounts
------------------

Effects rarely go fully wet. A stage with an amount knob usually maps it
through a ceiling before blending:

    wet = amount × ceiling       (e.g. 0.4 for tape motion, 0.85 for dispersion)
    out = dry × (1 − wet) + processed × wet

`blend_scaled` is exactly this: callers pass the knob and the ceiling
instead of pre-multiplying at every call site.


Exactness at the Ends
---------------------

With t = 0.0 the result is `a × 1.0 + b × 0.0`, which is bit-identical to `a`
for any finite `b`. That property is what lets "amount = 0" bypass tests
compare for exact equality rather than within a tolerance.

    Level
      1.0 ──────╲      ╱──────
                 ╲    ╱
      0.5         ╲  ╱   linear crossfade dips in perceived loudness
                   ╲╱    at the midpoint; none of the modules need
      0.0 ─────────────  equal-power curves
          0.0     0.5     1.0
*/

/// Linear crossfade between two samples.
#[inline]
pub fn crossfade(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Blend with the wet share capped at `ceiling`.
#[inline]
pub fn blend_scaled(dry: f32, wet: f32, amount: f32, ceiling: f32) -> f32 {
    crossfade(dry, wet, amount * ceiling)
}
