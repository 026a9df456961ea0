//! Low-level DSP primitives used by the instrument modules.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so they can live directly inside module structs. They stay focused on the
//! signal-processing math; the modules in `crate::modules` decide tuning,
//! ordering and blend curves.

/// Band-limited harmonic banks (spectral bloom, spectral shift).
pub mod additive;
/// First-order all-pass dispersion cascade.
pub mod allpass;
/// Circular delay lines with integer and interpolated reads.
pub mod delay;
/// Feed-forward diffusion network and multi-tap echo.
pub mod diffusion;
/// Waveshaping, folding and quantization.
pub mod distortion;
/// State-variable filter, one-pole lowpass and morphing cascade.
pub mod filter;
/// Portamento smoothing.
pub mod glide;
/// Free-running grain cloud.
pub mod granular;
/// Phase accumulators and compound low frequency oscillators.
pub mod lfo;
/// Crossfades and dry/wet blending.
pub mod mix;
/// Control-voltage resolution and pitch conversion.
pub mod modulate;
/// Four-algorithm morphing oscillator.
pub mod oscillator;
/// Character-switching resonance stage.
pub mod resonance;
/// Deterministic per-module random source.
pub mod rng;
/// Clock edge detection and pulse generation.
pub mod trigger;
/// Fixed-size wavetables with gated regeneration.
pub mod wavetable;

/// Envelope applied to every persistent filter/delay memory cell.
pub const STATE_LIMIT: f32 = 10.0;

/// Clamp a memory cell to the shared stability envelope.
#[inline]
pub fn clamp_state(value: f32) -> f32 {
    value.clamp(-STATE_LIMIT, STATE_LIMIT)
}
