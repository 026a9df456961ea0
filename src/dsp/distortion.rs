//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. The "drive" parameter
//! controls how aggressively the signal is pushed into the nonlinear region.
//!
//! # How Waveshaping Works
//!
//! A waveshaper applies a transfer function to each sample:
//!   output = f(input * drive)
//!
//! When drive is low (1.0), the signal stays in the linear region of f()
//! and passes through mostly unchanged. As drive increases, the signal hits
//! the nonlinear parts of f(), creating harmonic distortion.
//!
//! # Shapers Used by the Modules
//!
//! Tanh drive:
//!   f(x) = tanh(x · gain)
//!   - The default "analog" saturation everywhere in this crate
//!
//! Foldback:
//!   When x exceeds the threshold it reflects back into range, repeatedly.
//!   Computed in closed form (a triangle wave of the input) so arbitrarily
//!   large inputs cost the same as small ones.
//!
//! Fold passes:
//!   A bounded number of single reflections. Unlike foldback this can leave
//!   the signal outside ±1 when the input is far out of range; the caller's
//!   output clamp takes care of that.
//!
//! Chebyshev polynomials:
//!   Tₙ(cos θ) = cos(nθ), so feeding a full-scale sine into Tₙ yields its
//!   n-th harmonic. Used for "topology" warping.
//!
//! Bit reduction:
//!   Quantize to 2^bits steps. Fewer bits, more grit.

/// Hyperbolic tangent saturation.
#[inline]
pub fn tanh_drive(sample: f32, gain: f32) -> f32 {
    (sample * gain).tanh()
}

/// Foldback distortion - signal folds back when exceeding threshold.
///
/// Equivalent to reflecting repeatedly at ±threshold until in range.
#[inline]
pub fn foldback(sample: f32, drive: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 0.0;
    }
    let x = sample * drive;
    let period = 4.0 * threshold;
    threshold - ((x + threshold).rem_euclid(period) - 2.0 * threshold).abs()
}

/// Reflect at ±1 at most `passes` times.
#[inline]
pub fn fold_passes(sample: f32, passes: usize) -> f32 {
    let mut x = sample;
    for _ in 0..passes {
        if x > 1.0 {
            x = 2.0 - x;
        }
        if x < -1.0 {
            x = -2.0 - x;
        }
    }
    x
}

/// Chebyshev polynomial of the first kind, Tₙ(x).
#[inline]
pub fn chebyshev(order: u32, x: f32) -> f32 {
    match order {
        0 => 1.0,
        1 => x,
        _ => {
            let mut t0 = 1.0;
            let mut t1 = x;
            for _ in 2..=order {
                let tn = 2.0 * x * t1 - t0;
                t0 = t1;
                t1 = tn;
            }
            t1
        }
    }
}

/// Quantize to `bits` bits of resolution per unit.
#[inline]
pub fn bit_reduce(sample: f32, bits: f32) -> f32 {
    let steps = bits.exp2();
    (sample * steps).round() / steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foldback_below_threshold() {
        let output = foldback(0.3, 1.0, 1.0);
        assert!((output - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_foldback_above_threshold() {
        // 0.7 * 2 = 1.4, folds to 2*1 - 1.4 = 0.6
        let output = foldback(0.7, 2.0, 1.0);
        assert!((output - 0.6).abs() < 1e-6);
        let output = foldback(-0.7, 2.0, 1.0);
        assert!((output + 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_foldback_huge_input_stays_bounded() {
        for &x in &[3.0, -3.0, 17.25, 1e6, -1e6] {
            let y = foldback(x, 1.0, 1.0);
            assert!(y.abs() <= 1.0 + 1e-4, "foldback({}) = {}", x, y);
        }
        // three reflections land exactly on the lower rail
        assert!((foldback(3.0, 1.0, 1.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fold_passes_matches_single_reflection() {
        assert!((fold_passes(1.5, 3) - 0.5).abs() < 1e-6);
        assert!((fold_passes(-1.5, 3) + 0.5).abs() < 1e-6);
        assert_eq!(fold_passes(0.25, 3), 0.25);
    }

    #[test]
    fn test_chebyshev_harmonics() {
        // T_n(cos θ) = cos(nθ)
        for order in 0..10u32 {
            for step in 0..16 {
                let theta = step as f32 * 0.2;
                let expected = (order as f32 * theta).cos();
                let got = chebyshev(order, theta.cos());
                assert!(
                    (got - expected).abs() < 1e-3,
                    "T{}(cos {}) = {}, expected {}",
                    order,
                    theta,
                    got,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_bit_reduce_steps() {
        // 2 bits → quarter steps
        assert_eq!(bit_reduce(0.3, 2.0), 0.25);
        assert_eq!(bit_reduce(-0.4, 2.0), -0.5);
        assert_eq!(bit_reduce(0.5, 16.0), 0.5);
    }
}
