//! Clock edge detection and fixed-length pulses.
//!
//! ```text
//!  clock in   ___/‾‾‾‾‾\_____/‾‾‾‾‾\____
//!  schmitt       ↑ true          ↑ true
//!  pulse      ___▌_______________▌______   (fixed duration, retriggerable)
//! ```
//!
//! The trigger has hysteresis: it goes high at or above `high` and only
//! re-arms once the input falls to `low` or below, so a noisy edge fires
//! once. It starts in the high state, which means a clock already held
//! high when processing begins is not counted as an edge.

/// Rising-edge detector with hysteresis.
#[derive(Debug, Clone, Copy)]
pub struct SchmittTrigger {
    low: f32,
    high: f32,
    is_high: bool,
}

impl SchmittTrigger {
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            low,
            high,
            is_high: true,
        }
    }

    /// Returns `true` on the sample where the input crosses `high` from a
    /// re-armed (low) state.
    #[inline]
    pub fn process(&mut self, input: f32) -> bool {
        if self.is_high {
            if input <= self.low {
                self.is_high = false;
            }
            false
        } else if input >= self.high {
            self.is_high = true;
            true
        } else {
            false
        }
    }

    pub fn is_high(&self) -> bool {
        self.is_high
    }

    pub fn reset(&mut self) {
        self.is_high = true;
    }
}

impl Default for SchmittTrigger {
    /// Thresholds at 0 V and 1 V.
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Gate that stays high for a set time after being triggered.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulseGenerator {
    remaining: f32,
}

impl PulseGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or extend) a pulse of `duration` seconds.
    pub fn trigger(&mut self, duration: f32) {
        if duration > self.remaining {
            self.remaining = duration;
        }
    }

    /// Advance by `sample_time`; returns whether the gate is high this sample.
    #[inline]
    pub fn process(&mut self, sample_time: f32) -> bool {
        if self.remaining > 0.0 {
            self.remaining -= sample_time;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_rising_edge() {
        let mut trigger = SchmittTrigger::default();
        let clock = [0.0, 0.5, 1.0, 2.0, 0.5, 2.0, 0.0, 1.0, 1.0, 0.0];
        let edges: Vec<bool> = clock.iter().map(|&v| trigger.process(v)).collect();
        assert_eq!(
            edges,
            [false, false, true, false, false, false, false, true, false, false]
        );
    }

    #[test]
    fn test_held_high_at_start_is_not_an_edge() {
        let mut trigger = SchmittTrigger::default();
        assert!(!trigger.process(5.0));
        assert!(!trigger.process(5.0));
        assert!(!trigger.process(0.0));
        assert!(trigger.process(5.0));
    }

    #[test]
    fn test_pulse_length() {
        let sample_time = 1.0 / 1_000.0;
        let mut pulse = PulseGenerator::new();
        pulse.trigger(0.01);
        let high = (0..100).filter(|_| pulse.process(sample_time)).count();
        // 10 ms at 1 kHz, give or take the rounding of the countdown
        assert!((10..=11).contains(&high), "pulse lasted {} samples", high);
    }

    #[test]
    fn test_retrigger_extends_not_shortens() {
        let mut pulse = PulseGenerator::new();
        pulse.trigger(1.0);
        pulse.trigger(0.1);
        for _ in 0..500 {
            assert!(pulse.process(0.001));
        }
    }

    #[test]
    fn test_idle_pulse_is_low() {
        let mut pulse = PulseGenerator::new();
        assert!(!pulse.process(0.001));
    }
}
