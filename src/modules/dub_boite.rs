use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::node::{write_secondary, Module, ParamInfo, ParamSet, ProcessCtx};
use crate::dsp::clamp_state;
use crate::dsp::delay::DelayLine;
use crate::dsp::diffusion::{DiffusionNetwork, DIFFUSION_CAPACITY};
use crate::dsp::filter::OnePole;
use crate::dsp::lfo::{CompoundLfo, Partial, Phasor};
use crate::dsp::mix::crossfade;

/*
DubBoite
========

A four-channel dub mixer with tape-flavoured channel strips and a diffused
send bus.

    ch1 ─→ fader ─→ scrub ─→ drift ─→ bloom ─┬──────────────→ Σ mix  ─→ ×master
    ch2 ─→   ...                             │
    ch3 ─→   ...                             └─ ×diffusion ─→ Σ send ─→ diffusion ─→ ×master
    ch4 ─→   ...

Unconnected channels (`None`) contribute nothing and do not touch their
strip's state.


Tape scrub
----------

Each strip reads its own 16384-sample line at 15 ms ± 10 ms, swept by one
shared compound LFO:

    lfo = sin(2πp) + 0.3 sin(2π · 2.7p) + 0.2 sin(2π · 5.3p),  rate 0.3 + 2·scrub Hz

Both millisecond terms are truncated to whole samples separately, then the
sum is clamped to [1, 16383]. The strip output crossfades from dry (scrub 0)
to fully delayed (scrub 1).


Low drift
---------

A 200 Hz one-pole per strip isolates the lows, a shared 0.2 Hz sine wobbles
their level by ±30 % × drift, and they are mixed back in at up to 50 %.


Saturation bloom
----------------

    sat    = tanh(x · (1 + 3b))
    shaped = sat + sin(3π · sat) · 0.2b
    out    = shaped + (0.1 · shaped) · b

Both shared LFOs advance once per sample whatever the channel count.
*/

const CHANNELS: usize = 4;
const DIFFUSION_PATHS: usize = 8;
const SCRUB_BASE_MS: f32 = 15.0;
const SCRUB_DEPTH_MS: f32 = 10.0;
const DRIFT_CUTOFF_HZ: f32 = 200.0;
const DRIFT_RATE_HZ: f32 = 0.2;
const STAGE_THRESHOLD: f32 = 0.01;

const SCRUB_PARTIALS: [Partial; 3] = [
    Partial::new(1.0, 1.0),
    Partial::new(2.7, 0.3),
    Partial::new(5.3, 0.2),
];

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DubBoiteParams {
    pub faders: [f32; CHANNELS],
    pub diffusion: f32,
    pub scrub: f32,
    pub low_drift: f32,
    pub saturation: f32,
    pub master: f32,
}

impl Default for DubBoiteParams {
    fn default() -> Self {
        Self {
            faders: [0.8; CHANNELS],
            diffusion: 0.4,
            scrub: 0.3,
            low_drift: 0.2,
            saturation: 0.5,
            master: 0.9,
        }
    }
}

impl ParamSet for DubBoiteParams {
    const INFO: &'static [ParamInfo] = &[
        ParamInfo::unit("fader 1", 0.8),
        ParamInfo::unit("fader 2", 0.8),
        ParamInfo::unit("fader 3", 0.8),
        ParamInfo::unit("fader 4", 0.8),
        ParamInfo::unit("diffusion", 0.4),
        ParamInfo::unit("scrub", 0.3),
        ParamInfo::unit("low drift", 0.2),
        ParamInfo::unit("saturation", 0.5),
        ParamInfo::unit("master", 0.9),
    ];

    fn get(&self, index: usize) -> Option<f32> {
        match index {
            0..=3 => Some(self.faders[index]),
            4 => Some(self.diffusion),
            5 => Some(self.scrub),
            6 => Some(self.low_drift),
            7 => Some(self.saturation),
            8 => Some(self.master),
            _ => None,
        }
    }

    fn store(&mut self, index: usize, value: f32) -> bool {
        match index {
            0..=3 => self.faders[index] = value,
            4 => self.diffusion = value,
            5 => self.scrub = value,
            6 => self.low_drift = value,
            7 => self.saturation = value,
            8 => self.master = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DubBoiteOutputs {
    pub mix: f32,
    pub send: f32,
}

/// Scrub delay in whole samples for one LFO value.
#[inline]
pub fn scrub_delay_samples(lfo: f32, scrub: f32, sample_rate: f32) -> usize {
    let base = (SCRUB_BASE_MS * sample_rate / 1000.0) as i64;
    let swing = (SCRUB_DEPTH_MS * sample_rate / 1000.0 * lfo * scrub) as i64;
    (base + swing).clamp(1, DIFFUSION_CAPACITY as i64 - 1) as usize
}

#[inline]
pub fn saturation_bloom(input: f32, bloom: f32) -> f32 {
    if bloom < STAGE_THRESHOLD {
        return input;
    }
    let saturated = (input * (1.0 + bloom * 3.0)).tanh();
    let shaped = saturated + (saturated * 3.0 * PI).sin() * bloom * 0.2;
    let memory = shaped * 0.1;
    shaped + memory * bloom
}

#[derive(Debug, Clone)]
struct ChannelStrip {
    tape: DelayLine,
    lows: OnePole,
}

impl ChannelStrip {
    fn new() -> Self {
        Self {
            tape: DelayLine::new(DIFFUSION_CAPACITY),
            lows: OnePole::new(),
        }
    }

    fn reset(&mut self) {
        self.tape.reset();
        self.lows.reset();
    }
}

#[derive(Debug, Clone)]
pub struct DubBoite {
    strips: [ChannelStrip; CHANNELS],
    scrub_lfo: CompoundLfo<3>,
    drift_lfo: Phasor,
    diffusion: DiffusionNetwork<DIFFUSION_PATHS>,
}

impl DubBoite {
    pub fn new() -> Self {
        Self {
            strips: std::array::from_fn(|_| ChannelStrip::new()),
            scrub_lfo: CompoundLfo::new(SCRUB_PARTIALS),
            drift_lfo: Phasor::new(),
            diffusion: DiffusionNetwork::new(),
        }
    }

    pub fn process(
        &mut self,
        ctx: &ProcessCtx,
        params: &DubBoiteParams,
        inputs: [Option<f32>; CHANNELS],
    ) -> DubBoiteOutputs {
        let dt = ctx.sample_time;
        let scrub_lfo = self.scrub_lfo.next(0.3 + params.scrub * 2.0, dt);
        let scrub_delay = scrub_delay_samples(scrub_lfo, params.scrub, ctx.sample_rate);

        let drifting = params.low_drift >= STAGE_THRESHOLD;
        let drift_lfo = if drifting {
            self.drift_lfo.advance(DRIFT_RATE_HZ, dt);
            self.drift_lfo.sine()
        } else {
            0.0
        };

        let mut mix = 0.0;
        let mut send = 0.0;
        for ((strip, input), fader) in self.strips.iter_mut().zip(inputs).zip(params.faders) {
            let Some(input) = input else {
                continue;
            };

            let dry = input * fader;
            let scrubbed = crossfade(dry, strip.tape.next_sample(dry, scrub_delay), params.scrub);

            let drifted = if drifting {
                let lows = strip.lows.process(scrubbed, DRIFT_CUTOFF_HZ, dt);
                let wobbled = lows * (1.0 + drift_lfo * params.low_drift * 0.3);
                scrubbed * (1.0 - params.low_drift * 0.5) + wobbled * params.low_drift * 0.5
            } else {
                scrubbed
            };

            let signal = saturation_bloom(drifted, params.saturation);
            send += signal * params.diffusion;
            mix += signal;
        }

        let diffused = self.diffusion.process(send, params.diffusion, ctx.sample_rate);
        DubBoiteOutputs {
            mix: clamp_state(mix * params.master),
            send: clamp_state(diffused * params.master),
        }
    }
}

impl Default for DubBoite {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for DubBoite {
    type Params = DubBoiteParams;

    const NAME: &'static str = "DubBoite";

    const OUTPUTS: &'static [&'static str] = &["mix", "send"];

    /// The buffer feeds channel 1 and receives the mix output.
    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params) {
        self.render_outputs(buffer, &mut [], ctx, params);
    }

    fn render_outputs(
        &mut self,
        buffer: &mut [f32],
        secondary: &mut [&mut [f32]],
        ctx: &ProcessCtx,
        params: &Self::Params,
    ) {
        for (n, sample) in buffer.iter_mut().enumerate() {
            let out = self.process(ctx, params, [Some(*sample), None, None, None]);
            *sample = out.mix;
            write_secondary(secondary, n, &[out.send]);
        }
    }

    fn reset(&mut self) {
        for strip in &mut self.strips {
            strip.reset();
        }
        self.scrub_lfo.reset();
        self.drift_lfo.reset();
        self.diffusion.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_params() -> DubBoiteParams {
        DubBoiteParams {
            faders: [0.8, 0.5, 1.0, 0.25],
            diffusion: 0.0,
            scrub: 0.0,
            low_drift: 0.0,
            saturation: 0.0,
            master: 0.9,
        }
    }

    #[test]
    fn test_silence_without_inputs() {
        let ctx = ProcessCtx::new(48_000.0);
        let mut mixer = DubBoite::new();
        for _ in 0..10_000 {
            let out = mixer.process(&ctx, &DubBoiteParams::default(), [None; 4]);
            assert_eq!(out, DubBoiteOutputs { mix: 0.0, send: 0.0 });
        }
    }

    #[test]
    fn test_dry_strip_is_fader_times_master() {
        let ctx = ProcessCtx::new(48_000.0);
        let params = dry_params();
        let mut mixer = DubBoite::new();
        for n in 0..5_000 {
            let x = (n as f32 * 0.05).sin() * 4.0;
            let out = mixer.process(&ctx, &params, [Some(x), None, None, None]);
            assert_eq!(out.mix, x * 0.8 * 0.9);
            assert_eq!(out.send, 0.0);
        }
    }

    #[test]
    fn test_channels_sum() {
        let ctx = ProcessCtx::new(48_000.0);
        let params = dry_params();
        let mut mixer = DubBoite::new();
        let out = mixer.process(&ctx, &params, [Some(1.0), Some(1.0), Some(1.0), Some(1.0)]);
        let expected = (0.8 + 0.5 + 1.0 + 0.25) * 0.9;
        assert!((out.mix - expected).abs() < 1e-6, "mix {}", out.mix);
    }

    #[test]
    fn test_send_arrives_after_first_path_delay() {
        let ctx = ProcessCtx::new(48_000.0);
        let params = DubBoiteParams {
            diffusion: 1.0,
            master: 1.0,
            ..dry_params()
        };
        let mut mixer = DubBoite::new();
        let sends: Vec<f32> = (0..1_000)
            .map(|n| {
                let x = if n == 0 { 1.0 } else { 0.0 };
                mixer.process(&ctx, &params, [Some(x), None, None, None]).send
            })
            .collect();
        // path 0 is 10 ms = 480 samples, gain 0.7 / 8, input 0.8
        assert!(sends[..480].iter().all(|&s| s == 0.0));
        let expected = 0.8 * 0.7 / 8.0;
        assert!((sends[480] - expected).abs() < 1e-6, "first reflection {}", sends[480]);
    }

    #[test]
    fn test_full_scrub_delays_by_about_fifteen_ms() {
        let ctx = ProcessCtx::new(48_000.0);
        let params = DubBoiteParams {
            scrub: 1.0,
            master: 1.0,
            ..dry_params()
        };
        let mut mixer = DubBoite::new();
        let mix: Vec<f32> = (0..2_000)
            .map(|n| {
                let x = if n == 0 { 1.0 } else { 0.0 };
                mixer.process(&ctx, &params, [Some(x), None, None, None]).mix
            })
            .collect();
        let arrival = mix.iter().position(|&y| y != 0.0);
        // 15 ms ± 10 ms × |lfo|, and the LFO peaks near 1.5
        assert!(
            matches!(arrival, Some(n) if (1..=1_440).contains(&n)),
            "impulse arrived at {:?}",
            arrival
        );
    }

    #[test]
    fn test_scrub_delay_clamps() {
        assert_eq!(scrub_delay_samples(0.0, 0.0, 48_000.0), 720);
        assert_eq!(scrub_delay_samples(-1.5, 1.0, 8_000.0), 1);
        assert_eq!(scrub_delay_samples(1.5, 1.0, 1_000_000.0), DIFFUSION_CAPACITY - 1);
    }

    #[test]
    fn test_everything_up_stays_bounded() {
        let ctx = ProcessCtx::new(44_100.0);
        let params = DubBoiteParams {
            faders: [1.0; 4],
            diffusion: 1.0,
            scrub: 1.0,
            low_drift: 1.0,
            saturation: 1.0,
            master: 1.0,
        };
        let mut mixer = DubBoite::new();
        for n in 0..44_100 {
            let x = if n % 100 < 50 { 10.0 } else { -10.0 };
            let out = mixer.process(&ctx, &params, [Some(x); 4]);
            assert!(out.mix.is_finite() && out.mix.abs() <= 10.0);
            assert!(out.send.is_finite() && out.send.abs() <= 10.0);
        }
    }
}
