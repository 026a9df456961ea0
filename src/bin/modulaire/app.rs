//! Workbench - builds one module node, opens the audio device and runs the TUI

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;

use modulaire_dsp::{
    control::{self, ControlMessage},
    dsp::lfo::Phasor,
    ModuleKind, ProcessCtx, MAX_BLOCK_SIZE,
};

use super::ui::{ParamView, UiApp};

/// Capacity of the UI → audio control ring
const CONTROL_CAPACITY: usize = 256;
/// Capacity of the audio → UI scope ring
const SCOPE_CAPACITY: usize = 16_384;
/// Module outputs are in volts; the device wants ±1
const VOLTS_TO_FULL_SCALE: f32 = 0.1;

/// Main application builder
pub struct Workbench {
    kind: ModuleKind,
    source_hz: f32,
    clock_hz: f32,
}

impl Workbench {
    pub fn new(kind: ModuleKind) -> Self {
        Self {
            kind,
            source_hz: 110.0,
            clock_hz: 2.0,
        }
    }

    /// Frequency of the sawtooth fed to processing modules
    pub fn source_hz(mut self, hz: f32) -> Self {
        self.source_hz = hz;
        self
    }

    /// Rate of the clock fed to clocked modules
    pub fn clock_hz(mut self, hz: f32) -> Self {
        self.clock_hz = hz;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        println!("=== modulaire ===");
        println!("Module: {}", self.kind);
        println!("Sample rate: {} Hz", sample_rate);
        println!("Channels: {}", channels);
        println!();

        let mut node = self.kind.build();
        let params: Vec<ParamView> = node
            .param_info()
            .iter()
            .enumerate()
            .map(|(i, info)| ParamView {
                info: *info,
                value: node.param(i).unwrap_or(info.default),
            })
            .collect();

        let (control_tx, mut control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_CAPACITY);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);

        let ctx = ProcessCtx::new(sample_rate);
        let mut input = InputSource::new(self.kind, self.source_hz, self.clock_hz);
        let mut block_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                control::drain(&mut control_rx, node.as_mut());

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut block_buf[..frames_to_render];

                    input.fill(block, &ctx);
                    node.render_block(block, &ctx);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &volts) in block.iter().enumerate() {
                        let s = volts * VOLTS_TO_FULL_SCALE;
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        // Scope drops samples when the UI falls behind
                        let _ = scope_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(self.kind, sample_rate, params, scope_rx, control_tx).run(&mut terminal);
        ratatui::restore();
        result
    }
}

/// What the module hears on its primary input.
enum InputSource {
    Silence,
    /// ±5 V sawtooth
    Saw(Phasor, f32),
    /// 10 V / 0 V square clock
    Clock(Phasor, f32),
}

impl InputSource {
    fn new(kind: ModuleKind, source_hz: f32, clock_hz: f32) -> Self {
        if kind.is_processor() {
            Self::Saw(Phasor::new(), source_hz)
        } else if kind.is_clocked() {
            Self::Clock(Phasor::new(), clock_hz)
        } else {
            Self::Silence
        }
    }

    fn fill(&mut self, block: &mut [f32], ctx: &ProcessCtx) {
        match self {
            Self::Silence => block.fill(0.0),
            Self::Saw(phase, hz) => {
                for sample in block.iter_mut() {
                    *sample = (phase.advance(*hz, ctx.sample_time) * 2.0 - 1.0) * 5.0;
                }
            }
            Self::Clock(phase, hz) => {
                for sample in block.iter_mut() {
                    let p = phase.advance(*hz, ctx.sample_time);
                    *sample = if p < 0.5 { 10.0 } else { 0.0 };
                }
            }
        }
    }
}
