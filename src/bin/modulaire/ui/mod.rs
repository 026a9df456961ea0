//! TUI module for modulaire
//!
//! Oscilloscope, spectrum and a parameter list for the running module.

mod params;
mod spectrum;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use modulaire_dsp::{control::ControlMessage, ModuleKind, ParamInfo};

pub use params::ParamView;

use params::render_params;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;
/// Arrow keys move a parameter by this fraction of its range
const PARAM_STEPS: f32 = 50.0;

pub struct UiApp {
    kind: ModuleKind,
    sample_rate: f32,
    params: Vec<ParamView>,
    selected: usize,
    /// Ring buffer receiver for audio samples
    scope_rx: Consumer<f32>,
    /// Ring buffer sender for parameter changes
    control_tx: Producer<ControlMessage>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        kind: ModuleKind,
        sample_rate: f32,
        params: Vec<ParamView>,
        scope_rx: Consumer<f32>,
        control_tx: Producer<ControlMessage>,
    ) -> Self {
        Self {
            kind,
            sample_rate,
            params,
            selected: 0,
            scope_rx,
            control_tx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Read as many samples as available, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.send(ControlMessage::Reset);
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < self.params.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.nudge(-1.0),
            KeyCode::Right => self.nudge(1.0),
            _ => {}
        }
    }

    fn nudge(&mut self, direction: f32) {
        let Some(view) = self.params.get_mut(self.selected) else {
            return;
        };
        let info: ParamInfo = view.info;
        view.value = info.clamp(view.value + direction * (info.max - info.min) / PARAM_STEPS);
        let message = ControlMessage::SetParam {
            index: self.selected,
            value: view.value,
        };
        self.send(message);
    }

    /// Drops the message if the audio thread is not keeping up
    fn send(&mut self, message: ControlMessage) {
        let _ = self.control_tx.push(message);
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),                                // Scope + spectrum
                Constraint::Length(self.params.len() as u16 + 2), // Parameters
                Constraint::Length(1),                             // Help bar
            ])
            .split(area);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.spectrum.data());
        render_params(
            frame,
            chunks[1],
            self.kind,
            self.sample_rate,
            &self.params,
            self.selected,
        );

        let help = Paragraph::new(" [Q] Quit  [↑↓] Select  [←→] Adjust  [R] Reset")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
