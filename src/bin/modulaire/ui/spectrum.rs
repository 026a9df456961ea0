//! Spectrum analyzer widget
//!
//! Hann-windowed FFT of the scope buffer, sampled at log-spaced frequencies.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use modulaire_dsp::dsp::granular::hann;

/// Number of frequency points to display
const SPECTRUM_POINTS: usize = 64;
const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// (log10 frequency, FFT bin) per display point
    points: Vec<(f64, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude in dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| hann(i as f32 / buffer_len as f32))
            .collect();

        let max_freq = (sample_rate as f64 / 2.0).min(20_000.0).max(MIN_FREQ + 1.0);
        let last_bin = (buffer_len / 2).saturating_sub(1);
        let points: Vec<(f64, usize)> = (0..SPECTRUM_POINTS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
                let freq = MIN_FREQ * (max_freq / MIN_FREQ).powf(t);
                let bin = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
                (freq.log10(), bin.min(last_bin))
            })
            .collect();

        let spectrum = points.iter().map(|&(x, _)| (x, FLOOR_DB)).collect();

        Self {
            window,
            points,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    /// Recompute from a buffer of exactly the analyzer's length.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (out, &(x, bin)) in self.spectrum.iter_mut().zip(&self.points) {
            let power = self.scratch[bin].norm_sqr().max(1e-12) as f64;
            *out = (x, (10.0 * power.log10()).max(FLOOR_DB));
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let x_min = spectrum.first().map_or(1.0, |p| p.0);
    let x_max = spectrum.last().map_or(4.0, |p| p.0).max(x_min + 0.1);
    let max_db = spectrum.iter().map(|p| p.1).fold(FLOOR_DB, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
