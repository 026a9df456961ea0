//! Parameter list widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use modulaire_dsp::{ModuleKind, ParamInfo};

/// Width of the value bar in cells
const BAR_WIDTH: usize = 24;

/// UI-side mirror of one parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamView {
    pub info: ParamInfo,
    pub value: f32,
}

impl ParamView {
    fn fraction(&self) -> f32 {
        let span = self.info.max - self.info.min;
        if span <= 0.0 {
            0.0
        } else {
            ((self.value - self.info.min) / span).clamp(0.0, 1.0)
        }
    }
}

fn bar(fraction: f32) -> String {
    let filled = (fraction * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)))
}

pub fn render_params(
    frame: &mut Frame,
    area: Rect,
    kind: ModuleKind,
    sample_rate: f32,
    params: &[ParamView],
    selected: usize,
) {
    let title = format!(" {}  {:.1}kHz ", kind, sample_rate / 1000.0);
    let block = Block::default().title(title).borders(Borders::ALL);

    let lines: Vec<Line> = params
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!(" {:<16}", view.info.name), style),
                Span::styled(bar(view.fraction()), Style::default().fg(Color::Magenta)),
                Span::styled(format!("  {:>7.3}", view.value), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
