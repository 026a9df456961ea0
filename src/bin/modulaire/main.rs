//! modulaire - terminal workbench for the modules
//!
//! Run with: cargo run -- <module>   (e.g. `cargo run -- neofiltre`)

mod app;
mod ui;

use app::Workbench;
use color_eyre::eyre::WrapErr;
use modulaire_dsp::ModuleKind;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let kind = match std::env::args().nth(1) {
        Some(name) => name
            .parse::<ModuleKind>()
            .wrap_err_with(|| format!("expected one of: {}", catalogue()))?,
        None => ModuleKind::SirenConcrete,
    };

    Workbench::new(kind).source_hz(110.0).clock_hz(4.0).run()
}

fn catalogue() -> String {
    ModuleKind::ALL
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}
