//! Benchmarks for DSP primitives and complete modules.
//!
//! Run with: cargo bench
//!
//! Every module processes one sample at a time, so a block costs
//! `block_size` calls. Reference deadlines at 48kHz:
//!   - 64 samples  = 1.33ms
//!   - 128 samples = 2.67ms
//!   - 256 samples = 5.33ms
//!   - 512 samples = 10.67ms
//!
//! Benchmark groups:
//!   - dsp/*      Primitives (filters, delays, additive banks, grains, tables)
//!   - modules/*  Every module through its host node, at default settings
//!                and with every stage engaged

use criterion::{criterion_group, criterion_main};

mod dsp;
mod modules;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

/// ±5 V sawtooth test input.
pub fn saw_input(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| ((i as f32 / size as f32) * 2.0 - 1.0) * 5.0)
        .collect()
}

criterion_group!(
    benches,
    dsp::bench_filter,
    dsp::bench_delay,
    dsp::bench_additive,
    dsp::bench_granular,
    dsp::bench_wavetable,
    modules::bench_modules,
);
criterion_main!(benches);
