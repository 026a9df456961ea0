//! Benchmarks for wavetable regeneration and lookup.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use modulaire_dsp::dsp::lfo::Phasor;
use modulaire_dsp::dsp::wavetable::{MorphingTable, TableShape};

use crate::BLOCK_SIZES;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");

    // One full rebuild, the cost paid when topology moves past the threshold
    let mut table = MorphingTable::new(TableShape::SpectralFold);
    let mut control = 0.0f32;
    group.bench_function("regenerate", |b| {
        b.iter(|| {
            control = if control > 0.9 { 0.0 } else { control + 0.05 };
            table.regenerate(black_box(control));
        })
    });

    for &size in BLOCK_SIZES {
        let table = MorphingTable::new(TableShape::TritoneMorph);
        let mut phase = Phasor::new();
        let mut output = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("read_linear", size), &size, |b, _| {
            b.iter(|| {
                for sample in output.iter_mut() {
                    let p = phase.advance(black_box(440.0), 1.0 / 48_000.0);
                    *sample = table.table().read_linear(p);
                }
            })
        });
    }

    group.finish();
}
