//! Benchmarks for the state-variable filter and pole cascade.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use modulaire_dsp::dsp::filter::{frequency_coefficient, normalized_frequency, PoleCascade, StateVariableFilter};

use crate::{saw_input, BLOCK_SIZES};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let sample_rate = 48_000.0;
    let f = frequency_coefficient(normalized_frequency(1_000.0, sample_rate, 0.45), 1.99);

    for &size in BLOCK_SIZES {
        let input = saw_input(size);

        let mut svf = StateVariableFilter::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("svf", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = svf.tick(black_box(*sample), f, 0.5).lowpass;
                }
            })
        });

        let mut cascade = PoleCascade::<4>::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("pole_cascade_4", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = cascade.process(black_box(*sample), 0.5, sample_rate);
                }
            })
        });
    }

    group.finish();
}
