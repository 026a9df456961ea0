//! Benchmarks for delay lines and the diffusion network.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use modulaire_dsp::dsp::delay::DelayLine;
use modulaire_dsp::dsp::diffusion::{DiffusionNetwork, DIFFUSION_CAPACITY};

use crate::{saw_input, BLOCK_SIZES};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input = saw_input(size);

        let mut line = DelayLine::new(DIFFUSION_CAPACITY);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("interpolated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    line.write(*sample);
                    *sample = line.read_interpolated(black_box(480.0 + i as f32 * 0.25));
                }
            })
        });

        let mut network = DiffusionNetwork::<8>::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("diffusion_8", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = network.process(black_box(*sample), 0.6, sample_rate);
                }
            })
        });
    }

    group.finish();
}
