//! Benchmarks for the additive harmonic banks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use modulaire_dsp::dsp::additive::{SpreadBloom, TritoneBloom};

use crate::BLOCK_SIZES;

pub fn bench_additive(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/additive");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let mut output = vec![0.0f32; size];

        let mut spread = SpreadBloom::<16>::new();
        group.bench_with_input(BenchmarkId::new("spread_bloom_16", size), &size, |b, _| {
            b.iter(|| {
                for sample in output.iter_mut() {
                    *sample = spread.process(black_box(220.0), 0.7, sample_rate);
                }
            })
        });

        let mut tritone = TritoneBloom::<12>::new();
        group.bench_with_input(BenchmarkId::new("tritone_bloom_12", size), &size, |b, _| {
            b.iter(|| {
                for sample in output.iter_mut() {
                    *sample = tritone.process(black_box(220.0), 0.7, sample_rate);
                }
            })
        });
    }

    group.finish();
}
