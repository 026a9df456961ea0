//! Benchmarks for the grain cloud.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use modulaire_dsp::dsp::granular::GrainCloud;
use modulaire_dsp::dsp::rng::DEFAULT_SEED;
use modulaire_dsp::dsp::wavetable::{siren_saw, Wavetable};

use crate::{saw_input, BLOCK_SIZES};

pub fn bench_granular(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/granular");
    let table = Wavetable::from_fn(siren_saw);

    for &size in BLOCK_SIZES {
        let input = saw_input(size);
        let mut cloud = GrainCloud::<8>::new(DEFAULT_SEED);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("cloud_8", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = cloud.process(black_box(*sample), 0.8, 220.0, 48_000.0, &table);
                }
            })
        });
    }

    group.finish();
}
