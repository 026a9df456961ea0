//! Benchmarks for complete modules driven through the host node.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use modulaire_dsp::{ModuleKind, ModuleNode, ProcessCtx};

use crate::{saw_input, BLOCK_SIZES};

/// Push every unit parameter to 0.8 so every stage runs.
fn engage(node: &mut dyn ModuleNode) {
    for (i, info) in node.param_info().iter().enumerate() {
        if info.min == 0.0 && info.max == 1.0 {
            node.set_param(i, 0.8);
        }
    }
}

pub fn bench_modules(c: &mut Criterion) {
    let ctx = ProcessCtx::new(48_000.0);

    for kind in ModuleKind::ALL {
        let mut group = c.benchmark_group(format!("modules/{}", kind.name()));

        for &size in BLOCK_SIZES {
            let input = saw_input(size);

            let mut node = kind.build();
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    node.render_block(black_box(&mut buffer), &ctx);
                })
            });

            let mut node = kind.build();
            engage(node.as_mut());
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new("engaged", size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    node.render_block(black_box(&mut buffer), &ctx);
                })
            });
        }

        group.finish();
    }
}
