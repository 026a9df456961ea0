//! Benchmarks for low-level DSP primitives.

mod additive;
mod delay;
mod filter;
mod granular;
mod wavetable;

pub use additive::bench_additive;
pub use delay::bench_delay;
pub use filter::bench_filter;
pub use granular::bench_granular;
pub use wavetable::bench_wavetable;
