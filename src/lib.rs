pub mod control; // UI → audio thread parameter messages
pub mod dsp;
pub mod modules; // The instrument modules and host adapter

pub use modules::{Module, ModuleKind, ModuleNode, Node, ParamInfo, ParamSet, ProcessCtx};

/// Largest block a host is expected to render in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;
