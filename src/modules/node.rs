//! Host adapter shared by every module.
//!
//! Modules are plain per-sample state machines. This file is the thin layer
//! that lets a host (the workbench binary, the benches) drive any of them
//! through one object-safe interface:
//!
//! - [`ProcessCtx`]: sample rate and its reciprocal
//! - [`ParamInfo`] / [`ParamSet`]: indexed, range-checked parameter access
//! - [`Module`]: a typed module with its own `Params` and named outputs
//! - [`Node`] / [`ModuleNode`]: a module paired with its current params,
//!   usable behind `Box<dyn ModuleNode>`
//! - [`ModuleKind`]: the catalogue, parseable from text

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    ChaosLfo, Diffusaire, DubBoite, NeoFiltre, NeoGen, OscillateurTritonique, SirenConcrete,
    Sonogenese, Temporaliste,
};

/// Timing for one processing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessCtx {
    pub sample_rate: f32,
    pub sample_time: f32,
}

impl ProcessCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            sample_time: 1.0 / sample_rate,
        }
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamInfo {
    pub const fn new(name: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    /// Unit range with a default.
    pub const fn unit(name: &'static str, default: f32) -> Self {
        Self::new(name, 0.0, 1.0, default)
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Indexed access to a `Params` struct.
///
/// `set` clamps to the declared range; out-of-range indices are ignored.
pub trait ParamSet: Clone + Default + Send + 'static {
    const INFO: &'static [ParamInfo];

    fn get(&self, index: usize) -> Option<f32>;

    /// Store an already-clamped value. Returns `false` for unknown indices.
    fn store(&mut self, index: usize, value: f32) -> bool;

    fn set(&mut self, index: usize, value: f32) -> bool {
        match Self::INFO.get(index) {
            Some(info) if value.is_finite() => self.store(index, info.clamp(value)),
            _ => false,
        }
    }

    fn len() -> usize {
        Self::INFO.len()
    }
}

/// A typed module.
pub trait Module: Send + 'static {
    type Params: ParamSet;

    const NAME: &'static str;

    /// Output names. The first is the primary output.
    const OUTPUTS: &'static [&'static str] = &["out"];

    /// Process a block in place: `buffer` holds the primary input on entry
    /// and the primary output on return. Generators ignore the input.
    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx, params: &Self::Params);

    /// Like [`render_block`](Module::render_block), also writing output
    /// `i + 1` into `secondary[i]`. Extra buffers, and samples past
    /// `buffer.len()`, are left untouched.
    fn render_outputs(
        &mut self,
        buffer: &mut [f32],
        _secondary: &mut [&mut [f32]],
        ctx: &ProcessCtx,
        params: &Self::Params,
    ) {
        self.render_block(buffer, ctx, params);
    }

    /// Re-zero every piece of persistent state.
    fn reset(&mut self);
}

/// Object-safe view of a module with its current parameters.
pub trait ModuleNode: Send {
    fn name(&self) -> &'static str;

    fn param_info(&self) -> &'static [ParamInfo];

    fn param(&self, index: usize) -> Option<f32>;

    fn set_param(&mut self, index: usize, value: f32) -> bool;

    fn outputs(&self) -> &'static [&'static str];

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx);

    fn render_outputs(&mut self, buffer: &mut [f32], secondary: &mut [&mut [f32]], ctx: &ProcessCtx);

    fn reset(&mut self);
}

/// Write one sample of secondary outputs at frame `n`.
#[inline]
pub(crate) fn write_secondary(secondary: &mut [&mut [f32]], n: usize, values: &[f32]) {
    for (output, &value) in secondary.iter_mut().zip(values) {
        if let Some(slot) = output.get_mut(n) {
            *slot = value;
        }
    }
}

/// Allow boxed nodes to be used as nodes
impl ModuleNode for Box<dyn ModuleNode> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn param_info(&self) -> &'static [ParamInfo] {
        (**self).param_info()
    }

    fn param(&self, index: usize) -> Option<f32> {
        (**self).param(index)
    }

    fn set_param(&mut self, index: usize, value: f32) -> bool {
        (**self).set_param(index, value)
    }

    fn outputs(&self) -> &'static [&'static str] {
        (**self).outputs()
    }

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx) {
        (**self).render_block(buffer, ctx)
    }

    fn render_outputs(&mut self, buffer: &mut [f32], secondary: &mut [&mut [f32]], ctx: &ProcessCtx) {
        (**self).render_outputs(buffer, secondary, ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// A module and the parameter values it is currently playing with.
pub struct Node<M: Module> {
    pub module: M,
    pub params: M::Params,
}

impl<M: Module> Node<M> {
    pub fn new(module: M) -> Self {
        Self {
            module,
            params: M::Params::default(),
        }
    }

    pub fn with_params(module: M, params: M::Params) -> Self {
        Self { module, params }
    }
}

impl<M: Module + Default> Default for Node<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M: Module> ModuleNode for Node<M> {
    fn name(&self) -> &'static str {
        M::NAME
    }

    fn param_info(&self) -> &'static [ParamInfo] {
        M::Params::INFO
    }

    fn param(&self, index: usize) -> Option<f32> {
        self.params.get(index)
    }

    fn set_param(&mut self, index: usize, value: f32) -> bool {
        self.params.set(index, value)
    }

    fn outputs(&self) -> &'static [&'static str] {
        M::OUTPUTS
    }

    fn render_block(&mut self, buffer: &mut [f32], ctx: &ProcessCtx) {
        self.module.render_block(buffer, ctx, &self.params);
    }

    fn render_outputs(&mut self, buffer: &mut [f32], secondary: &mut [&mut [f32]], ctx: &ProcessCtx) {
        self.module.render_outputs(buffer, secondary, ctx, &self.params);
    }

    fn reset(&mut self) {
        self.module.reset();
    }
}

/// Every module in the catalogue.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    ChaosLfo,
    NeoFiltre,
    NeoGen,
    Diffusaire,
    Sonogenese,
    DubBoite,
    SirenConcrete,
    Temporaliste,
    OscillateurTritonique,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 9] = [
        Self::ChaosLfo,
        Self::NeoFiltre,
        Self::NeoGen,
        Self::Diffusaire,
        Self::Sonogenese,
        Self::DubBoite,
        Self::SirenConcrete,
        Self::Temporaliste,
        Self::OscillateurTritonique,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ChaosLfo => ChaosLfo::NAME,
            Self::NeoFiltre => NeoFiltre::NAME,
            Self::NeoGen => NeoGen::NAME,
            Self::Diffusaire => Diffusaire::NAME,
            Self::Sonogenese => Sonogenese::NAME,
            Self::DubBoite => DubBoite::NAME,
            Self::SirenConcrete => SirenConcrete::NAME,
            Self::Temporaliste => Temporaliste::NAME,
            Self::OscillateurTritonique => OscillateurTritonique::NAME,
        }
    }

    /// Whether the module consumes an audio input (as opposed to generating).
    pub fn is_processor(self) -> bool {
        matches!(self, Self::NeoFiltre | Self::Diffusaire | Self::DubBoite)
    }

    /// Whether the module's primary input is a clock.
    pub fn is_clocked(self) -> bool {
        matches!(self, Self::Temporaliste)
    }

    pub fn build(self) -> Box<dyn ModuleNode> {
        match self {
            Self::ChaosLfo => Box::new(Node::new(ChaosLfo::new())),
            Self::NeoFiltre => Box::new(Node::new(NeoFiltre::new())),
            Self::NeoGen => Box::new(Node::new(NeoGen::new())),
            Self::Diffusaire => Box::new(Node::new(Diffusaire::new())),
            Self::Sonogenese => Box::new(Node::new(Sonogenese::new())),
            Self::DubBoite => Box::new(Node::new(DubBoite::new())),
            Self::SirenConcrete => Box::new(Node::new(SirenConcrete::new())),
            Self::Temporaliste => Box::new(Node::new(Temporaliste::new())),
            Self::OscillateurTritonique => Box::new(Node::new(OscillateurTritonique::new())),
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A name that matches no module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModule(pub String);

impl fmt::Display for UnknownModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown module `{}`", self.0)
    }
}

impl std::error::Error for UnknownModule {}

impl FromStr for ModuleKind {
    type Err = UnknownModule;

    /// Case-insensitive; `-` and `_` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().to_lowercase() == wanted)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("neofiltre".parse::<ModuleKind>(), Ok(ModuleKind::NeoFiltre));
        assert_eq!("DubBoite".parse::<ModuleKind>(), Ok(ModuleKind::DubBoite));
        assert_eq!("chaos-lfo".parse::<ModuleKind>(), Ok(ModuleKind::ChaosLfo));
        assert_eq!("OSCILLATEUR_TRITONIQUE".parse::<ModuleKind>(), Ok(ModuleKind::OscillateurTritonique));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "moog".parse::<ModuleKind>().unwrap_err();
        assert_eq!(err, UnknownModule("moog".into()));
        assert_eq!(err.to_string(), "unknown module `moog`");
    }

    #[test]
    fn test_names_round_trip() {
        for kind in ModuleKind::ALL {
            assert_eq!(kind.name().parse::<ModuleKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn test_every_node_has_sane_params() {
        for kind in ModuleKind::ALL {
            let mut node = kind.build();
            assert!(!node.param_info().is_empty(), "{} has no params", kind);
            for (i, info) in node.param_info().iter().enumerate() {
                assert!(info.min < info.max, "{}.{}", kind, info.name);
                assert!((info.min..=info.max).contains(&info.default), "{}.{}", kind, info.name);
                assert_eq!(node.param(i), Some(info.default), "{}.{} default", kind, info.name);

                assert!(node.set_param(i, info.max + 100.0));
                assert_eq!(node.param(i), Some(info.max));
                assert!(node.set_param(i, info.min - 100.0));
                assert_eq!(node.param(i), Some(info.min));
            }
            let count = node.param_info().len();
            assert!(!node.set_param(count, 0.5));
            assert_eq!(node.param(count), None);
            assert!(!node.set_param(0, f32::NAN));
        }
    }

    #[test]
    fn test_every_node_renders_finite_blocks() {
        let ctx = ProcessCtx::new(48_000.0);
        for kind in ModuleKind::ALL {
            let mut node = kind.build();
            let mut buffer = [0.0f32; 256];
            for block in 0..40 {
                for (n, sample) in buffer.iter_mut().enumerate() {
                    *sample = ((block * 256 + n) as f32 * 0.05).sin() * 5.0;
                }
                node.render_block(&mut buffer, &ctx);
                for &y in &buffer {
                    assert!(y.is_finite() && y.abs() <= 10.0, "{} produced {}", kind, y);
                }
            }
        }
    }

    #[test]
    fn test_output_names() {
        for kind in ModuleKind::ALL {
            let expected = match kind {
                ModuleKind::ChaosLfo | ModuleKind::DubBoite => 2,
                ModuleKind::Temporaliste => 4,
                _ => 1,
            };
            assert_eq!(kind.build().outputs().len(), expected, "{}", kind);
        }
    }

    #[test]
    fn test_secondary_outputs_match_typed_process() {
        use crate::modules::temporaliste::LAYERS;
        use crate::modules::{DubBoiteParams, TemporalisteParams};

        let ctx = ProcessCtx::new(48_000.0);

        let clock: Vec<f32> = (0..4_096).map(|n| if n % 400 < 40 { 5.0 } else { 0.0 }).collect();
        let params = TemporalisteParams {
            density: 1.0,
            drift: 0.0,
            accent: 0.5,
            timeshift: 0.0,
        };
        let mut node = Node::with_params(Temporaliste::new(), params);
        let mut gates = clock.clone();
        let mut rest = [vec![0.0f32; 4_096], vec![0.0f32; 4_096], vec![0.0f32; 4_096]];
        {
            let [a, b, c] = &mut rest;
            node.render_outputs(&mut gates, &mut [a.as_mut_slice(), b.as_mut_slice(), c.as_mut_slice()], &ctx);
        }
        let mut engine = Temporaliste::new();
        let mut fired = [false; LAYERS];
        for (n, &c) in clock.iter().enumerate() {
            let expected = engine.process(&ctx, &params, c);
            assert_eq!(gates[n], expected[0]);
            for layer in 1..LAYERS {
                assert_eq!(rest[layer - 1][n], expected[layer], "gate {} at {}", layer + 1, n);
                fired[layer] |= expected[layer] > 0.0;
            }
        }
        assert!(fired[1], "gate 2 never fired");

        let input: Vec<f32> = (0..4_096).map(|n| (n as f32 * 0.03).sin() * 5.0).collect();
        let mut node = Node::with_params(
            DubBoite::new(),
            DubBoiteParams {
                diffusion: 0.8,
                ..DubBoiteParams::default()
            },
        );
        let mut mix = input.clone();
        let mut send = vec![0.0f32; 4_096];
        node.render_outputs(&mut mix, &mut [send.as_mut_slice()], &ctx);
        let mut mixer = DubBoite::new();
        for (n, &x) in input.iter().enumerate() {
            let expected = mixer.process(&ctx, &node.params, [Some(x), None, None, None]);
            assert_eq!(mix[n], expected.mix);
            assert_eq!(send[n], expected.send);
        }
        assert!(send.iter().any(|&y| y != 0.0));
    }

    #[test]
    fn test_render_outputs_ignores_extra_buffers() {
        let ctx = ProcessCtx::new(48_000.0);
        let mut plain = ModuleKind::NeoGen.build();
        let mut with_extra = ModuleKind::NeoGen.build();
        let mut a = [0.0f32; 256];
        let mut b = [0.0f32; 256];
        let mut extra = [7.0f32; 256];
        plain.render_block(&mut a, &ctx);
        with_extra.render_outputs(&mut b, &mut [&mut extra[..]], &ctx);
        assert_eq!(a, b);
        assert_eq!(extra, [7.0; 256]);
    }

    #[test]
    fn test_reset_replays_output() {
        let ctx = ProcessCtx::new(44_100.0);
        for kind in ModuleKind::ALL {
            let mut node = kind.build();
            let render = |node: &mut Box<dyn ModuleNode>| {
                let mut out = Vec::new();
                for block in 0..8 {
                    let mut buffer: Vec<f32> = (0..128)
                        .map(|n| if (block * 128 + n) % 200 < 20 { 5.0 } else { 0.0 })
                        .collect();
                    node.render_block(&mut buffer, &ctx);
                    out.extend(buffer);
                }
                out
            };
            let first = render(&mut node);
            node.reset();
            let second = render(&mut node);
            assert_eq!(first, second, "{} did not replay after reset", kind);
        }
    }
}
