// Purpose: The instrument modules and the thin host adapter they plug into.
// Each module owns its state and processes one sample (or one block) at a time.

pub mod chaos_lfo;
pub mod diffusaire;
pub mod dub_boite;
pub mod neo_filtre;
pub mod neo_gen;
pub mod node;
pub mod oscillateur_tritonique;
pub mod siren_concrete;
pub mod sonogenese;
pub mod temporaliste;

pub use chaos_lfo::{ChaosLfo, ChaosLfoOutputs, ChaosLfoParams};
pub use diffusaire::{Diffusaire, DiffusaireParams};
pub use dub_boite::{DubBoite, DubBoiteOutputs, DubBoiteParams};
pub use neo_filtre::{NeoFiltre, NeoFiltreParams};
pub use neo_gen::{NeoGen, NeoGenParams};
pub use node::{Module, ModuleKind, ModuleNode, Node, ParamInfo, ParamSet, ProcessCtx, UnknownModule};
pub use oscillateur_tritonique::{OscillateurTritonique, OscillateurTritoniqueParams};
pub use siren_concrete::{SirenConcrete, SirenConcreteParams};
pub use sonogenese::{Sonogenese, SonogeneseParams};
pub use temporaliste::{Temporaliste, TemporalisteParams};
