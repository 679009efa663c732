//! Shader units
//!
//! A unit is one `(stage, entry point)` pair. Every technique stage that names
//! an entry point contributes a unit; identical pairs are compiled once.

use std::collections::BTreeSet;

use esf_core::{CategoryMap, ShaderStage};
use esf_syntax::TechniqueDesc;

use crate::backend::ReflectedBinding;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderUnit {
    pub stage: ShaderStage,
    pub entry_point: String,
}

impl ShaderUnit {
    #[must_use]
    pub fn new(stage: ShaderStage, entry_point: &str) -> Self {
        Self {
            stage,
            entry_point: entry_point.to_owned(),
        }
    }
}

/// A unit after a successful backend run. Owns its bytecode until the
/// package is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    pub unit: ShaderUnit,
    pub bytecode: Vec<u8>,
    pub bindings: CategoryMap<Vec<ReflectedBinding>>,
}

/// Distinct units referenced by `techniques`, in canonical compile order:
/// stage order first, then entry-point name.
#[must_use]
pub fn shader_units(techniques: &[TechniqueDesc]) -> Vec<ShaderUnit> {
    techniques
        .iter()
        .flat_map(TechniqueDesc::stages)
        .map(|(stage, entry_point)| ShaderUnit::new(stage, entry_point))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
