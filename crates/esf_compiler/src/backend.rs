//! Native compiler capability
//!
//! The compiler core never talks to a concrete shader compiler. It hands
//! generated source to a [`NativeCompiler`] and gets back bytecode plus the
//! bindings the compiled entry point actually uses.

use esf_core::{CategoryMap, ShaderStage};

/// A binding reported by reflection: resource name and the slot the backend
/// compiled it against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReflectedBinding {
    pub name: String,
    pub slot: u32,
}

impl ReflectedBinding {
    #[must_use]
    pub fn new(name: &str, slot: u32) -> Self {
        Self {
            name: name.to_owned(),
            slot,
        }
    }
}

/// Successful backend output for one entry point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeOutput {
    pub bytecode: Vec<u8>,
    pub bindings: CategoryMap<Vec<ReflectedBinding>>,
}

/// Turns generated source into bytecode for a single entry point.
///
/// Implementations must be deterministic: the same source, entry point and
/// stage must always produce the same bytecode and reflection. On failure the
/// backend's diagnostic text is returned unmodified; it is surfaced to the
/// user verbatim and never retried.
pub trait NativeCompiler {
    fn compile(
        &self,
        unit_name: &str,
        source: &str,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<NativeOutput, String>;
}

impl<T: NativeCompiler + ?Sized> NativeCompiler for &T {
    fn compile(
        &self,
        unit_name: &str,
        source: &str,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<NativeOutput, String> {
        (**self).compile(unit_name, source, entry_point, stage)
    }
}

impl<T: NativeCompiler + ?Sized> NativeCompiler for Box<T> {
    fn compile(
        &self,
        unit_name: &str,
        source: &str,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<NativeOutput, String> {
        (**self).compile(unit_name, source, entry_point, stage)
    }
}
