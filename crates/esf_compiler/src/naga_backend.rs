//! Naga Backend
//!
//! [`NativeCompiler`] implementation that validates generated WGSL with naga
//! and emits SPIR-V for one entry point. Reflection walks the module's global
//! variables and keeps only those the entry point actually touches.
//!
//! Naga has no geometry, hull or domain stages; units for those stages fail
//! with a diagnostic like any other compile error.

use esf_core::{BindingCategory, CategoryMap, ShaderStage};
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, ImageClass, StorageAccess, TypeInner};

use crate::backend::{NativeCompiler, NativeOutput, ReflectedBinding};

#[derive(Debug, Clone)]
pub struct NagaCompiler {
    spv_options: naga::back::spv::Options<'static>,
}

impl Default for NagaCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl NagaCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            spv_options: naga::back::spv::Options::default(),
        }
    }

    fn naga_stage(unit_name: &str, stage: ShaderStage) -> Result<naga::ShaderStage, String> {
        match stage {
            ShaderStage::Vertex => Ok(naga::ShaderStage::Vertex),
            ShaderStage::Pixel => Ok(naga::ShaderStage::Fragment),
            ShaderStage::Compute => Ok(naga::ShaderStage::Compute),
            ShaderStage::Geometry | ShaderStage::Hull | ShaderStage::Domain => Err(format!(
                "{unit_name}: error: {stage} stage is not supported by the SPIR-V backend"
            )),
        }
    }
}

/// Binding category of a resource global, `None` for anything that is not a
/// bindable resource.
fn classify(module: &naga::Module, var: &naga::GlobalVariable) -> Option<BindingCategory> {
    match var.space {
        AddressSpace::Uniform => Some(BindingCategory::ConstantBuffer),
        AddressSpace::Storage { access } if access.contains(StorageAccess::STORE) => {
            Some(BindingCategory::UnorderedAccessView)
        }
        AddressSpace::Storage { .. } => Some(BindingCategory::ShaderResourceView),
        AddressSpace::Handle => {
            let mut inner = &module.types[var.ty].inner;
            if let TypeInner::BindingArray { base, .. } = inner {
                inner = &module.types[*base].inner;
            }
            match inner {
                TypeInner::Sampler { .. } => Some(BindingCategory::Sampler),
                TypeInner::Image {
                    class: ImageClass::Storage { .. },
                    ..
                } => Some(BindingCategory::UnorderedAccessView),
                TypeInner::Image { .. } => Some(BindingCategory::ShaderResourceView),
                _ => None,
            }
        }
        _ => None,
    }
}

impl NativeCompiler for NagaCompiler {
    fn compile(
        &self,
        unit_name: &str,
        source: &str,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<NativeOutput, String> {
        let naga_stage = Self::naga_stage(unit_name, stage)?;

        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| format!("{unit_name}: {}", e.emit_to_string(source)))?;

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        let info = validator
            .validate(&module)
            .map_err(|e| format!("{unit_name}: {}", e.emit_to_string(source)))?;

        let ep_index = module
            .entry_points
            .iter()
            .position(|ep| ep.name == entry_point && ep.stage == naga_stage)
            .ok_or_else(|| {
                format!("{unit_name}: error: entry point '{entry_point}' not found for {stage} stage")
            })?;
        let ep_info = info.get_entry_point(ep_index);

        let mut bindings: CategoryMap<Vec<ReflectedBinding>> = CategoryMap::default();
        for (handle, var) in module.global_variables.iter() {
            if ep_info[handle].is_empty() {
                continue;
            }
            let (Some(binding), Some(name)) = (&var.binding, &var.name) else {
                continue;
            };
            if let Some(category) = classify(&module, var) {
                bindings[category].push(ReflectedBinding::new(name, binding.binding));
            }
        }

        let pipeline_options = naga::back::spv::PipelineOptions {
            shader_stage: naga_stage,
            entry_point: entry_point.to_owned(),
        };
        let words =
            naga::back::spv::write_vec(&module, &info, &self.spv_options, Some(&pipeline_options))
                .map_err(|e| format!("{unit_name}: error: SPIR-V generation failed: {e}"))?;

        log::trace!(
            "naga: {stage} '{entry_point}' -> {} SPIR-V words",
            words.len()
        );

        Ok(NativeOutput {
            bytecode: bytemuck::cast_slice(&words).to_vec(),
            bindings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r"
struct Globals { tint: vec4<f32> }
@group(0) @binding(0) var<uniform> globals: Globals;
@group(0) @binding(1) var<uniform> unused_globals: Globals;
@group(1) @binding(0) var linear: sampler;
@group(2) @binding(0) var albedo: texture_2d<f32>;
@group(3) @binding(0) var<storage, read_write> counters: array<u32>;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    return globals.tint * f32(index);
}

@fragment
fn ps_main() -> @location(0) vec4<f32> {
    return textureSample(albedo, linear, vec2<f32>(0.5, 0.5)) * globals.tint;
}

@compute @workgroup_size(1)
fn cs_main() {
    counters[0] = 1u;
}
";

    fn names(output: &NativeOutput, category: BindingCategory) -> Vec<&str> {
        output.bindings[category].iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn reflects_only_used_globals() {
        let compiler = NagaCompiler::new();

        let vs = compiler.compile("test.esf", SOURCE, "vs_main", ShaderStage::Vertex).unwrap();
        assert_eq!(names(&vs, BindingCategory::ConstantBuffer), ["globals"]);
        assert!(vs.bindings[BindingCategory::ShaderResourceView].is_empty());

        let ps = compiler.compile("test.esf", SOURCE, "ps_main", ShaderStage::Pixel).unwrap();
        assert_eq!(names(&ps, BindingCategory::Sampler), ["linear"]);
        assert_eq!(names(&ps, BindingCategory::ShaderResourceView), ["albedo"]);

        let cs = compiler.compile("test.esf", SOURCE, "cs_main", ShaderStage::Compute).unwrap();
        assert_eq!(names(&cs, BindingCategory::UnorderedAccessView), ["counters"]);
    }

    #[test]
    fn emits_spirv_bytes() {
        let vs = NagaCompiler::new()
            .compile("test.esf", SOURCE, "vs_main", ShaderStage::Vertex)
            .unwrap();
        assert_eq!(vs.bytecode.len() % 4, 0);
        assert_eq!(&vs.bytecode[..4], 0x0723_0203u32.to_le_bytes());
    }

    #[test]
    fn missing_entry_point_is_a_diagnostic() {
        let err = NagaCompiler::new()
            .compile("test.esf", SOURCE, "ps_main", ShaderStage::Vertex)
            .unwrap_err();
        assert!(err.contains("ps_main"));
    }

    #[test]
    fn unsupported_stage_is_a_diagnostic() {
        let err = NagaCompiler::new()
            .compile("test.esf", SOURCE, "gs_main", ShaderStage::Geometry)
            .unwrap_err();
        assert!(err.contains("geometry"));
    }

    #[test]
    fn parse_errors_carry_the_unit_name() {
        let err = NagaCompiler::new()
            .compile("broken.esf", "fn (", "vs_main", ShaderStage::Vertex)
            .unwrap_err();
        assert!(err.starts_with("broken.esf"));
    }
}
