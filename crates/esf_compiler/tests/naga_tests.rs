//! Naga End-to-End Tests
//!
//! Compiles the fixture trees through the real WGSL -> SPIR-V backend.

#![cfg(feature = "naga")]

use esf_compiler::{NagaCompiler, compile_tree};
use esf_core::{BindingCategory, EsfError, ShaderStage};
use esf_dev_utils::fixtures::{material_tree, material_with_compute_tree};
use esf_package::{BindingMapping, package_to_bytes, read_package};
use esf_syntax::{Node, StateBlock};

const SPIRV_MAGIC: u32 = 0x0723_0203;

#[test]
fn material_compiles_to_spirv() {
    let package = compile_tree(&NagaCompiler::new(), &material_with_compute_tree(), "material.esf").unwrap();

    assert_eq!(package.bindings[BindingCategory::ConstantBuffer], ["globals"]);
    assert_eq!(package.bindings[BindingCategory::Sampler], ["linear"]);
    assert_eq!(package.bindings[BindingCategory::ShaderResourceView], ["albedo", "normals"]);
    assert_eq!(package.bindings[BindingCategory::UnorderedAccessView], ["counters"]);

    assert_eq!(
        package.units.iter().map(|u| u.stage).collect::<Vec<_>>(),
        [ShaderStage::Vertex, ShaderStage::Pixel, ShaderStage::Compute]
    );
    for unit in &package.units {
        assert_eq!(unit.bytecode[..4], SPIRV_MAGIC.to_le_bytes());
    }

    assert_eq!(
        package.unit_mappings(1, BindingCategory::ShaderResourceView),
        [
            BindingMapping { binding: 0, slot: 0 },
            BindingMapping { binding: 1, slot: 1 },
        ]
    );
}

#[test]
fn spirv_package_round_trips() {
    let package = compile_tree(&NagaCompiler::new(), &material_tree(), "material.esf").unwrap();
    let bytes = package_to_bytes(&package).unwrap();

    assert_eq!(read_package(&bytes).unwrap(), package);
    assert_eq!(
        package_to_bytes(&compile_tree(&NagaCompiler::new(), &material_tree(), "material.esf").unwrap())
            .unwrap(),
        bytes
    );
}

#[test]
fn geometry_stage_is_a_compile_error() {
    let mut tree = material_tree();
    tree.push(Node::Technique(
        StateBlock::new("Outline")
            .with("VertexShader", "vs_main")
            .with("GeometryShader", "gs_outline"),
    ));

    let err = compile_tree(&NagaCompiler::new(), &tree, "material.esf").unwrap_err();

    assert!(matches!(err, EsfError::Compile { stage: ShaderStage::Geometry, .. }));
}
