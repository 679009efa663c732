//! Fixture trees shared by the integration tests and benches.
//!
//! The WGSL snippets are valid on their own, so the same trees drive both
//! the scripted compiler and the naga backend.

use esf_syntax::{Node, ResourceKind, StateBlock, SyntaxTree};

use crate::scripted::ScriptedCompiler;

const GLOBALS: &str = "struct Globals {
    transform: mat4x4<f32>,
    tint: vec4<f32>,
}";

const VERTEX_OUTPUT: &str = "struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}";

const VS_MAIN: &str = "@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    let x = f32(index & 1u);
    let y = f32(index >> 1u);
    out.uv = vec2<f32>(x, y);
    out.position = globals.transform * vec4<f32>(x, y, 0.0, 1.0);
    return out;
}";

const PS_MAIN: &str = "@fragment
fn ps_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let base = textureSample(albedo, linear, uv);
    let normal = textureSample(normals, linear, uv);
    return base * normal * globals.tint;
}";

const CS_CLEAR: &str = "@compute @workgroup_size(64)
fn cs_clear(@builtin(global_invocation_id) id: vec3<u32>) {
    counters[id.x] = 0u;
}";

/// A material with one unused constant buffer and one unused texture, each
/// declared ahead of the resources that are actually used.
///
/// Declaration order per category:
/// - cbuffer: `unused_constants`, `globals`
/// - srv: `noise`, `albedo`, `normals`
/// - sampler: `linear`
#[must_use]
pub fn material_tree() -> SyntaxTree {
    SyntaxTree::new()
        .with(Node::structure("Globals", GLOBALS))
        .with(Node::structure("VertexOutput", VERTEX_OUTPUT))
        .with(Node::resource("unused_constants", ResourceKind::constant_buffer("Globals")))
        .with(Node::resource("globals", ResourceKind::constant_buffer("Globals")))
        .with(Node::resource("noise", ResourceKind::texture("texture_2d<f32>")))
        .with(Node::resource("albedo", ResourceKind::texture("texture_2d<f32>")))
        .with(Node::resource("normals", ResourceKind::texture("texture_2d<f32>")))
        .with(Node::resource("linear", ResourceKind::Sampler { comparison: false }))
        .with(Node::RenderState(
            StateBlock::new("NoCull").with("CullMode", "None"),
        ))
        .with(Node::SamplerState(
            StateBlock::new("LinearWrap")
                .with("Filter", "MIN_MAG_MIP_LINEAR")
                .with("AddressU", "Wrap")
                .with("AddressV", "Wrap"),
        ))
        .with(Node::function("vs_main", VS_MAIN))
        .with(Node::function("ps_main", PS_MAIN))
        .with(Node::Technique(
            StateBlock::new("Main")
                .with("VertexShader", "vs_main")
                .with("PixelShader", "ps_main")
                .with("RenderState", "NoCull"),
        ))
}

/// Scripted backend matching the references in [`material_tree`].
#[must_use]
pub fn material_compiler() -> ScriptedCompiler {
    ScriptedCompiler::new()
        .entry("vs_main", &["globals"])
        .entry("ps_main", &["albedo", "linear", "normals", "globals"])
}

/// [`material_tree`] plus a compute technique writing a storage buffer.
#[must_use]
pub fn material_with_compute_tree() -> SyntaxTree {
    let mut tree = material_tree();
    tree.push(Node::resource(
        "counters",
        ResourceKind::storage_buffer("array<u32>", true),
    ));
    tree.push(Node::function("cs_clear", CS_CLEAR));
    tree.push(Node::Technique(
        StateBlock::new("Clear").with("ComputeShader", "cs_clear"),
    ));
    tree
}

/// Scripted backend matching [`material_with_compute_tree`].
#[must_use]
pub fn material_with_compute_compiler() -> ScriptedCompiler {
    material_compiler().entry("cs_clear", &["counters"])
}
