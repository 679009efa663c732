//! WGSL Code Generator
//!
//! Renders a [`SyntaxTree`] into a single WGSL module with explicit resource
//! slots. Slot assignment is the only decision this pass makes:
//!
//! | Category | `@group` |
//! |----------|----------|
//! | constant buffer | 0 |
//! | sampler | 1 |
//! | shader resource view | 2 |
//! | unordered access view | 3 |
//!
//! Within a group, `@binding` is the resource's index in the supplied
//! [`BindingTables`]. Resources missing from the tables are placed after the
//! hinted ones, in declaration order. With empty tables this degenerates to
//! plain declaration order, which is the layout used for the discovery pass.

use std::sync::OnceLock;

use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, Error, ErrorKind};
use rust_embed::RustEmbed;
use rustc_hash::FxHashSet;
use serde::Serialize;

use esf_core::{BindingCategory, BindingTables, CategoryMap, EsfError, Result};

use crate::tree::{Node, ResourceKind, SyntaxTree};

const MODULE_TEMPLATE: &str = "module.wgsl";

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "templates"]
struct TemplateAssets;

fn get_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();

        let syntax = SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .build()
            .expect("Failed to configure template syntax");

        env.set_syntax(syntax);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.set_loader(template_loader);

        env
    })
}

fn template_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let Some(file) = TemplateAssets::get(name) else {
        return Ok(None);
    };
    std::str::from_utf8(file.data.as_ref())
        .map(|source| Some(source.to_owned()))
        .map_err(|e| Error::new(ErrorKind::TemplateNotFound, format!("{name}: {e}")))
}

/// Slot assigned to one declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSlot {
    pub name: String,
    pub category: BindingCategory,
    pub slot: u32,
    /// Whether the slot came from the binding tables.
    pub hinted: bool,
}

/// Output of [`generate_source`].
#[derive(Debug, Clone)]
pub struct GeneratedSource {
    pub code: String,
    /// Every declared resource, in declaration order.
    pub slots: Vec<ResourceSlot>,
}

impl GeneratedSource {
    #[must_use]
    pub fn slot_of(&self, name: &str) -> Option<&ResourceSlot> {
        self.slots.iter().find(|s| s.name == name)
    }
}

#[derive(Serialize)]
struct GenResource<'a> {
    group: u32,
    binding: u32,
    space: &'static str,
    name: &'a str,
    ty: &'a str,
}

#[derive(Serialize)]
struct GenItem<'a> {
    resource: Option<GenResource<'a>>,
    source: Option<&'a str>,
}

#[derive(Serialize)]
struct ModuleContext<'a> {
    layout: &'static str,
    items: Vec<GenItem<'a>>,
}

/// Generates WGSL for the whole tree using `hints` for slot assignment.
pub fn generate_source(tree: &SyntaxTree, hints: &BindingTables) -> Result<GeneratedSource> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut next_free: CategoryMap<u32> = hints.map(|table| table.len() as u32);
    let mut slots = Vec::new();
    let mut items = Vec::with_capacity(tree.nodes.len());

    for node in &tree.nodes {
        match node {
            Node::Struct(snippet) | Node::Function(snippet) => items.push(GenItem {
                resource: None,
                source: Some(snippet.source.trim_end()),
            }),
            Node::Resource(decl) => {
                if !seen.insert(decl.name.as_str()) {
                    return Err(EsfError::Parse(format!(
                        "duplicate resource '{}'",
                        decl.name
                    )));
                }
                let category = decl.resource.category();
                let (slot, hinted) = match hints[category].get(&decl.name) {
                    Some(index) => (index, true),
                    None => {
                        let slot = next_free[category];
                        next_free[category] += 1;
                        (slot, false)
                    }
                };
                let (space, ty) = declaration_parts(&decl.resource);
                items.push(GenItem {
                    resource: Some(GenResource {
                        group: category as u32,
                        binding: slot,
                        space,
                        name: &decl.name,
                        ty,
                    }),
                    source: None,
                });
                slots.push(ResourceSlot {
                    name: decl.name.clone(),
                    category,
                    slot,
                    hinted,
                });
            }
            Node::SamplerState(_) | Node::RenderState(_) | Node::Technique(_) => {}
        }
    }

    let ctx = ModuleContext {
        layout: if hints.total_len() == 0 {
            "default"
        } else {
            "compact"
        },
        items,
    };

    let code = get_env()
        .get_template(MODULE_TEMPLATE)
        .and_then(|template| template.render(&ctx))
        .map_err(|e| EsfError::Codegen(e.to_string()))?;

    Ok(GeneratedSource { code, slots })
}

/// Address-space qualifier and type for a resource declaration.
fn declaration_parts(kind: &ResourceKind) -> (&'static str, &str) {
    match kind {
        ResourceKind::ConstantBuffer { ty } => ("<uniform>", ty),
        ResourceKind::Sampler { comparison: false } => ("", "sampler"),
        ResourceKind::Sampler { comparison: true } => ("", "sampler_comparison"),
        ResourceKind::Texture { ty } | ResourceKind::StorageTexture { ty } => ("", ty),
        ResourceKind::StorageBuffer {
            ty,
            read_write: false,
        } => ("<storage, read>", ty),
        ResourceKind::StorageBuffer {
            ty,
            read_write: true,
        } => ("<storage, read_write>", ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SyntaxTree {
        SyntaxTree::new()
            .with(Node::structure("Camera", "struct Camera { view_proj: mat4x4<f32> }"))
            .with(Node::resource("camera", ResourceKind::constant_buffer("Camera")))
            .with(Node::resource("albedo", ResourceKind::texture("texture_2d<f32>")))
            .with(Node::resource("linear", ResourceKind::Sampler { comparison: false }))
            .with(Node::resource("normals", ResourceKind::texture("texture_2d<f32>")))
            .with(Node::resource("out_buf", ResourceKind::storage_buffer("array<u32>", true)))
            .with(Node::function("vs_main", "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return camera.view_proj[0]; }"))
    }

    #[test]
    fn default_layout_uses_declaration_order() {
        let out = generate_source(&tree(), &BindingTables::default()).unwrap();

        assert_eq!(out.slot_of("camera").unwrap().slot, 0);
        assert_eq!(out.slot_of("albedo").unwrap().slot, 0);
        assert_eq!(out.slot_of("normals").unwrap().slot, 1);
        assert_eq!(out.slot_of("linear").unwrap().slot, 0);
        assert_eq!(out.slot_of("out_buf").unwrap().category, BindingCategory::UnorderedAccessView);
        assert!(out.slots.iter().all(|s| !s.hinted));

        assert!(out.code.contains("@group(0) @binding(0) var<uniform> camera: Camera;"));
        assert!(out.code.contains("@group(2) @binding(1) var normals: texture_2d<f32>;"));
        assert!(out.code.contains("@group(1) @binding(0) var linear: sampler;"));
        assert!(out.code.contains("@group(3) @binding(0) var<storage, read_write> out_buf: array<u32>;"));
        assert!(out.code.contains("struct Camera { view_proj: mat4x4<f32> }"));
        assert!(out.code.contains("@vertex fn vs_main()"));
    }

    #[test]
    fn hints_take_priority_and_unhinted_follow() {
        let mut hints = BindingTables::default();
        hints[BindingCategory::ShaderResourceView].insert("normals");

        let out = generate_source(&tree(), &hints).unwrap();
        let normals = out.slot_of("normals").unwrap();
        let albedo = out.slot_of("albedo").unwrap();
        assert_eq!((normals.slot, normals.hinted), (0, true));
        assert_eq!((albedo.slot, albedo.hinted), (1, false));
        assert!(out.code.contains("@group(2) @binding(0) var normals"));
        assert!(out.code.contains("compact layout"));
    }

    #[test]
    fn duplicate_resource_is_rejected() {
        let tree = tree().with(Node::resource("camera", ResourceKind::constant_buffer("Camera")));
        assert!(matches!(
            generate_source(&tree, &BindingTables::default()),
            Err(EsfError::Parse(_))
        ));
    }

    #[test]
    fn output_is_deterministic() {
        let a = generate_source(&tree(), &BindingTables::default()).unwrap();
        let b = generate_source(&tree(), &BindingTables::default()).unwrap();
        assert_eq!(a.code, b.code);
    }
}
