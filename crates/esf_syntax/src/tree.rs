//! Syntax Tree
//!
//! A closed set of node kinds produced by the ESF frontend. Each analysis
//! pass (metadata extraction, code generation) is a single `match` over
//! [`Node`], so the tree shape stays independent of what is done with it.
//!
//! Function and struct bodies are kept as verbatim target-language snippets:
//! the compiler only needs to understand resources, state blocks and
//! techniques.
//!
//! The tree is `serde`-serializable; the JSON form uses `kind` as the node tag:
//!
//! ```json
//! { "nodes": [
//!     { "kind": "resource", "name": "camera",
//!       "resource": { "type": "constant_buffer", "ty": "Camera" } },
//!     { "kind": "technique", "name": "Main",
//!       "members": [ { "key": "VertexShader", "value": "vs_main" } ] }
//! ] }
//! ```

use serde::{Deserialize, Serialize};

use esf_core::{BindingCategory, EsfError, Result};

/// Root of a parsed shader description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub nodes: Vec<Node>,
}

impl SyntaxTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node, builder style.
    #[must_use]
    pub fn with(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Deserializes a tree from its JSON form.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EsfError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EsfError::Parse(e.to_string()))
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Struct definition, emitted verbatim.
    Struct(Snippet),
    /// Function definition (entry point or helper), emitted verbatim.
    Function(Snippet),
    /// Bindable resource; its slot is assigned by code generation.
    Resource(ResourceDecl),
    SamplerState(StateBlock),
    RenderState(StateBlock),
    Technique(StateBlock),
}

impl Node {
    #[must_use]
    pub fn function(name: &str, source: &str) -> Self {
        Self::Function(Snippet::new(name, source))
    }

    #[must_use]
    pub fn structure(name: &str, source: &str) -> Self {
        Self::Struct(Snippet::new(name, source))
    }

    #[must_use]
    pub fn resource(name: &str, resource: ResourceKind) -> Self {
        Self::Resource(ResourceDecl {
            name: name.to_owned(),
            resource,
        })
    }
}

/// Named block of target source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub name: String,
    pub source: String,
}

impl Snippet {
    #[must_use]
    pub fn new(name: &str, source: &str) -> Self {
        Self {
            name: name.to_owned(),
            source: source.to_owned(),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub name: String,
    pub resource: ResourceKind,
}

/// Resource declaration kinds. `ty` is the target-language type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    ConstantBuffer {
        ty: String,
    },
    Sampler {
        #[serde(default)]
        comparison: bool,
    },
    Texture {
        ty: String,
    },
    StorageBuffer {
        ty: String,
        #[serde(default)]
        read_write: bool,
    },
    StorageTexture {
        ty: String,
    },
}

impl ResourceKind {
    #[must_use]
    pub fn category(&self) -> BindingCategory {
        match self {
            Self::ConstantBuffer { .. } => BindingCategory::ConstantBuffer,
            Self::Sampler { .. } => BindingCategory::Sampler,
            Self::Texture { .. } | Self::StorageBuffer { read_write: false, .. } => {
                BindingCategory::ShaderResourceView
            }
            Self::StorageTexture { .. } | Self::StorageBuffer { read_write: true, .. } => {
                BindingCategory::UnorderedAccessView
            }
        }
    }

    #[must_use]
    pub fn constant_buffer(ty: &str) -> Self {
        Self::ConstantBuffer { ty: ty.to_owned() }
    }

    #[must_use]
    pub fn texture(ty: &str) -> Self {
        Self::Texture { ty: ty.to_owned() }
    }

    #[must_use]
    pub fn storage_buffer(ty: &str, read_write: bool) -> Self {
        Self::StorageBuffer {
            ty: ty.to_owned(),
            read_write,
        }
    }

    #[must_use]
    pub fn storage_texture(ty: &str) -> Self {
        Self::StorageTexture { ty: ty.to_owned() }
    }
}

// ============================================================================
// State blocks
// ============================================================================

/// `Name { Key = Value, ... }` block used by sampler states, render states
/// and techniques.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBlock {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl StateBlock {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<MemberValue>) -> Self {
        self.members.push(Member {
            key: key.to_owned(),
            value: value.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub key: String,
    pub value: MemberValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Vector(Vec<f64>),
    Ident(String),
}

impl From<&str> for MemberValue {
    fn from(value: &str) -> Self {
        Self::Ident(value.to_owned())
    }
}

impl From<bool> for MemberValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MemberValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MemberValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<[f64; 4]> for MemberValue {
    fn from(value: [f64; 4]) -> Self {
        Self::Vector(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_categories() {
        assert_eq!(
            ResourceKind::constant_buffer("Camera").category(),
            BindingCategory::ConstantBuffer
        );
        assert_eq!(
            ResourceKind::Sampler { comparison: true }.category(),
            BindingCategory::Sampler
        );
        assert_eq!(
            ResourceKind::storage_buffer("array<f32>", false).category(),
            BindingCategory::ShaderResourceView
        );
        assert_eq!(
            ResourceKind::storage_buffer("array<f32>", true).category(),
            BindingCategory::UnorderedAccessView
        );
        assert_eq!(
            ResourceKind::storage_texture("texture_storage_2d<rgba8unorm, write>").category(),
            BindingCategory::UnorderedAccessView
        );
    }

    #[test]
    fn json_round_trip() {
        let tree = SyntaxTree::new()
            .with(Node::resource("camera", ResourceKind::constant_buffer("Camera")))
            .with(Node::function("vs_main", "@vertex fn vs_main() {}"))
            .with(Node::SamplerState(
                StateBlock::new("Linear")
                    .with("Filter", "MIN_MAG_MIP_LINEAR")
                    .with("MaxAnisotropy", 4_i64)
                    .with("MipLODBias", 0.5)
                    .with("BorderColor", [0.0, 0.0, 0.0, 1.0]),
            ))
            .with(Node::Technique(StateBlock::new("Main").with("VertexShader", "vs_main")));

        let json = tree.to_json().unwrap();
        assert_eq!(SyntaxTree::from_json(&json).unwrap(), tree);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = SyntaxTree::from_json("{ \"nodes\": [ { \"kind\": \"bogus\" } ] }").unwrap_err();
        assert!(matches!(err, EsfError::Parse(_)));
    }
}
