//! ESF syntax tree and the two analysis passes run over it.
//!
//! - [`tree`]: the node types handed over by the frontend
//! - [`metadata`]: technique and sampler-state extraction
//! - [`codegen`]: WGSL generation parameterized by binding tables

pub mod codegen;
pub mod metadata;
pub mod tree;

pub use codegen::{GeneratedSource, ResourceSlot, generate_source};
pub use metadata::{SamplerStateDesc, ShaderMetadata, TechniqueDesc, extract_metadata};
pub use tree::{Member, MemberValue, Node, ResourceDecl, ResourceKind, Snippet, StateBlock, SyntaxTree};
