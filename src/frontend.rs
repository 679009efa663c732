//! Shader frontends
//!
//! A frontend turns a source file into a [`SyntaxTree`] and reports every
//! file it had to read along the way. Preprocessing and parsing live behind
//! this trait; the compiler only ever sees the finished tree.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Deserialize;

use esf_core::{EsfError, Result};
use esf_syntax::{Node, SyntaxTree};

pub trait ShaderFrontend {
    /// Loads `path` into a tree.
    ///
    /// Every file touched besides `path` itself is appended to
    /// `dependencies` as soon as it is discovered, so the list is complete
    /// up to the point of failure when loading fails. A file that could not
    /// be found is still recorded.
    fn load(&self, path: &Path, dependencies: &mut Vec<PathBuf>) -> Result<SyntaxTree>;
}

impl<T: ShaderFrontend + ?Sized> ShaderFrontend for &T {
    fn load(&self, path: &Path, dependencies: &mut Vec<PathBuf>) -> Result<SyntaxTree> {
        (**self).load(path, dependencies)
    }
}

/// On-disk form read by [`JsonTreeFrontend`].
#[derive(Deserialize)]
struct TreeDocument {
    /// Paths relative to the including file. Their nodes are spliced in
    /// ahead of this document's own nodes.
    #[serde(default)]
    includes: Vec<PathBuf>,
    #[serde(default)]
    nodes: Vec<Node>,
}

/// Reads a syntax tree serialized as JSON (`*.esf`, `*.esf.json`).
///
/// Includes are expanded depth first. Files are identified by canonical path
/// and expanded at most once, so include cycles terminate and shared headers
/// appear once.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeFrontend;

impl JsonTreeFrontend {
    fn expand(
        path: &Path,
        visited: &mut FxHashSet<PathBuf>,
        nodes: &mut Vec<Node>,
        dependencies: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let text = std::fs::read_to_string(path).map_err(|e| EsfError::io_at(path, e))?;
        let document: TreeDocument = serde_json::from_str(&text)
            .map_err(|e| EsfError::Parse(format!("{}: {e}", path.display())))?;

        let base = path.parent().unwrap_or(Path::new("."));
        for include in &document.includes {
            let include = base.join(include);
            let key = match std::fs::canonicalize(&include) {
                Ok(key) => key,
                Err(e) => {
                    dependencies.push(include.clone());
                    return Err(EsfError::io_at(&include, e));
                }
            };
            if !visited.insert(key) {
                continue;
            }
            dependencies.push(include.clone());
            Self::expand(&include, visited, nodes, dependencies)?;
        }
        nodes.extend(document.nodes);
        Ok(())
    }
}

impl ShaderFrontend for JsonTreeFrontend {
    fn load(&self, path: &Path, dependencies: &mut Vec<PathBuf>) -> Result<SyntaxTree> {
        let mut visited = FxHashSet::default();
        visited.insert(std::fs::canonicalize(path).map_err(|e| EsfError::io_at(path, e))?);

        let first_include = dependencies.len();
        let mut nodes = Vec::new();
        Self::expand(path, &mut visited, &mut nodes, dependencies)?;

        log::debug!(
            "Loaded '{}': {} node(s), {} include(s)",
            path.display(),
            nodes.len(),
            dependencies.len() - first_include
        );
        Ok(SyntaxTree { nodes })
    }
}
