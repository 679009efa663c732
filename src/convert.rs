//! Shader conversion
//!
//! [`ShaderConverter`] runs one source file through the whole pipeline:
//!
//! ```text
//! frontend -> metadata -> pass 1 -> collect -> pass 2 -> layout -> serialize -> write
//! ```
//!
//! The package is assembled completely in memory. The destination is only
//! replaced once every stage succeeded, through a temporary file in the same
//! directory that is renamed over it.

use std::cell::Cell;
use std::io::Write;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use tempfile::NamedTempFile;
use xxhash_rust::xxh3::xxh3_64;

use esf_compiler::{CompileDriver, LayoutBuilder, NativeCompiler};
use esf_core::{EsfError, Result};
use esf_package::package_to_bytes;
use esf_syntax::{GeneratedSource, extract_metadata};

use crate::frontend::ShaderFrontend;
use crate::settings::ConvertSettings;

/// File types handled by [`ShaderConverter`].
pub const SHADER_FILE_TYPES: &[&str] = &["esf", "esf.json"];

// ============================================================================
// Context
// ============================================================================

/// A destination produced by a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutput {
    pub path: PathBuf,
    /// xxh3-64 of the package bytes.
    pub fingerprint: u64,
    /// `false` when the destination already held identical bytes.
    pub written: bool,
}

/// Per-conversion state shared with the calling build system: settings in,
/// dependencies and outputs out.
#[derive(Debug, Default)]
pub struct ConvertContext {
    settings: ConvertSettings,
    dependencies: Vec<PathBuf>,
    seen: FxHashSet<PathBuf>,
    outputs: Vec<ConvertOutput>,
}

impl ConvertContext {
    #[must_use]
    pub fn new(settings: ConvertSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ConvertSettings {
        &self.settings
    }

    /// Records a file the result depends on. Repeats are ignored.
    pub fn add_dependency(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.seen.insert(path.clone()) {
            self.dependencies.push(path);
        }
    }

    pub fn add_output(&mut self, output: ConvertOutput) {
        self.outputs.push(output);
    }

    /// Dependencies in the order they were first reported.
    #[must_use]
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    #[must_use]
    pub fn outputs(&self) -> &[ConvertOutput] {
        &self.outputs
    }
}

// ============================================================================
// Converter
// ============================================================================

pub trait Converter {
    /// `file_type` is the lowercase extension without the leading dot, e.g.
    /// `esf` or `esf.json`.
    fn supports_file_type(&self, file_type: &str) -> bool;

    fn convert(&self, ctx: &mut ConvertContext, source: &Path, destination: &Path) -> Result<()>;
}

/// Converts shader descriptions into binary packages.
#[derive(Debug, Clone, Default)]
pub struct ShaderConverter<F, C> {
    frontend: F,
    compiler: C,
}

impl<F: ShaderFrontend, C: NativeCompiler> ShaderConverter<F, C> {
    pub fn new(frontend: F, compiler: C) -> Self {
        Self { frontend, compiler }
    }

    /// Runs the pipeline up to the serialized package, without touching the
    /// destination.
    pub fn build_package(&self, ctx: &mut ConvertContext, source: &Path) -> Result<Vec<u8>> {
        let mut dependencies = Vec::new();
        let loaded = self.frontend.load(source, &mut dependencies);
        for dependency in dependencies {
            ctx.add_dependency(dependency);
        }
        let tree = loaded?;

        let metadata = extract_metadata(&tree)?;
        let unit_name = source.display().to_string();

        let dump = SourceDump::new(ctx.settings().dump_generated_source.as_deref(), source);
        let sink = |generated: &GeneratedSource| dump.write(generated);
        let mut driver = CompileDriver::new(&self.compiler, &tree, &unit_name);
        if dump.dir.is_some() {
            driver = driver.with_source_sink(&sink);
        }

        let output = driver.run_two_pass(&metadata.techniques)?;
        let package = LayoutBuilder::new(&output.hints).build(output.compact.units, &metadata)?;
        package_to_bytes(&package)
    }
}

impl<F: ShaderFrontend, C: NativeCompiler> Converter for ShaderConverter<F, C> {
    fn supports_file_type(&self, file_type: &str) -> bool {
        SHADER_FILE_TYPES.iter().any(|t| t.eq_ignore_ascii_case(file_type))
    }

    fn convert(&self, ctx: &mut ConvertContext, source: &Path, destination: &Path) -> Result<()> {
        ctx.add_dependency(source);

        let bytes = self.build_package(ctx, source).inspect_err(|e| {
            log::error!("Failed to convert '{}': {e}", source.display());
        })?;

        let fingerprint = xxh3_64(&bytes);
        let written = write_atomic(destination, &bytes, ctx.settings().skip_unchanged)?;
        log::info!(
            "{} '{}' -> '{}' ({} bytes, {fingerprint:016x})",
            if written { "Converted" } else { "Unchanged" },
            source.display(),
            destination.display(),
            bytes.len()
        );

        ctx.add_output(ConvertOutput {
            path: destination.to_path_buf(),
            fingerprint,
            written,
        });
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

/// Replaces `destination` with `bytes` via a sibling temporary file.
/// Returns `false` when the write was skipped because nothing changed.
fn write_atomic(destination: &Path, bytes: &[u8], skip_unchanged: bool) -> Result<bool> {
    if skip_unchanged
        && std::fs::read(destination).is_ok_and(|existing| existing == bytes)
    {
        return Ok(false);
    }

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| EsfError::io_at(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| EsfError::io_at(dir, e))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| EsfError::io_at(file.path(), e))?;
    file.persist(destination)
        .map_err(|e| EsfError::io_at(destination, e.error))?;
    Ok(true)
}

/// Writes generated sources as `<dir>/<source file name>.pass<N>.wgsl`.
/// Dump failures are logged and never fail the conversion.
struct SourceDump<'a> {
    dir: Option<&'a Path>,
    stem: String,
    pass: Cell<u32>,
}

impl<'a> SourceDump<'a> {
    fn new(dir: Option<&'a Path>, source: &Path) -> Self {
        Self {
            dir,
            stem: source
                .file_name()
                .map_or_else(|| "shader".to_owned(), |n| n.to_string_lossy().into_owned()),
            pass: Cell::new(0),
        }
    }

    fn write(&self, generated: &GeneratedSource) {
        let Some(dir) = self.dir else {
            return;
        };
        let pass = self.pass.get() + 1;
        self.pass.set(pass);

        let path = dir.join(format!("{}.pass{pass}.wgsl", self.stem));
        let result = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, &generated.code));
        match result {
            Ok(()) => log::debug!("Dumped generated source to '{}'", path.display()),
            Err(e) => log::warn!("Failed to dump generated source to '{}': {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_deduplicates_dependencies_in_order() {
        let mut ctx = ConvertContext::default();
        ctx.add_dependency("a.esf");
        ctx.add_dependency("b.esfh");
        ctx.add_dependency("a.esf");
        assert_eq!(ctx.dependencies(), [PathBuf::from("a.esf"), PathBuf::from("b.esfh")]);
    }

    #[test]
    fn atomic_write_skips_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.esfpkg");

        assert!(write_atomic(&path, b"package", true).unwrap());
        assert!(!write_atomic(&path, b"package", true).unwrap());
        assert!(write_atomic(&path, b"package", false).unwrap());
        assert!(write_atomic(&path, b"changed", true).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"changed");
    }
}
