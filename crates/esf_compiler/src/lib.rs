//! Shader compilation core.
//!
//! Drives a [`NativeCompiler`] through the two-pass binding compaction and
//! lays the result out as an [`esf_package::Package`].
//!
//! ```rust,ignore
//! let metadata = extract_metadata(&tree)?;
//! let driver = CompileDriver::new(&compiler, &tree, "water.esf");
//! let output = driver.run_two_pass(&metadata.techniques)?;
//! let package = LayoutBuilder::new(&output.hints).build(output.compact.units, &metadata)?;
//! ```

pub mod backend;
pub mod collector;
pub mod driver;
pub mod layout;
#[cfg(feature = "naga")]
pub mod naga_backend;
pub mod unit;

pub use backend::{NativeCompiler, NativeOutput, ReflectedBinding};
pub use collector::collect_bindings;
pub use driver::{CompileDriver, CompilePass, SourceSink, TwoPassOutput};
pub use layout::LayoutBuilder;
#[cfg(feature = "naga")]
pub use naga_backend::NagaCompiler;
pub use unit::{CompiledUnit, ShaderUnit, shader_units};

use esf_core::Result;
use esf_package::Package;
use esf_syntax::{SyntaxTree, extract_metadata};

/// Compiles `tree` into a package: metadata extraction, both passes and
/// layout. `unit_name` labels backend diagnostics.
pub fn compile_tree<C: NativeCompiler + ?Sized>(
    compiler: &C,
    tree: &SyntaxTree,
    unit_name: &str,
) -> Result<Package> {
    let metadata = extract_metadata(tree)?;
    let output = CompileDriver::new(compiler, tree, unit_name).run_two_pass(&metadata.techniques)?;
    LayoutBuilder::new(&output.hints).build(output.compact.units, &metadata)
}
