//! # ESF
//!
//! Offline compiler that turns ESF shader descriptions into self-describing
//! binary shader packages.
//!
//! The heavy lifting lives in the member crates, re-exported here:
//!
//! - [`esf_core`]: stages, binding categories and tables, fixed state
//!   records, errors
//! - [`syntax`]: syntax tree, metadata extraction, WGSL code generation
//! - [`compiler`]: two-pass binding compaction and package layout
//! - [`package`]: binary package model, writer and reader
//!
//! This crate adds the file-level pipeline: frontends, the converter with
//! atomic output, the converter registry and settings.
//!
//! ```rust,ignore
//! use esf::{ConvertContext, ConvertSettings, ConverterRegistry};
//!
//! let registry = ConverterRegistry::with_defaults();
//! let converter = registry.create_for_path(source).expect("unsupported file type");
//! let mut ctx = ConvertContext::new(ConvertSettings::default());
//! converter.convert(&mut ctx, source, destination)?;
//! for dependency in ctx.dependencies() {
//!     println!("{}", dependency.display());
//! }
//! ```

pub mod convert;
pub mod frontend;
pub mod registry;
pub mod settings;

pub use esf_compiler as compiler;
pub use esf_core::{EsfError, Result};
pub use esf_package as package;
pub use esf_syntax as syntax;

pub use convert::{
    ConvertContext, ConvertOutput, Converter, SHADER_FILE_TYPES, ShaderConverter,
};
pub use frontend::{JsonTreeFrontend, ShaderFrontend};
pub use registry::{ConverterFactory, ConverterRegistry};
pub use settings::ConvertSettings;

/// Converts `source` into `destination` with the default registry.
///
/// Returns the context with every dependency and output recorded.
#[cfg(feature = "naga")]
pub fn convert_file(
    source: &std::path::Path,
    destination: &std::path::Path,
    settings: ConvertSettings,
) -> Result<ConvertContext> {
    let converter = ConverterRegistry::with_defaults()
        .create_for_path(source)
        .ok_or_else(|| {
            EsfError::Parse(format!("no converter for '{}'", source.display()))
        })?;
    let mut ctx = ConvertContext::new(settings);
    converter.convert(&mut ctx, source, destination)?;
    Ok(ctx)
}
