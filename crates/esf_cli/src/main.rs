//! esfc
//!
//! ```text
//! esfc convert shaders/water.esf -o build/shaders --deps
//! esfc inspect build/shaders/water.esfpkg
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for per-pass
//! details.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use esf::package::{Package, read_package};
use esf::{ConvertContext, ConvertSettings, ConverterRegistry};
use esf_core::{BindingCategory, ShaderStage};

const PACKAGE_EXTENSION: &str = "esfpkg";

#[derive(Parser, Debug)]
#[command(name = "esfc", version, about = "Compile ESF shader descriptions into binary shader packages.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one or more source files into packages
    Convert {
        /// Source files (`.esf`, `.esf.json`)
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Output directory (defaults to each source's directory)
        #[arg(short = 'o', long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// JSON settings file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Dump generated WGSL for every pass into this directory
        #[arg(long, value_name = "DIR")]
        dump_dir: Option<PathBuf>,

        /// Rewrite outputs even when their content is unchanged
        #[arg(long, action = clap::ArgAction::SetTrue)]
        force: bool,

        /// Print every dependency of each conversion
        #[arg(long, action = clap::ArgAction::SetTrue)]
        deps: bool,
    },
    /// Print a JSON summary of a package
    Inspect {
        package: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    match Args::parse().command {
        Command::Convert {
            sources,
            out_dir,
            config,
            dump_dir,
            force,
            deps,
        } => {
            let mut settings = match config {
                Some(path) => ConvertSettings::load(&path)
                    .with_context(|| format!("load settings {}", path.display()))?,
                None => ConvertSettings::default(),
            };
            if dump_dir.is_some() {
                settings.dump_generated_source = dump_dir;
            }
            if force {
                settings.skip_unchanged = false;
            }
            log::debug!("Settings: {settings:?}");
            convert(&sources, out_dir.as_deref(), &settings, deps)
        }
        Command::Inspect { package } => inspect(&package),
    }
}

// ============================================================================
// convert
// ============================================================================

fn convert(sources: &[PathBuf], out_dir: Option<&Path>, settings: &ConvertSettings, deps: bool) -> anyhow::Result<()> {
    let registry = ConverterRegistry::with_defaults();
    let mut failures = 0usize;

    for source in sources {
        let Some(file_type) = registry.file_type_of(source) else {
            bail!(
                "{}: unsupported file type (expected one of: {})",
                source.display(),
                registry.file_types().collect::<Vec<_>>().join(", ")
            );
        };
        let Some(converter) = registry.create(file_type) else {
            bail!("{}: no converter registered for '{file_type}'", source.display());
        };
        let destination = destination_for(source, file_type, out_dir)?;

        let mut ctx = ConvertContext::new(settings.clone());
        let result = converter.convert(&mut ctx, source, &destination);

        if deps {
            for dependency in ctx.dependencies() {
                println!("dep {}", dependency.display());
            }
        }
        match result {
            Ok(()) => {
                for output in ctx.outputs() {
                    println!(
                        "{} {} ({:016x})",
                        if output.written { "wrote" } else { "unchanged" },
                        output.path.display(),
                        output.fingerprint
                    );
                }
            }
            Err(e) => {
                eprintln!("{e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} conversion(s) failed", sources.len());
    }
    Ok(())
}

/// `<out_dir or source dir>/<name without file type>.esfpkg`
fn destination_for(source: &Path, file_type: &str, out_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{}: invalid file name", source.display()))?;
    let stem = &name[..name.len() - file_type.len() - 1];
    let dir = out_dir.unwrap_or_else(|| source.parent().unwrap_or(Path::new("")));
    Ok(dir.join(format!("{stem}.{PACKAGE_EXTENSION}")))
}

// ============================================================================
// inspect
// ============================================================================

#[derive(Serialize)]
struct PackageSummary<'a> {
    bytecode_bytes: usize,
    bindings: Vec<CategorySummary<'a>>,
    units: Vec<UnitSummary>,
    techniques: Vec<TechniqueSummary<'a>>,
    sampler_states: Vec<&'a str>,
}

#[derive(Serialize)]
struct CategorySummary<'a> {
    category: String,
    names: &'a [String],
}

#[derive(Serialize)]
struct UnitSummary {
    stage: String,
    bytes: usize,
    bindings: usize,
}

#[derive(Serialize)]
struct TechniqueSummary<'a> {
    name: &'a str,
    stages: Vec<(String, usize)>,
}

fn summarize(package: &Package) -> PackageSummary<'_> {
    PackageSummary {
        bytecode_bytes: package.bytecode_len(),
        bindings: BindingCategory::ALL
            .into_iter()
            .map(|category| CategorySummary {
                category: category.to_string(),
                names: &package.bindings[category],
            })
            .collect(),
        units: package
            .units
            .iter()
            .map(|unit| UnitSummary {
                stage: unit.stage.to_string(),
                bytes: unit.bytecode.len(),
                bindings: unit.total_bindings(),
            })
            .collect(),
        techniques: package
            .techniques
            .iter()
            .map(|technique| TechniqueSummary {
                name: &technique.name,
                stages: ShaderStage::ALL
                    .into_iter()
                    .filter_map(|stage| technique.unit(stage).map(|unit| (stage.to_string(), unit)))
                    .collect(),
            })
            .collect(),
        sampler_states: package.sampler_states.iter().map(|s| s.name.as_str()).collect(),
    }
}

fn inspect(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let package = read_package(&bytes).with_context(|| format!("parse {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&summarize(&package))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_strips_file_type() {
        assert_eq!(
            destination_for(Path::new("shaders/water.esf.json"), "esf.json", None).unwrap(),
            PathBuf::from("shaders/water.esfpkg")
        );
        assert_eq!(
            destination_for(Path::new("water.esf"), "esf", Some(Path::new("build"))).unwrap(),
            PathBuf::from("build/water.esfpkg")
        );
    }

    #[test]
    fn args_parse_convert() {
        let args = Args::try_parse_from(["esfc", "convert", "a.esf", "b.esf", "-o", "out", "--force"]).unwrap();
        let Command::Convert { sources, out_dir, force, deps, .. } = args.command else {
            panic!("expected convert");
        };
        assert_eq!(sources.len(), 2);
        assert_eq!(out_dir, Some(PathBuf::from("out")));
        assert!(force);
        assert!(!deps);
    }
}
