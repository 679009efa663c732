//! Compile Driver
//!
//! Runs the two-pass binding compaction:
//!
//! 1. Generate source with the default layout (declaration order per
//!    category), compile every unit, and collect the bindings that survived
//!    compilation into per-category tables.
//! 2. Regenerate source with those tables as slot hints and compile every
//!    unit again.
//!
//! After pass 2 each used resource sits at its table index, so the tables are
//! dense and unused declarations no longer occupy slots ahead of used ones.
//! The first failing unit aborts the run; nothing is retried.

use esf_core::{BindingTables, EsfError, Result};
use esf_syntax::{GeneratedSource, SyntaxTree, TechniqueDesc, generate_source};

use crate::backend::NativeCompiler;
use crate::collector::collect_bindings;
use crate::unit::{CompiledUnit, shader_units};

/// Result of compiling every unit once against one generated source.
#[derive(Debug, Clone)]
pub struct CompilePass {
    pub source: GeneratedSource,
    pub units: Vec<CompiledUnit>,
}

/// Result of [`CompileDriver::run_two_pass`].
#[derive(Debug, Clone)]
pub struct TwoPassOutput {
    /// Tables collected from pass 1 and used as hints for pass 2.
    pub hints: BindingTables,
    /// Source generated for pass 1.
    pub discovery_source: GeneratedSource,
    /// Pass 2 source and units. These are what gets packaged.
    pub compact: CompilePass,
}

/// Receives every generated source right after generation, before any unit
/// of that pass is compiled.
pub type SourceSink<'a> = &'a dyn Fn(&GeneratedSource);

pub struct CompileDriver<'a, C: NativeCompiler + ?Sized> {
    compiler: &'a C,
    tree: &'a SyntaxTree,
    unit_name: &'a str,
    sink: Option<SourceSink<'a>>,
}

impl<'a, C: NativeCompiler + ?Sized> CompileDriver<'a, C> {
    /// `unit_name` is passed through to the backend for its diagnostics,
    /// usually the source file path.
    pub fn new(compiler: &'a C, tree: &'a SyntaxTree, unit_name: &'a str) -> Self {
        Self {
            compiler,
            tree,
            unit_name,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_source_sink(mut self, sink: SourceSink<'a>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Generates source with `hints` and compiles every unit referenced by
    /// `techniques` in canonical order.
    pub fn compile_pass(&self, techniques: &[TechniqueDesc], hints: &BindingTables) -> Result<CompilePass> {
        let source = generate_source(self.tree, hints)?;
        if let Some(sink) = self.sink {
            sink(&source);
        }
        let units = shader_units(techniques);
        log::debug!(
            "Compiling {} unit(s) of '{}' ({} hinted binding(s))",
            units.len(),
            self.unit_name,
            hints.total_len()
        );

        let mut compiled = Vec::with_capacity(units.len());
        for unit in units {
            match self
                .compiler
                .compile(self.unit_name, &source.code, &unit.entry_point, unit.stage)
            {
                Ok(output) => compiled.push(CompiledUnit {
                    unit,
                    bytecode: output.bytecode,
                    bindings: output.bindings,
                }),
                Err(diagnostic) => {
                    log::error!("{diagnostic}");
                    return Err(EsfError::Compile {
                        entry_point: unit.entry_point,
                        stage: unit.stage,
                        diagnostic,
                    });
                }
            }
        }

        Ok(CompilePass {
            source,
            units: compiled,
        })
    }

    /// Runs both passes and returns the pass 2 units with the hints they
    /// were compiled against.
    pub fn run_two_pass(&self, techniques: &[TechniqueDesc]) -> Result<TwoPassOutput> {
        let discovery = self.compile_pass(techniques, &BindingTables::default())?;
        let hints = collect_bindings(&discovery.units);

        let compact = self.compile_pass(techniques, &hints)?;
        for slot in compact.source.slots.iter().filter(|s| !s.hinted) {
            log::warn!(
                "{}: {} '{}' is declared but not used by any compiled unit",
                self.unit_name,
                slot.category,
                slot.name
            );
        }

        Ok(TwoPassOutput {
            hints,
            discovery_source: discovery.source,
            compact,
        })
    }
}
