//! Scripted native compiler
//!
//! Stands in for a real backend in tests. It reads the `@group/@binding`
//! declarations out of the generated WGSL and reports, per entry point, a
//! scripted list of used resources at whatever slots the source gave them.
//! Bytecode encodes stage, entry point and the reported slots, so it changes
//! whenever the layout does.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use esf_compiler::{NativeCompiler, NativeOutput, ReflectedBinding};
use esf_core::{BindingCategory, CategoryMap, ShaderStage};

#[derive(Debug, Clone, Default)]
struct EntryScript {
    uses: Vec<String>,
    diagnostic: Option<String>,
    slot_bias: u32,
    dropped_when_compact: Vec<String>,
}

/// One recorded backend invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCall {
    pub entry_point: String,
    pub stage: ShaderStage,
    pub source: String,
}

#[derive(Debug, Default)]
pub struct ScriptedCompiler {
    scripts: FxHashMap<String, EntryScript>,
    calls: RefCell<Vec<CompileCall>>,
}

impl ScriptedCompiler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources `entry_point` references, in reflection order.
    #[must_use]
    pub fn entry(mut self, entry_point: &str, uses: &[&str]) -> Self {
        self.script(entry_point).uses = uses.iter().map(|&s| s.to_owned()).collect();
        self
    }

    /// Makes every compile of `entry_point` fail with `diagnostic`.
    #[must_use]
    pub fn failing(mut self, entry_point: &str, diagnostic: &str) -> Self {
        self.script(entry_point).diagnostic = Some(diagnostic.to_owned());
        self
    }

    /// Reports slots of `entry_point` shifted by `bias`, as a backend that
    /// relocates registers would.
    #[must_use]
    pub fn slot_bias(mut self, entry_point: &str, bias: u32) -> Self {
        self.script(entry_point).slot_bias = bias;
        self
    }

    /// Stops reporting `name` for `entry_point` once the source uses the
    /// compact layout, so the pass 2 tables diverge from the hints.
    #[must_use]
    pub fn drop_when_compact(mut self, entry_point: &str, name: &str) -> Self {
        self.script(entry_point)
            .dropped_when_compact
            .push(name.to_owned());
        self
    }

    fn script(&mut self, entry_point: &str) -> &mut EntryScript {
        self.scripts.entry(entry_point.to_owned()).or_default()
    }

    /// Every invocation so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<CompileCall> {
        self.calls.borrow().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

/// Resource declarations of generated WGSL: name to `(category, slot)`.
#[must_use]
pub fn declared_resources(source: &str) -> FxHashMap<String, (BindingCategory, u32)> {
    source.lines().filter_map(parse_declaration).collect()
}

fn parse_declaration(line: &str) -> Option<(String, (BindingCategory, u32))> {
    let rest = line.trim().strip_prefix("@group(")?;
    let (group, rest) = rest.split_once(')')?;
    let rest = rest.trim_start().strip_prefix("@binding(")?;
    let (binding, rest) = rest.split_once(')')?;
    let rest = rest.trim_start().strip_prefix("var")?;
    let rest = match rest.strip_prefix('<') {
        Some(qualified) => qualified.split_once('>')?.1,
        None => rest,
    };
    let (name, _) = rest.split_once(':')?;
    let category = *BindingCategory::ALL.get(group.parse::<usize>().ok()?)?;
    Some((name.trim().to_owned(), (category, binding.parse().ok()?)))
}

impl NativeCompiler for ScriptedCompiler {
    fn compile(
        &self,
        unit_name: &str,
        source: &str,
        entry_point: &str,
        stage: ShaderStage,
    ) -> Result<NativeOutput, String> {
        self.calls.borrow_mut().push(CompileCall {
            entry_point: entry_point.to_owned(),
            stage,
            source: source.to_owned(),
        });

        let script = self.scripts.get(entry_point).cloned().unwrap_or_default();
        if let Some(diagnostic) = script.diagnostic {
            return Err(diagnostic);
        }
        if !source.contains(&format!("fn {entry_point}(")) {
            return Err(format!(
                "{unit_name}: error: entry point '{entry_point}' not found"
            ));
        }

        let declared = declared_resources(source);
        let compact = source.contains("(compact layout)");
        let mut bindings: CategoryMap<Vec<ReflectedBinding>> = CategoryMap::default();
        let mut bytecode = format!("{stage}:{entry_point}");

        for name in &script.uses {
            if compact && script.dropped_when_compact.contains(name) {
                continue;
            }
            let &(category, slot) = declared.get(name).ok_or_else(|| {
                format!("{unit_name}: error: undeclared identifier '{name}'")
            })?;
            let slot = slot + script.slot_bias;
            bytecode.push_str(&format!("|{category}:{name}@{slot}"));
            bindings[category].push(ReflectedBinding::new(name, slot));
        }

        Ok(NativeOutput {
            bytecode: bytecode.into_bytes(),
            bindings,
        })
    }
}
