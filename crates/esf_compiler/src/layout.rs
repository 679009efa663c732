//! Package Layout
//!
//! Turns the pass 2 units into a [`Package`]: recomputes the binding tables
//! from the final reflection, checks them against the hints the units were
//! compiled with, emits the per-unit mappings and resolves techniques to
//! unit indices.

use esf_core::{BindingCategory, BindingTables, CategoryMap, EsfError, Result, ShaderStage};
use esf_package::{
    BindingMapping, NO_UNIT, Package, PackageSamplerState, PackageTechnique, PackageUnit,
};
use esf_syntax::{ShaderMetadata, TechniqueDesc};

use crate::collector::collect_bindings;
use crate::unit::CompiledUnit;

pub struct LayoutBuilder<'a> {
    hints: &'a BindingTables,
}

impl<'a> LayoutBuilder<'a> {
    /// `hints` are the tables the units were compiled against.
    pub fn new(hints: &'a BindingTables) -> Self {
        Self { hints }
    }

    /// Consumes `units` and assembles the package.
    ///
    /// Fails with [`EsfError::Consistency`] when the tables recomputed from
    /// `units` differ from the hints, or when a technique entry point has no
    /// compiled unit.
    pub fn build(&self, units: Vec<CompiledUnit>, metadata: &ShaderMetadata) -> Result<Package> {
        let tables = collect_bindings(&units);
        if let Some(category) = tables.first_divergence(self.hints) {
            return Err(EsfError::Consistency(format!(
                "{category} binding table changed between passes: hinted {:?}, compiled {:?}",
                self.hints[category].names(),
                tables[category].names()
            )));
        }

        let techniques = metadata
            .techniques
            .iter()
            .map(|technique| resolve_technique(technique, &units))
            .collect::<Result<Vec<_>>>()?;

        let mut mappings = Vec::new();
        let mut package_units = Vec::with_capacity(units.len());
        for unit in units {
            let mut binding_counts: CategoryMap<u32> = CategoryMap::default();
            for category in BindingCategory::ALL {
                for binding in &unit.bindings[category] {
                    let index = tables[category].get(&binding.name).ok_or_else(|| {
                        EsfError::Consistency(format!(
                            "{category} '{}' missing from binding table",
                            binding.name
                        ))
                    })?;
                    mappings.push(BindingMapping {
                        binding: index,
                        slot: binding.slot,
                    });
                }
                binding_counts[category] = u32::try_from(unit.bindings[category].len())
                    .map_err(|_| EsfError::Format(format!("too many {category} bindings")))?;
            }
            package_units.push(PackageUnit {
                stage: unit.unit.stage,
                bytecode: unit.bytecode,
                binding_counts,
            });
        }

        let package = Package {
            bindings: tables.map(|table| table.names().to_vec()),
            units: package_units,
            mappings,
            techniques,
            sampler_states: metadata
                .sampler_states
                .iter()
                .map(|s| PackageSamplerState {
                    name: s.name.clone(),
                    state: s.state,
                })
                .collect(),
        };
        package.validate()?;
        Ok(package)
    }
}

fn resolve_technique(technique: &TechniqueDesc, units: &[CompiledUnit]) -> Result<PackageTechnique> {
    let mut indices = [NO_UNIT; ShaderStage::COUNT];
    for (stage, entry_point) in technique.stages() {
        let position = units
            .iter()
            .position(|u| u.unit.stage == stage && u.unit.entry_point == entry_point)
            .ok_or_else(|| {
                EsfError::Consistency(format!(
                    "technique '{}' {stage} entry point '{entry_point}' has no compiled unit",
                    technique.name
                ))
            })?;
        indices[stage.index()] = i32::try_from(position)
            .map_err(|_| EsfError::Format(format!("unit index {position} out of range")))?;
    }
    Ok(PackageTechnique {
        name: technique.name.clone(),
        units: indices,
        raster_state: technique.raster_state,
    })
}

#[cfg(test)]
mod tests {
    use esf_core::RasterState;
    use esf_core::state::CullMode;
    use esf_syntax::SamplerStateDesc;

    use super::*;
    use crate::backend::ReflectedBinding;
    use crate::unit::ShaderUnit;

    fn compiled(stage: ShaderStage, entry: &str, srvs: &[(&str, u32)]) -> CompiledUnit {
        let mut bindings: CategoryMap<Vec<ReflectedBinding>> = CategoryMap::default();
        bindings[BindingCategory::ShaderResourceView] = srvs
            .iter()
            .map(|&(name, slot)| ReflectedBinding::new(name, slot))
            .collect();
        CompiledUnit {
            unit: ShaderUnit::new(stage, entry),
            bytecode: entry.as_bytes().to_vec(),
            bindings,
        }
    }

    fn metadata() -> ShaderMetadata {
        let mut technique = TechniqueDesc::new("Main")
            .with_stage(ShaderStage::Vertex, "vs_main")
            .with_stage(ShaderStage::Pixel, "ps_main");
        technique.raster_state = RasterState {
            cull_mode: CullMode::None as u32,
            ..RasterState::default()
        };
        ShaderMetadata {
            techniques: vec![technique],
            sampler_states: vec![SamplerStateDesc {
                name: "Linear".into(),
                state: Default::default(),
            }],
        }
    }

    fn hints(names: &[&str]) -> BindingTables {
        let mut tables = BindingTables::default();
        tables[BindingCategory::ShaderResourceView] = names.iter().copied().collect();
        tables
    }

    #[test]
    fn builds_mappings_and_techniques() {
        let units = vec![
            compiled(ShaderStage::Vertex, "vs_main", &[("height", 0)]),
            compiled(ShaderStage::Pixel, "ps_main", &[("albedo", 3), ("height", 0)]),
        ];
        let hints = hints(&["height", "albedo"]);
        let package = LayoutBuilder::new(&hints).build(units, &metadata()).unwrap();

        assert_eq!(package.bindings[BindingCategory::ShaderResourceView], ["height", "albedo"]);
        assert_eq!(
            package.unit_mappings(1, BindingCategory::ShaderResourceView),
            [
                BindingMapping { binding: 1, slot: 3 },
                BindingMapping { binding: 0, slot: 0 },
            ]
        );
        assert_eq!(package.techniques[0].units, [0, NO_UNIT, NO_UNIT, NO_UNIT, 1, NO_UNIT]);
        assert_eq!(package.techniques[0].raster_state.cull_mode, CullMode::None as u32);
        assert_eq!(package.sampler_states[0].name, "Linear");
        assert_eq!(package.units[1].bytecode, b"ps_main");
    }

    #[test]
    fn diverging_tables_are_a_consistency_error() {
        let units = vec![
            compiled(ShaderStage::Vertex, "vs_main", &[("albedo", 0)]),
            compiled(ShaderStage::Pixel, "ps_main", &[]),
        ];
        let hints = hints(&["height", "albedo"]);
        let err = LayoutBuilder::new(&hints).build(units, &metadata()).unwrap_err();
        assert!(matches!(err, EsfError::Consistency(_)));
    }

    #[test]
    fn unresolved_entry_point_is_a_consistency_error() {
        let units = vec![compiled(ShaderStage::Vertex, "vs_main", &[])];
        let err = LayoutBuilder::new(&BindingTables::default())
            .build(units, &metadata())
            .unwrap_err();
        assert!(err.to_string().contains("ps_main"));
    }
}
