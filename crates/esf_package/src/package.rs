//! In-memory shader package
//!
//! [`Package`] is the fully resolved result of a conversion. It is built once
//! by the layout stage, handed to the writer, and dropped.

use esf_core::{BindingCategory, CategoryMap, EsfError, RasterState, Result, SamplerState, ShaderStage};

/// Sentinel stored in technique records for an absent stage.
pub const NO_UNIT: i32 = -1;

/// One compiled unit ready for packaging.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageUnit {
    pub stage: ShaderStage,
    pub bytecode: Vec<u8>,
    /// Number of mappings this unit contributes, per category.
    pub binding_counts: CategoryMap<u32>,
}

impl PackageUnit {
    #[must_use]
    pub fn total_bindings(&self) -> usize {
        self.binding_counts.values().map(|&n| n as usize).sum()
    }
}

/// `(table index, unit-local slot)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingMapping {
    pub binding: u32,
    pub slot: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageTechnique {
    pub name: String,
    /// Unit index per stage, [`NO_UNIT`] when absent.
    pub units: [i32; ShaderStage::COUNT],
    pub raster_state: RasterState,
}

impl PackageTechnique {
    #[must_use]
    pub fn unit(&self, stage: ShaderStage) -> Option<usize> {
        usize::try_from(self.units[stage.index()]).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageSamplerState {
    pub name: String,
    pub state: SamplerState,
}

/// Root aggregate written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    /// Binding names per category, in table order.
    pub bindings: CategoryMap<Vec<String>>,
    /// Compiled units in compile order.
    pub units: Vec<PackageUnit>,
    /// Flattened mappings: unit by unit, category by category.
    pub mappings: Vec<BindingMapping>,
    pub techniques: Vec<PackageTechnique>,
    pub sampler_states: Vec<PackageSamplerState>,
}

impl Package {
    /// Total size of the bytecode region.
    #[must_use]
    pub fn bytecode_len(&self) -> usize {
        self.units.iter().map(|u| u.bytecode.len()).sum()
    }

    /// Mappings of unit `unit_index` for `category`.
    #[must_use]
    pub fn unit_mappings(&self, unit_index: usize, category: BindingCategory) -> &[BindingMapping] {
        let preceding: usize = self.units[..unit_index]
            .iter()
            .map(PackageUnit::total_bindings)
            .sum();
        let counts = &self.units[unit_index].binding_counts;
        let start = preceding
            + BindingCategory::ALL[..category.index()]
                .iter()
                .map(|&c| counts[c] as usize)
                .sum::<usize>();
        &self.mappings[start..start + counts[category] as usize]
    }

    /// Checks the cross references between tables.
    pub fn validate(&self) -> Result<()> {
        let expected: usize = self.units.iter().map(PackageUnit::total_bindings).sum();
        if expected != self.mappings.len() {
            return Err(EsfError::Consistency(format!(
                "units declare {expected} binding mappings, package holds {}",
                self.mappings.len()
            )));
        }

        for unit_index in 0..self.units.len() {
            for category in BindingCategory::ALL {
                let table_len = self.bindings[category].len();
                if let Some(bad) = self
                    .unit_mappings(unit_index, category)
                    .iter()
                    .find(|m| m.binding as usize >= table_len)
                {
                    return Err(EsfError::Consistency(format!(
                        "unit {unit_index} maps {category} index {} beyond table of {table_len}",
                        bad.binding
                    )));
                }
            }
        }

        for technique in &self.techniques {
            for (stage, &unit) in ShaderStage::ALL.iter().zip(&technique.units) {
                if unit != NO_UNIT && usize::try_from(unit).ok().is_none_or(|u| u >= self.units.len()) {
                    return Err(EsfError::Consistency(format!(
                        "technique '{}' {stage} references missing unit {unit}",
                        technique.name
                    )));
                }
            }
            if technique.unit(ShaderStage::Vertex).is_none()
                && technique.unit(ShaderStage::Compute).is_none()
            {
                return Err(EsfError::Consistency(format!(
                    "technique '{}' has neither a vertex nor a compute unit",
                    technique.name
                )));
            }
        }
        Ok(())
    }
}
