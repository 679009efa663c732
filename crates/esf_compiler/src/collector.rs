//! Binding Collector
//!
//! Folds the reflection of every compiled unit into one insertion-ordered
//! table per category. A name's index is fixed the first time it is seen;
//! later units only append names that are new.

use esf_core::{BindingCategory, BindingTables};

use crate::unit::CompiledUnit;

/// Builds the binding tables for `units`, visiting them in the given order.
#[must_use]
pub fn collect_bindings(units: &[CompiledUnit]) -> BindingTables {
    let mut tables = BindingTables::default();
    for unit in units {
        for category in BindingCategory::ALL {
            for binding in &unit.bindings[category] {
                tables[category].insert(&binding.name);
            }
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use esf_core::{CategoryMap, ShaderStage};

    use super::*;
    use crate::backend::ReflectedBinding;
    use crate::unit::ShaderUnit;

    fn unit(entry: &str, srvs: &[&str], cbuffers: &[&str]) -> CompiledUnit {
        let mut bindings: CategoryMap<Vec<ReflectedBinding>> = CategoryMap::default();
        for (slot, name) in srvs.iter().enumerate() {
            bindings[BindingCategory::ShaderResourceView].push(ReflectedBinding::new(name, slot as u32));
        }
        for (slot, name) in cbuffers.iter().enumerate() {
            bindings[BindingCategory::ConstantBuffer].push(ReflectedBinding::new(name, slot as u32));
        }
        CompiledUnit {
            unit: ShaderUnit::new(ShaderStage::Pixel, entry),
            bytecode: Vec::new(),
            bindings,
        }
    }

    #[test]
    fn first_seen_order_across_units() {
        let units = [
            unit("ps_a", &["b", "a"], &["globals"]),
            unit("ps_b", &["a", "c"], &["globals", "object"]),
        ];
        let tables = collect_bindings(&units);

        assert_eq!(tables[BindingCategory::ShaderResourceView].names(), ["b", "a", "c"]);
        assert_eq!(tables[BindingCategory::ConstantBuffer].names(), ["globals", "object"]);
        assert!(tables[BindingCategory::Sampler].is_empty());
    }

    #[test]
    fn no_units_gives_empty_tables() {
        assert_eq!(collect_bindings(&[]).total_len(), 0);
    }
}
