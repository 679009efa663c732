//! Package Reader
//!
//! Parses a serialized package back into a [`Package`]. Used by tooling and
//! tests to verify what the writer produced; it checks every count, offset and
//! name it decodes.

use bytemuck::Pod;

use esf_core::{BindingCategory, BoundedName, CategoryMap, EsfError, Result, ShaderStage};

use crate::format::{
    BindingMappingRecord, BindingNameRecord, BytecodeHeader, PackageHeader, SamplerStateRecord,
    TechniqueRecord,
};
use crate::package::{BindingMapping, Package, PackageSamplerState, PackageTechnique, PackageUnit};

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                EsfError::Format(format!(
                    "truncated package: {what} needs {len} bytes at offset {}, {} available",
                    self.pos,
                    self.bytes.len() - self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn records<T: Pod>(&mut self, count: usize, what: &str) -> Result<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let len = count
            .checked_mul(size)
            .ok_or_else(|| EsfError::Format(format!("{what} count {count} overflows")))?;
        let bytes = self.take(len, what)?;
        Ok(bytes
            .chunks_exact(size)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }
}

fn decode_name(raw: [u8; esf_core::NAME_CAPACITY]) -> Result<String> {
    Ok(BoundedName::from_bytes(raw)?.decode()?.to_owned())
}

/// Parses `bytes` as a complete package. Trailing bytes are an error.
pub fn read_package(bytes: &[u8]) -> Result<Package> {
    let mut cursor = Cursor { bytes, pos: 0 };

    let header = cursor.records::<PackageHeader>(1, "header")?[0];
    let counts = CategoryMap::from_array([
        header.num_cbuffers as usize,
        header.num_samplers as usize,
        header.num_srvs as usize,
        header.num_uavs as usize,
    ]);

    let mut bindings: CategoryMap<Vec<String>> = CategoryMap::default();
    for category in BindingCategory::ALL {
        let records: Vec<BindingNameRecord> = cursor.records(counts[category], "binding names")?;
        bindings[category] = records
            .into_iter()
            .map(|r| decode_name(r.name))
            .collect::<Result<_>>()?;
    }

    let bytecode_headers: Vec<BytecodeHeader> =
        cursor.records(header.num_units as usize, "bytecode headers")?;

    let total_mappings: usize = bytecode_headers
        .iter()
        .map(|h| {
            [h.num_cbuffers, h.num_samplers, h.num_srvs, h.num_uavs]
                .iter()
                .map(|&n| n as usize)
                .sum::<usize>()
        })
        .sum();
    let mappings: Vec<BindingMappingRecord> = cursor.records(total_mappings, "binding mappings")?;

    let techniques: Vec<TechniqueRecord> =
        cursor.records(header.num_techniques as usize, "techniques")?;
    let sampler_states: Vec<SamplerStateRecord> =
        cursor.records(header.num_sampler_states as usize, "sampler states")?;

    let mut expected_offset = 0u32;
    let mut units = Vec::with_capacity(bytecode_headers.len());
    for (index, h) in bytecode_headers.iter().enumerate() {
        if h.offset != expected_offset {
            return Err(EsfError::Format(format!(
                "unit {index} bytecode offset {} is not contiguous (expected {expected_offset})",
                h.offset
            )));
        }
        let stage = ShaderStage::from_u32(h.stage)
            .ok_or_else(|| EsfError::Format(format!("unit {index} has invalid stage {}", h.stage)))?;
        units.push(PackageUnit {
            stage,
            bytecode: cursor.take(h.num_bytes as usize, "bytecode")?.to_vec(),
            binding_counts: CategoryMap::from_array([
                h.num_cbuffers,
                h.num_samplers,
                h.num_srvs,
                h.num_uavs,
            ]),
        });
        expected_offset = expected_offset
            .checked_add(h.num_bytes)
            .ok_or_else(|| EsfError::Format("bytecode region exceeds 4 GiB".into()))?;
    }

    if cursor.pos != bytes.len() {
        return Err(EsfError::Format(format!(
            "{} trailing bytes after bytecode region",
            bytes.len() - cursor.pos
        )));
    }

    let package = Package {
        bindings,
        units,
        mappings: mappings
            .into_iter()
            .map(|m| BindingMapping {
                binding: m.binding,
                slot: m.slot,
            })
            .collect(),
        techniques: techniques
            .into_iter()
            .map(|t| {
                Ok(PackageTechnique {
                    name: decode_name(t.name)?,
                    units: t.units,
                    raster_state: t.raster_state,
                })
            })
            .collect::<Result<_>>()?,
        sampler_states: sampler_states
            .into_iter()
            .map(|s| {
                Ok(PackageSamplerState {
                    name: decode_name(s.name)?,
                    state: s.state,
                })
            })
            .collect::<Result<_>>()?,
    };

    package
        .validate()
        .map_err(|e| EsfError::Format(format!("invalid package: {e}")))?;
    Ok(package)
}
