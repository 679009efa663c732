//! Package Writer
//!
//! Every record is encoded up front, so a name that does not fit or a
//! bytecode region that overflows the 32-bit offsets fails before the first
//! byte reaches the output.

use std::io::Write;

use esf_core::{BindingCategory, BoundedName, EsfError, Result};

use crate::format::{
    BindingMappingRecord, BindingNameRecord, BytecodeHeader, HEADER_SIZE, PackageHeader,
    SamplerStateRecord, TechniqueRecord,
};
use crate::package::Package;

struct EncodedPackage {
    header: PackageHeader,
    binding_names: Vec<BindingNameRecord>,
    bytecode_headers: Vec<BytecodeHeader>,
    mappings: Vec<BindingMappingRecord>,
    techniques: Vec<TechniqueRecord>,
    sampler_states: Vec<SamplerStateRecord>,
}

fn count(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| EsfError::Format(format!("too many {what}: {len}")))
}

fn encode(package: &Package) -> Result<EncodedPackage> {
    package.validate()?;

    let header = PackageHeader {
        num_cbuffers: count(package.bindings[BindingCategory::ConstantBuffer].len(), "constant buffers")?,
        num_samplers: count(package.bindings[BindingCategory::Sampler].len(), "samplers")?,
        num_srvs: count(package.bindings[BindingCategory::ShaderResourceView].len(), "shader resource views")?,
        num_uavs: count(package.bindings[BindingCategory::UnorderedAccessView].len(), "unordered access views")?,
        num_units: count(package.units.len(), "units")?,
        num_techniques: count(package.techniques.len(), "techniques")?,
        num_sampler_states: count(package.sampler_states.len(), "sampler states")?,
    };

    let binding_names = package
        .bindings
        .values()
        .flatten()
        .map(|name| {
            Ok(BindingNameRecord {
                name: BoundedName::new(name)?.to_bytes(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut offset: u32 = 0;
    let mut bytecode_headers = Vec::with_capacity(package.units.len());
    for unit in &package.units {
        let num_bytes = count(unit.bytecode.len(), "bytecode bytes")?;
        let counts = &unit.binding_counts;
        bytecode_headers.push(BytecodeHeader {
            stage: unit.stage as u32,
            offset,
            num_bytes,
            num_cbuffers: counts[BindingCategory::ConstantBuffer],
            num_samplers: counts[BindingCategory::Sampler],
            num_srvs: counts[BindingCategory::ShaderResourceView],
            num_uavs: counts[BindingCategory::UnorderedAccessView],
        });
        offset = offset
            .checked_add(num_bytes)
            .ok_or_else(|| EsfError::Format("bytecode region exceeds 4 GiB".into()))?;
    }

    let mappings = package
        .mappings
        .iter()
        .map(|m| BindingMappingRecord {
            binding: m.binding,
            slot: m.slot,
        })
        .collect();

    let techniques = package
        .techniques
        .iter()
        .map(|t| {
            Ok(TechniqueRecord {
                name: BoundedName::new(&t.name)?.to_bytes(),
                units: t.units,
                raster_state: t.raster_state,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let sampler_states = package
        .sampler_states
        .iter()
        .map(|s| {
            Ok(SamplerStateRecord {
                name: BoundedName::new(&s.name)?.to_bytes(),
                state: s.state,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EncodedPackage {
        header,
        binding_names,
        bytecode_headers,
        mappings,
        techniques,
        sampler_states,
    })
}

/// Serializes `package` into `writer`.
pub fn write_package<W: Write>(package: &Package, writer: &mut W) -> Result<()> {
    let encoded = encode(package)?;

    writer.write_all(bytemuck::bytes_of(&encoded.header))?;
    writer.write_all(bytemuck::cast_slice(&encoded.binding_names))?;
    writer.write_all(bytemuck::cast_slice(&encoded.bytecode_headers))?;
    writer.write_all(bytemuck::cast_slice(&encoded.mappings))?;
    writer.write_all(bytemuck::cast_slice(&encoded.techniques))?;
    writer.write_all(bytemuck::cast_slice(&encoded.sampler_states))?;
    for unit in &package.units {
        writer.write_all(&unit.bytecode)?;
    }
    Ok(())
}

/// Serializes `package` into a freshly allocated buffer.
pub fn package_to_bytes(package: &Package) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(HEADER_SIZE + package.bytecode_len());
    write_package(package, &mut bytes)?;
    log::debug!(
        "Serialized package: {} unit(s), {} technique(s), {} bytes",
        package.units.len(),
        package.techniques.len(),
        bytes.len()
    );
    Ok(bytes)
}
