//! On-disk record layouts
//!
//! A package is a flat sequence of sections, each an array of one record
//! type, in this order:
//!
//! | # | Section | Record | Count |
//! |---|---------|--------|-------|
//! | 1 | header | [`PackageHeader`] | 1 |
//! | 2 | binding names | [`BindingNameRecord`] | sum of category counts |
//! | 3 | bytecode headers | [`BytecodeHeader`] | `num_units` |
//! | 4 | binding mappings | [`BindingMappingRecord`] | sum of per-unit counts |
//! | 5 | techniques | [`TechniqueRecord`] | `num_techniques` |
//! | 6 | sampler states | [`SamplerStateRecord`] | `num_sampler_states` |
//! | 7 | bytecode | raw bytes | sum of `num_bytes` |
//!
//! There is no schema version: any change to a record is a breaking format
//! change for the runtime loader. Records are written in host byte order and
//! only little-endian hosts are supported.

use bytemuck::{Pod, Zeroable};

use esf_core::{NAME_CAPACITY, RasterState, SamplerState};

const _: () = assert!(
    cfg!(target_endian = "little"),
    "shader packages are little-endian"
);

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct PackageHeader {
    pub num_cbuffers: u32,
    pub num_samplers: u32,
    pub num_srvs: u32,
    pub num_uavs: u32,
    pub num_units: u32,
    pub num_techniques: u32,
    pub num_sampler_states: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BindingNameRecord {
    pub name: [u8; NAME_CAPACITY],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BytecodeHeader {
    pub stage: u32,
    /// Byte offset into the bytecode section.
    pub offset: u32,
    pub num_bytes: u32,
    pub num_cbuffers: u32,
    pub num_samplers: u32,
    pub num_srvs: u32,
    pub num_uavs: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BindingMappingRecord {
    /// Index into the category's binding table.
    pub binding: u32,
    /// Slot the unit was compiled against.
    pub slot: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TechniqueRecord {
    pub name: [u8; NAME_CAPACITY],
    /// vs, gs, hs, ds, ps, cs unit indices; -1 when absent.
    pub units: [i32; 6],
    pub raster_state: RasterState,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SamplerStateRecord {
    pub name: [u8; NAME_CAPACITY],
    pub state: SamplerState,
}

pub const HEADER_SIZE: usize = std::mem::size_of::<PackageHeader>();
pub const BINDING_NAME_SIZE: usize = std::mem::size_of::<BindingNameRecord>();
pub const BYTECODE_HEADER_SIZE: usize = std::mem::size_of::<BytecodeHeader>();
pub const BINDING_MAPPING_SIZE: usize = std::mem::size_of::<BindingMappingRecord>();
pub const TECHNIQUE_SIZE: usize = std::mem::size_of::<TechniqueRecord>();
pub const SAMPLER_STATE_SIZE: usize = std::mem::size_of::<SamplerStateRecord>();

const _: () = assert!(HEADER_SIZE == 28);
const _: () = assert!(BINDING_NAME_SIZE == 64);
const _: () = assert!(BYTECODE_HEADER_SIZE == 28);
const _: () = assert!(BINDING_MAPPING_SIZE == 8);
const _: () = assert!(TECHNIQUE_SIZE == 128);
const _: () = assert!(SAMPLER_STATE_SIZE == 116);
