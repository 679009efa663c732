//! Package Benchmarks
//!
//! Serialization and parsing of a synthetic package with many units, plus
//! the full two-pass compile of the material fixture against the scripted
//! backend.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use esf::compiler::compile_tree;
use esf::package::{BindingMapping, NO_UNIT, Package, PackageTechnique, PackageUnit, package_to_bytes, read_package};
use esf_core::{BindingCategory, CategoryMap, RasterState, ShaderStage};
use esf_dev_utils::fixtures::{material_compiler, material_tree};

fn synthetic_package(units: usize) -> Package {
    let mut package = Package::default();
    for i in 0..16 {
        package.bindings[BindingCategory::ShaderResourceView].push(format!("texture_{i}"));
    }
    for unit in 0..units {
        let mut binding_counts = CategoryMap::default();
        binding_counts[BindingCategory::ShaderResourceView] = 4;
        package.units.push(PackageUnit {
            stage: if unit % 2 == 0 { ShaderStage::Vertex } else { ShaderStage::Pixel },
            bytecode: vec![unit as u8; 2048],
            binding_counts,
        });
        for slot in 0..4 {
            package.mappings.push(BindingMapping {
                binding: ((unit + slot as usize) % 16) as u32,
                slot,
            });
        }
    }
    for pair in 0..units / 2 {
        let mut indices = [NO_UNIT; ShaderStage::COUNT];
        indices[ShaderStage::Vertex.index()] = (pair * 2) as i32;
        indices[ShaderStage::Pixel.index()] = (pair * 2 + 1) as i32;
        package.techniques.push(PackageTechnique {
            name: format!("Technique{pair}"),
            units: indices,
            raster_state: RasterState::default(),
        });
    }
    package
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("package");

    for units in [8usize, 64, 512] {
        let package = synthetic_package(units);
        let bytes = package_to_bytes(&package).unwrap();

        group.bench_with_input(BenchmarkId::new("write", units), &package, |b, package| {
            b.iter(|| black_box(package_to_bytes(black_box(package)).unwrap().len()));
        });
        group.bench_with_input(BenchmarkId::new("read", units), &bytes, |b, bytes| {
            b.iter(|| black_box(read_package(black_box(bytes)).unwrap().units.len()));
        });
    }

    group.finish();
}

fn bench_two_pass(c: &mut Criterion) {
    let tree = material_tree();
    let compiler = material_compiler();

    c.bench_function("two_pass/material", |b| {
        b.iter(|| black_box(compile_tree(&compiler, black_box(&tree), "material.esf").unwrap()));
    });
}

criterion_group!(benches, bench_serialization, bench_two_pass);
criterion_main!(benches);
