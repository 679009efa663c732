//! Binary shader package: in-memory model, on-disk records, writer and reader.

pub mod format;
pub mod package;
pub mod reader;
pub mod writer;

pub use package::{BindingMapping, NO_UNIT, Package, PackageSamplerState, PackageTechnique, PackageUnit};
pub use reader::read_package;
pub use writer::{package_to_bytes, write_package};
