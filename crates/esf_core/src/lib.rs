//! Core types shared by every crate of the ESF shader compiler.
//!
//! - [`errors`]: the [`EsfError`] taxonomy and `Result` alias
//! - [`stage`]: pipeline stages, binding categories, per-category maps
//! - [`binding`]: insertion-ordered binding tables
//! - [`name`]: fixed-capacity on-disk names
//! - [`state`]: fixed-function raster and sampler state values

pub mod binding;
pub mod errors;
pub mod name;
pub mod stage;
pub mod state;

pub use binding::{BindingTable, BindingTables};
pub use errors::{EsfError, Result};
pub use name::{BoundedName, NAME_CAPACITY};
pub use stage::{BindingCategory, CategoryMap, ShaderStage};
pub use state::{RasterState, SamplerState};
