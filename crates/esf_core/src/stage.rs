//! Pipeline stages and binding categories
//!
//! Both enums have a fixed declaration order that doubles as their canonical
//! iteration order and as their on-disk value. Reordering variants is a
//! breaking change to the package format.

use std::fmt;
use std::ops::{Index, IndexMut};

// ============================================================================
// ShaderStage
// ============================================================================

/// Programmable pipeline stage a compiled unit targets.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex = 0,
    Geometry = 1,
    /// Tessellation control.
    Hull = 2,
    /// Tessellation evaluation.
    Domain = 3,
    /// Fragment.
    Pixel = 4,
    Compute = 5,
}

impl ShaderStage {
    pub const COUNT: usize = 6;

    /// All stages in canonical order.
    pub const ALL: [ShaderStage; Self::COUNT] = [
        Self::Vertex,
        Self::Geometry,
        Self::Hull,
        Self::Domain,
        Self::Pixel,
        Self::Compute,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Technique member key that selects this stage's entry point.
    #[must_use]
    pub const fn technique_key(self) -> &'static str {
        match self {
            Self::Vertex => "VertexShader",
            Self::Geometry => "GeometryShader",
            Self::Hull => "HullShader",
            Self::Domain => "DomainShader",
            Self::Pixel => "PixelShader",
            Self::Compute => "ComputeShader",
        }
    }

    #[must_use]
    pub fn from_technique_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.technique_key() == key)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Geometry => "geometry",
            Self::Hull => "hull",
            Self::Domain => "domain",
            Self::Pixel => "pixel",
            Self::Compute => "compute",
        };
        f.write_str(name)
    }
}

// ============================================================================
// BindingCategory
// ============================================================================

/// Resource class a binding belongs to. Each category owns an independent,
/// 0-based slot space.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingCategory {
    ConstantBuffer = 0,
    Sampler = 1,
    ShaderResourceView = 2,
    UnorderedAccessView = 3,
}

impl BindingCategory {
    pub const COUNT: usize = 4;

    /// All categories in canonical order.
    pub const ALL: [BindingCategory; Self::COUNT] = [
        Self::ConstantBuffer,
        Self::Sampler,
        Self::ShaderResourceView,
        Self::UnorderedAccessView,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConstantBuffer => "cbuffer",
            Self::Sampler => "sampler",
            Self::ShaderResourceView => "srv",
            Self::UnorderedAccessView => "uav",
        };
        f.write_str(name)
    }
}

// ============================================================================
// CategoryMap
// ============================================================================

/// Fixed-size map with one value per [`BindingCategory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap<T>([T; BindingCategory::COUNT]);

impl<T> CategoryMap<T> {
    #[must_use]
    pub const fn from_array(values: [T; BindingCategory::COUNT]) -> Self {
        Self(values)
    }

    /// Iterates `(category, value)` pairs in canonical category order.
    pub fn iter(&self) -> impl Iterator<Item = (BindingCategory, &T)> {
        BindingCategory::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BindingCategory, &mut T)> {
        BindingCategory::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> CategoryMap<U> {
        CategoryMap([f(&self.0[0]), f(&self.0[1]), f(&self.0[2]), f(&self.0[3])])
    }
}

impl<T> Index<BindingCategory> for CategoryMap<T> {
    type Output = T;

    #[inline]
    fn index(&self, category: BindingCategory) -> &T {
        &self.0[category.index()]
    }
}

impl<T> IndexMut<BindingCategory> for CategoryMap<T> {
    #[inline]
    fn index_mut(&mut self, category: BindingCategory) -> &mut T {
        &mut self.0[category.index()]
    }
}
