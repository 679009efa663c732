//! Fixed-function state values
//!
//! [`RasterState`] and [`SamplerState`] are stored in packages as opaque,
//! plain-old-data blobs. Enumerant values follow the D3D11 encoding so a
//! runtime can hand them to the driver without translation.

use bytemuck::{Pod, Zeroable};

fn normalize_ident(ident: &str) -> String {
    ident
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! state_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Matches a source identifier, ignoring case and underscores
            /// (`MIN_MAG_MIP_LINEAR` and `MinMagMipLinear` are equivalent).
            #[must_use]
            pub fn from_ident(ident: &str) -> Option<Self> {
                let wanted = normalize_ident(ident);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_ident(v.name()) == wanted)
            }
        }
    };
}

state_enum!(
    /// Polygon fill mode.
    FillMode {
        Wireframe = 2,
        Solid = 3,
    }
);

state_enum!(
    /// Face culling mode.
    CullMode {
        None = 1,
        Front = 2,
        Back = 3,
    }
);

state_enum!(
    /// Texture filtering mode.
    Filter {
        MinMagMipPoint = 0x00,
        MinMagPointMipLinear = 0x01,
        MinPointMagLinearMipPoint = 0x04,
        MinPointMagMipLinear = 0x05,
        MinLinearMagMipPoint = 0x10,
        MinLinearMagPointMipLinear = 0x11,
        MinMagLinearMipPoint = 0x14,
        MinMagMipLinear = 0x15,
        Anisotropic = 0x55,
        ComparisonMinMagMipPoint = 0x80,
        ComparisonMinMagMipLinear = 0x95,
        ComparisonAnisotropic = 0xd5,
    }
);

state_enum!(
    /// Texture coordinate addressing mode.
    AddressMode {
        Wrap = 1,
        Mirror = 2,
        Clamp = 3,
        Border = 4,
        MirrorOnce = 5,
    }
);

state_enum!(
    /// Depth / sampler comparison function.
    ComparisonFunc {
        Never = 1,
        Less = 2,
        Equal = 3,
        LessEqual = 4,
        Greater = 5,
        NotEqual = 6,
        GreaterEqual = 7,
        Always = 8,
    }
);

// ============================================================================
// RasterState
// ============================================================================

/// Rasterizer state attached to a technique.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RasterState {
    pub fill_mode: u32,
    pub cull_mode: u32,
    pub front_counter_clockwise: u32,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: u32,
    pub scissor_enable: u32,
    pub multisample_enable: u32,
    pub antialiased_line_enable: u32,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid as u32,
            cull_mode: CullMode::Back as u32,
            front_counter_clockwise: 0,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: 1,
            scissor_enable: 0,
            multisample_enable: 0,
            antialiased_line_enable: 0,
        }
    }
}

// ============================================================================
// SamplerState
// ============================================================================

/// Static sampler state declared by a `SamplerState` block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SamplerState {
    pub filter: u32,
    pub address_u: u32,
    pub address_v: u32,
    pub address_w: u32,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison_func: u32,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            filter: Filter::MinMagMipLinear as u32,
            address_u: AddressMode::Clamp as u32,
            address_v: AddressMode::Clamp as u32,
            address_w: AddressMode::Clamp as u32,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            comparison_func: ComparisonFunc::Never as u32,
            border_color: [1.0; 4],
            min_lod: -f32::MAX,
            max_lod: f32::MAX,
        }
    }
}

const _: () = assert!(std::mem::size_of::<RasterState>() == 40);
const _: () = assert!(std::mem::size_of::<SamplerState>() == 52);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idents_ignore_case_and_underscores() {
        assert_eq!(Filter::from_ident("MIN_MAG_MIP_LINEAR"), Some(Filter::MinMagMipLinear));
        assert_eq!(Filter::from_ident("anisotropic"), Some(Filter::Anisotropic));
        assert_eq!(AddressMode::from_ident("MIRROR_ONCE"), Some(AddressMode::MirrorOnce));
        assert_eq!(CullMode::from_ident("none"), Some(CullMode::None));
        assert_eq!(FillMode::from_ident("Points"), None);
    }

    #[test]
    fn defaults_match_fixed_function_defaults() {
        let rs = RasterState::default();
        assert_eq!(rs.fill_mode, 3);
        assert_eq!(rs.cull_mode, 3);
        assert_eq!(rs.depth_clip_enable, 1);

        let ss = SamplerState::default();
        assert_eq!(ss.filter, 0x15);
        assert_eq!(ss.address_u, 3);
        assert_eq!(ss.max_lod, f32::MAX);
    }
}
