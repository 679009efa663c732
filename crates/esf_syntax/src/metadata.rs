//! Metadata Extraction
//!
//! Walks the tree once and collects what the compiler needs to know before
//! any code is generated: techniques (stage entry points plus raster state)
//! and static sampler states.

use rustc_hash::FxHashMap;

use esf_core::state::{AddressMode, ComparisonFunc, CullMode, FillMode, Filter};
use esf_core::{EsfError, RasterState, Result, SamplerState, ShaderStage};

use crate::tree::{Member, MemberValue, Node, StateBlock, SyntaxTree};

/// A technique as declared in source.
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueDesc {
    pub name: String,
    entry_points: [Option<String>; ShaderStage::COUNT],
    pub raster_state: RasterState,
}

impl TechniqueDesc {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            entry_points: Default::default(),
            raster_state: RasterState::default(),
        }
    }

    /// Sets the entry point for `stage`, builder style. An empty name leaves
    /// the stage absent.
    #[must_use]
    pub fn with_stage(mut self, stage: ShaderStage, entry_point: &str) -> Self {
        self.set_entry_point(stage, entry_point);
        self
    }

    pub fn set_entry_point(&mut self, stage: ShaderStage, entry_point: &str) {
        self.entry_points[stage.index()] =
            (!entry_point.is_empty()).then(|| entry_point.to_owned());
    }

    #[inline]
    #[must_use]
    pub fn entry_point(&self, stage: ShaderStage) -> Option<&str> {
        self.entry_points[stage.index()].as_deref()
    }

    /// `(stage, entry point)` for every present stage, in stage order.
    pub fn stages(&self) -> impl Iterator<Item = (ShaderStage, &str)> {
        ShaderStage::ALL
            .into_iter()
            .filter_map(|stage| self.entry_point(stage).map(|name| (stage, name)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerStateDesc {
    pub name: String,
    pub state: SamplerState,
}

/// Everything extracted from a tree ahead of compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderMetadata {
    pub techniques: Vec<TechniqueDesc>,
    pub sampler_states: Vec<SamplerStateDesc>,
}

/// Extracts techniques and sampler states from `tree`.
///
/// Techniques may reference render states declared anywhere in the file.
pub fn extract_metadata(tree: &SyntaxTree) -> Result<ShaderMetadata> {
    let mut render_states: FxHashMap<&str, RasterState> = FxHashMap::default();
    let mut pending: Vec<(TechniqueDesc, Option<&str>)> = Vec::new();
    let mut metadata = ShaderMetadata::default();

    for node in &tree.nodes {
        match node {
            Node::Struct(_) | Node::Function(_) | Node::Resource(_) => {}
            Node::RenderState(block) => {
                let state = parse_raster_state(block)?;
                if render_states.insert(&block.name, state).is_some() {
                    return Err(duplicate("render state", &block.name));
                }
            }
            Node::SamplerState(block) => {
                if metadata.sampler_states.iter().any(|s| s.name == block.name) {
                    return Err(duplicate("sampler state", &block.name));
                }
                metadata.sampler_states.push(SamplerStateDesc {
                    name: block.name.clone(),
                    state: parse_sampler_state(block)?,
                });
            }
            Node::Technique(block) => {
                if pending.iter().any(|(t, _)| t.name == block.name) {
                    return Err(duplicate("technique", &block.name));
                }
                pending.push(parse_technique(block)?);
            }
        }
    }

    for (mut technique, render_state) in pending {
        if let Some(name) = render_state {
            technique.raster_state = *render_states.get(name).ok_or_else(|| {
                EsfError::Parse(format!(
                    "technique '{}' references unknown render state '{name}'",
                    technique.name
                ))
            })?;
        }
        metadata.techniques.push(technique);
    }

    log::debug!(
        "Extracted {} technique(s), {} sampler state(s)",
        metadata.techniques.len(),
        metadata.sampler_states.len()
    );
    Ok(metadata)
}

fn duplicate(what: &str, name: &str) -> EsfError {
    EsfError::Parse(format!("duplicate {what} '{name}'"))
}

// ============================================================================
// Block decoding
// ============================================================================

fn parse_technique(block: &StateBlock) -> Result<(TechniqueDesc, Option<&str>)> {
    let mut technique = TechniqueDesc::new(&block.name);
    let mut render_state = None;

    for member in &block.members {
        if let Some(stage) = ShaderStage::from_technique_key(&member.key) {
            technique.set_entry_point(stage, ident(block, member)?);
        } else if member.key == "RenderState" {
            render_state = Some(ident(block, member)?);
        } else {
            return Err(unknown_key(block, member));
        }
    }
    Ok((technique, render_state))
}

fn parse_raster_state(block: &StateBlock) -> Result<RasterState> {
    let mut state = RasterState::default();
    for member in &block.members {
        match member.key.to_ascii_lowercase().as_str() {
            "fillmode" => state.fill_mode = enumerant(block, member, FillMode::from_ident)? as u32,
            "cullmode" => state.cull_mode = enumerant(block, member, CullMode::from_ident)? as u32,
            "frontcounterclockwise" => state.front_counter_clockwise = flag(block, member)?,
            "depthbias" => state.depth_bias = int(block, member)?,
            "depthbiasclamp" => state.depth_bias_clamp = float(block, member)?,
            "slopescaleddepthbias" => state.slope_scaled_depth_bias = float(block, member)?,
            "depthclipenable" => state.depth_clip_enable = flag(block, member)?,
            "scissorenable" => state.scissor_enable = flag(block, member)?,
            "multisampleenable" => state.multisample_enable = flag(block, member)?,
            "antialiasedlineenable" => state.antialiased_line_enable = flag(block, member)?,
            _ => return Err(unknown_key(block, member)),
        }
    }
    Ok(state)
}

fn parse_sampler_state(block: &StateBlock) -> Result<SamplerState> {
    let mut state = SamplerState::default();
    for member in &block.members {
        match member.key.to_ascii_lowercase().as_str() {
            "filter" => state.filter = enumerant(block, member, Filter::from_ident)? as u32,
            "addressu" => state.address_u = enumerant(block, member, AddressMode::from_ident)? as u32,
            "addressv" => state.address_v = enumerant(block, member, AddressMode::from_ident)? as u32,
            "addressw" => state.address_w = enumerant(block, member, AddressMode::from_ident)? as u32,
            "miplodbias" => state.mip_lod_bias = float(block, member)?,
            "maxanisotropy" => {
                state.max_anisotropy = u32::try_from(int(block, member)?)
                    .map_err(|_| invalid(block, member, "a non-negative integer"))?;
            }
            "comparisonfunc" => {
                state.comparison_func = enumerant(block, member, ComparisonFunc::from_ident)? as u32;
            }
            "bordercolor" => state.border_color = vec4(block, member)?,
            "minlod" => state.min_lod = float(block, member)?,
            "maxlod" => state.max_lod = float(block, member)?,
            _ => return Err(unknown_key(block, member)),
        }
    }
    Ok(state)
}

// ============================================================================
// Member value helpers
// ============================================================================

fn unknown_key(block: &StateBlock, member: &Member) -> EsfError {
    EsfError::Parse(format!("'{}': unknown member '{}'", block.name, member.key))
}

fn invalid(block: &StateBlock, member: &Member, expected: &str) -> EsfError {
    EsfError::Parse(format!(
        "'{}': member '{}' expects {expected}, found {:?}",
        block.name, member.key, member.value
    ))
}

fn ident<'a>(block: &StateBlock, member: &'a Member) -> Result<&'a str> {
    match &member.value {
        MemberValue::Ident(name) => Ok(name),
        _ => Err(invalid(block, member, "an identifier")),
    }
}

fn enumerant<T>(block: &StateBlock, member: &Member, parse: fn(&str) -> Option<T>) -> Result<T> {
    let name = ident(block, member)?;
    parse(name).ok_or_else(|| invalid(block, member, "a known enumerant"))
}

fn flag(block: &StateBlock, member: &Member) -> Result<u32> {
    match member.value {
        MemberValue::Bool(value) => Ok(u32::from(value)),
        MemberValue::Int(value @ (0 | 1)) => Ok(value as u32),
        _ => Err(invalid(block, member, "a boolean")),
    }
}

fn int(block: &StateBlock, member: &Member) -> Result<i32> {
    match member.value {
        MemberValue::Int(value) => {
            i32::try_from(value).map_err(|_| invalid(block, member, "a 32-bit integer"))
        }
        _ => Err(invalid(block, member, "an integer")),
    }
}

fn float(block: &StateBlock, member: &Member) -> Result<f32> {
    match member.value {
        MemberValue::Float(value) => Ok(value as f32),
        MemberValue::Int(value) => Ok(value as f32),
        _ => Err(invalid(block, member, "a number")),
    }
}

fn vec4(block: &StateBlock, member: &Member) -> Result<[f32; 4]> {
    match &member.value {
        MemberValue::Vector(values) if values.len() == 4 => {
            Ok([values[0] as f32, values[1] as f32, values[2] as f32, values[3] as f32])
        }
        _ => Err(invalid(block, member, "a 4-component vector")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ResourceKind;

    fn tree() -> SyntaxTree {
        SyntaxTree::new()
            .with(Node::resource("camera", ResourceKind::constant_buffer("Camera")))
            .with(Node::Technique(
                StateBlock::new("Shadow")
                    .with("VertexShader", "vs_shadow")
                    .with("PixelShader", "")
                    .with("RenderState", "RS_NoCull"),
            ))
            .with(Node::RenderState(
                StateBlock::new("RS_NoCull")
                    .with("CullMode", "NONE")
                    .with("DepthBias", 16_i64)
                    .with("ScissorEnable", true),
            ))
            .with(Node::SamplerState(
                StateBlock::new("SS_Aniso")
                    .with("Filter", "ANISOTROPIC")
                    .with("AddressU", "WRAP")
                    .with("MaxAnisotropy", 8_i64)
                    .with("BorderColor", [0.0, 0.0, 0.0, 1.0]),
            ))
    }

    #[test]
    fn extracts_techniques_and_states() {
        let metadata = extract_metadata(&tree()).unwrap();

        assert_eq!(metadata.techniques.len(), 1);
        let technique = &metadata.techniques[0];
        assert_eq!(technique.name, "Shadow");
        assert_eq!(technique.entry_point(ShaderStage::Vertex), Some("vs_shadow"));
        assert_eq!(technique.entry_point(ShaderStage::Pixel), None);
        assert_eq!(technique.raster_state.cull_mode, CullMode::None as u32);
        assert_eq!(technique.raster_state.depth_bias, 16);
        assert_eq!(technique.raster_state.scissor_enable, 1);

        assert_eq!(metadata.sampler_states.len(), 1);
        let sampler = &metadata.sampler_states[0];
        assert_eq!(sampler.state.filter, Filter::Anisotropic as u32);
        assert_eq!(sampler.state.address_u, AddressMode::Wrap as u32);
        assert_eq!(sampler.state.address_v, AddressMode::Clamp as u32);
        assert_eq!(sampler.state.max_anisotropy, 8);
        assert_eq!(sampler.state.border_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn unknown_render_state_is_parse_error() {
        let tree = SyntaxTree::new().with(Node::Technique(
            StateBlock::new("Main")
                .with("VertexShader", "vs")
                .with("RenderState", "Missing"),
        ));
        assert!(matches!(extract_metadata(&tree), Err(EsfError::Parse(_))));
    }

    #[test]
    fn unknown_member_and_enumerant_are_rejected() {
        let bad_key = SyntaxTree::new().with(Node::Technique(
            StateBlock::new("Main").with("FragmentShader", "ps"),
        ));
        assert!(matches!(extract_metadata(&bad_key), Err(EsfError::Parse(_))));

        let bad_value = SyntaxTree::new().with(Node::SamplerState(
            StateBlock::new("S").with("AddressU", "REPEAT"),
        ));
        assert!(matches!(extract_metadata(&bad_value), Err(EsfError::Parse(_))));
    }

    #[test]
    fn duplicate_techniques_are_rejected() {
        let tree = SyntaxTree::new()
            .with(Node::Technique(StateBlock::new("Main").with("VertexShader", "a")))
            .with(Node::Technique(StateBlock::new("Main").with("VertexShader", "b")));
        assert!(matches!(extract_metadata(&tree), Err(EsfError::Parse(_))));
    }

    #[test]
    fn stages_iterates_present_stages_in_order() {
        let technique = TechniqueDesc::new("T")
            .with_stage(ShaderStage::Pixel, "ps")
            .with_stage(ShaderStage::Vertex, "vs");
        let stages: Vec<_> = technique.stages().collect();
        assert_eq!(stages, vec![(ShaderStage::Vertex, "vs"), (ShaderStage::Pixel, "ps")]);
    }
}
