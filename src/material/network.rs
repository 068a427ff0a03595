//! Shader network planning.
//!
//! A subgraph is first planned as plain data ([`ShaderNetwork`]) and then
//! applied to the scene in one pass. Planning is pure: the same record,
//! texture folder and slot layout always give the same network.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scene::{
    ConnectorConfig, DisplacementConfig, ImageConfig, NodeConfig, NodeKind, Parm, TexcoordConfig,
};
use crate::util::{Error, Result};

use super::{find_texture, ChannelCategory, MaterialRecord, ShaderRole, TextureFolder};

/// Node names inside a material subgraph.
pub const SURFACE_OUTPUT: &str = "surface_output";
pub const DISPLACEMENT_OUTPUT: &str = "displacement_output";
pub const DISPLACEMENT_SHADER: &str = "mtlxdisplacement";
pub const SURFACE_SHADER: &str = "mtlx_material";
pub const TEXCOORD: &str = "mtlxtexcoord";

/// Shader node in a planned network.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderNode {
    /// Node name inside the subgraph.
    pub name: String,
    /// Host node kind.
    pub kind: NodeKind,
    /// Parameters to set after creation.
    pub parameters: Vec<Parm>,
    /// Input connections (input index, source node name) in wiring order.
    pub connections: Vec<(usize, String)>,
}

impl ShaderNode {
    /// Create a new shader node.
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parameters: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Create a node from a typed configuration.
    pub fn configured<C: NodeConfig>(name: &str, config: &C) -> Self {
        let mut node = Self::new(name, config.kind());
        node.parameters = config.to_parms();
        node
    }

    /// Get a parameter by name.
    pub fn param(&self, name: &str) -> Option<&Parm> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Connect an input to another node's output.
    pub fn connect(&mut self, index: usize, source: &str) {
        self.connections.retain(|(i, _)| *i != index);
        self.connections.push((index, source.to_string()));
    }

    /// Source node feeding an input.
    pub fn source(&self, index: usize) -> Option<&str> {
        self.connections
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, s)| s.as_str())
    }

    /// Check if an input is connected.
    pub fn is_connected(&self, index: usize) -> bool {
        self.source(index).is_some()
    }
}

/// Texture bound to one channel slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelBinding {
    pub channel: ChannelCategory,
    /// Image node feeding the slot.
    pub node: String,
    /// Selected texture filename, if any file fed this channel.
    pub texture: Option<String>,
    /// Absolute path written to the image node; empty when unresolved.
    pub file: String,
}

impl ChannelBinding {
    /// Whether the slot received a real file.
    pub fn is_resolved(&self) -> bool {
        !self.file.is_empty()
    }
}

/// Shader network containing interconnected shader nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderNetwork {
    /// Nodes in creation order.
    pub nodes: Vec<ShaderNode>,
    /// Terminal node names for each output type.
    pub terminals: BTreeMap<String, String>,
    /// One binding per channel.
    pub bindings: Vec<ChannelBinding>,
}

impl ShaderNetwork {
    /// Create an empty shader network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the network.
    pub fn add_node(&mut self, node: ShaderNode) {
        self.nodes.push(node);
    }

    /// Get a node by name.
    pub fn node(&self, name: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Set a terminal node for an output type.
    pub fn set_terminal(&mut self, output_type: &str, node_name: &str) {
        self.terminals
            .insert(output_type.to_string(), node_name.to_string());
    }

    /// Get the terminal node for an output type.
    pub fn terminal(&self, output_type: &str) -> Option<&str> {
        self.terminals.get(output_type).map(|s| s.as_str())
    }

    /// Binding of a channel.
    pub fn binding(&self, channel: ChannelCategory) -> Option<&ChannelBinding> {
        self.bindings.iter().find(|b| b.channel == channel)
    }

    /// Get the surface shader node if defined.
    pub fn surface_shader(&self) -> Option<&ShaderNode> {
        self.terminal("surface").and_then(|name| self.node(name))
    }

    /// Get the displacement shader node if defined.
    pub fn displacement_shader(&self) -> Option<&ShaderNode> {
        self.terminal("displacement").and_then(|name| self.node(name))
    }

    /// Check if the network is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ============================================================================
// Slot layout
// ============================================================================

/// Input ordering of the shading nodes, as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotLayout {
    surface: Vec<String>,
    displacement: Vec<String>,
    image: Vec<String>,
}

impl SlotLayout {
    /// Layout from probed input names.
    pub fn new(surface: Vec<String>, displacement: Vec<String>, image: Vec<String>) -> Self {
        Self {
            surface,
            displacement,
            image,
        }
    }

    /// Layout of the MaterialX stdlib node definitions.
    pub fn stdlib() -> Self {
        let names = |def: &mtlx_stdlib::NodeDef| def.input_names().map(str::to_string).collect();
        Self::new(
            names(&mtlx_stdlib::STANDARD_SURFACE),
            names(&mtlx_stdlib::DISPLACEMENT),
            names(&mtlx_stdlib::IMAGE),
        )
    }

    fn index(inputs: &[String], node: &str, input: &str) -> Result<usize> {
        inputs
            .iter()
            .position(|n| n == input)
            .ok_or_else(|| Error::InputNotFound {
                node: node.to_string(),
                input: input.to_string(),
            })
    }

    /// Shader role and input index a channel binds into.
    pub fn slot(&self, channel: ChannelCategory) -> Result<(ShaderRole, usize)> {
        let (role, input) = channel.slot();
        let (inputs, kind) = match role {
            ShaderRole::Surface => (&self.surface, NodeKind::MtlxStandardSurface),
            ShaderRole::Displacement => (&self.displacement, NodeKind::MtlxDisplacement),
        };
        Ok((role, Self::index(inputs, kind.as_str(), input)?))
    }

    /// Input index of the image node's texture coordinate.
    pub fn texcoord_index(&self) -> Result<usize> {
        Self::index(&self.image, NodeKind::MtlxImage.as_str(), "texcoord")
    }
}

// ============================================================================
// Planning
// ============================================================================

/// Plan the subgraph of one material.
///
/// Every channel gets one image node. The first correlated file feeding the
/// channel is bound; a channel without a file, or whose file cannot be
/// resolved to an absolute path, gets an empty path.
pub fn plan_subgraph(
    record: &MaterialRecord,
    folder: &TextureFolder,
    layout: &SlotLayout,
    displacement: &DisplacementConfig,
) -> Result<ShaderNetwork> {
    let mut network = ShaderNetwork::new();

    let mut surface_output = ShaderNode::configured(SURFACE_OUTPUT, &ConnectorConfig::surface());
    let mut displacement_output =
        ShaderNode::configured(DISPLACEMENT_OUTPUT, &ConnectorConfig::displacement());
    // The displacement variant follows the type of the channel wired into it
    let displacement = ChannelCategory::ALL
        .iter()
        .find(|channel| channel.slot().0 == ShaderRole::Displacement)
        .map_or(*displacement, |channel| displacement.with_signature(channel.signature()));
    let mut displacement_shader = ShaderNode::configured(DISPLACEMENT_SHADER, &displacement);
    let mut surface_shader = ShaderNode::new(SURFACE_SHADER, NodeKind::MtlxStandardSurface);
    let texcoord = ShaderNode::configured(TEXCOORD, &TexcoordConfig::default());

    surface_output.connect(0, SURFACE_SHADER);
    displacement_output.connect(0, DISPLACEMENT_SHADER);

    let texcoord_index = layout.texcoord_index()?;
    let mut images = Vec::with_capacity(ChannelCategory::ALL.len());

    for channel in ChannelCategory::ALL {
        let texture = find_texture(&record.textures, &record.identifier, channel);
        let file = match texture {
            Some(name) => folder.resolve(name).unwrap_or_else(|| {
                tracing::warn!(
                    material = %record.identifier,
                    texture = name,
                    "cannot resolve texture path"
                );
                String::new()
            }),
            None => String::new(),
        };

        let node_name = channel.node_name();
        let mut image = ShaderNode::configured(
            node_name,
            &ImageConfig {
                file: file.clone(),
                signature: channel.signature(),
            },
        );
        image.connect(texcoord_index, TEXCOORD);

        match layout.slot(channel)? {
            (ShaderRole::Surface, index) => surface_shader.connect(index, node_name),
            (ShaderRole::Displacement, index) => displacement_shader.connect(index, node_name),
        }

        tracing::debug!(
            material = %record.identifier,
            channel = ?channel,
            texture = texture.unwrap_or(""),
            "planned channel"
        );
        network.bindings.push(ChannelBinding {
            channel,
            node: node_name.to_string(),
            texture: texture.map(str::to_string),
            file,
        });
        images.push(image);
    }

    network.add_node(surface_output);
    network.add_node(displacement_output);
    network.add_node(displacement_shader);
    network.add_node(surface_shader);
    network.add_node(texcoord);
    for image in images {
        network.add_node(image);
    }
    network.set_terminal("surface", SURFACE_SHADER);
    network.set_terminal("displacement", DISPLACEMENT_SHADER);

    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ParmValue;

    fn record(id: &str, textures: &[&str]) -> MaterialRecord {
        MaterialRecord {
            identifier: id.to_string(),
            textures: textures.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_stdlib_layout() {
        let layout = SlotLayout::stdlib();
        assert_eq!(layout.slot(ChannelCategory::BaseColor).unwrap(), (ShaderRole::Surface, 1));
        assert_eq!(layout.slot(ChannelCategory::Metallic).unwrap(), (ShaderRole::Surface, 3));
        assert_eq!(layout.slot(ChannelCategory::Specular).unwrap(), (ShaderRole::Surface, 4));
        assert_eq!(layout.slot(ChannelCategory::Roughness).unwrap(), (ShaderRole::Surface, 6));
        assert_eq!(layout.slot(ChannelCategory::Normal).unwrap(), (ShaderRole::Displacement, 0));
        assert_eq!(layout.texcoord_index().unwrap(), 3);
    }

    #[test]
    fn test_layout_missing_input() {
        let layout = SlotLayout::new(vec!["base".into()], vec![], vec!["file".into()]);
        let err = layout.slot(ChannelCategory::BaseColor).unwrap_err();
        assert!(matches!(err, Error::InputNotFound { .. }));
        assert!(layout.texcoord_index().is_err());
    }

    #[test]
    fn test_plan_topology() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wood_basecolor.png"), b"").unwrap();
        std::fs::write(dir.path().join("wood_roughness.png"), b"").unwrap();
        let folder = TextureFolder::scan(dir.path()).unwrap();
        let rec = record("Wood", &["wood_basecolor.png", "wood_roughness.png"]);

        let network =
            plan_subgraph(&rec, &folder, &SlotLayout::stdlib(), &DisplacementConfig::default())
                .unwrap();

        // 2 outputs, 2 shaders, texcoord, 5 images
        assert_eq!(network.nodes.len(), 10);
        assert_eq!(network.node(SURFACE_OUTPUT).unwrap().source(0), Some(SURFACE_SHADER));
        assert_eq!(
            network.node(DISPLACEMENT_OUTPUT).unwrap().source(0),
            Some(DISPLACEMENT_SHADER)
        );

        let surface = network.surface_shader().unwrap();
        assert_eq!(surface.source(1), Some("base_color"));
        assert_eq!(surface.source(6), Some("specular_roughness"));
        let displacement = network.displacement_shader().unwrap();
        assert_eq!(displacement.source(0), Some("normal"));

        // The normal image output matches the displacement input it feeds
        let signature = |node: &ShaderNode| match node.param("signature").map(|p| &p.value) {
            Some(ParmValue::String(s)) => s.clone(),
            other => panic!("missing signature: {other:?}"),
        };
        let normal = network.node("normal").unwrap();
        assert_eq!(signature(normal), signature(displacement));
        let planned = DisplacementConfig::default()
            .with_signature(ChannelCategory::Normal.signature());
        assert_eq!(
            planned.nodedef().input("displacement").map(|i| i.ty),
            Some(ChannelCategory::Normal.signature().input_type())
        );
        assert_eq!(
            displacement.param("scale").map(|p| &p.value),
            Some(&ParmValue::from(DisplacementConfig::default().scale))
        );

        let base = network.binding(ChannelCategory::BaseColor).unwrap();
        assert!(base.is_resolved());
        assert!(base.file.ends_with("wood_basecolor.png"));
        let metal = network.binding(ChannelCategory::Metallic).unwrap();
        assert!(!metal.is_resolved());
        assert_eq!(metal.texture, None);

        let image = network.node("metalness").unwrap();
        assert_eq!(image.param("file").map(|p| &p.value), Some(&ParmValue::from("")));
        assert_eq!(image.source(3), Some(TEXCOORD));
    }

    #[test]
    fn test_plan_unresolvable_texture() {
        let folder = TextureFolder::from_files("/nonexistent", vec!["stone_normal.png".into()]);
        let rec = record("stone", &["stone_normal.png"]);
        let network =
            plan_subgraph(&rec, &folder, &SlotLayout::stdlib(), &DisplacementConfig::default())
                .unwrap();
        let normal = network.binding(ChannelCategory::Normal).unwrap();
        assert_eq!(normal.texture.as_deref(), Some("stone_normal.png"));
        assert_eq!(normal.file, "");
    }

    #[test]
    fn test_plan_is_deterministic() {
        let folder = TextureFolder::from_files("/nonexistent", vec![]);
        let rec = record("a", &[]);
        let layout = SlotLayout::stdlib();
        let cfg = DisplacementConfig::default();
        assert_eq!(
            plan_subgraph(&rec, &folder, &layout, &cfg).unwrap(),
            plan_subgraph(&rec, &folder, &layout, &cfg).unwrap()
        );
    }
}
