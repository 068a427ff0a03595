//! Node parameters and typed node configurations.
//!
//! Hosts store parameters as string-keyed values. The engine never builds
//! those maps by hand: each node kind it configures has a config struct that
//! lowers into [`Parm`]s through [`NodeConfig`].

use serde::{Deserialize, Serialize};

use super::NodeKind;

/// Parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParmValue {
    /// Integer value (toggles and menus are integers too).
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
}

impl ParmValue {
    /// Get as float if possible.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::String(_) => None,
        }
    }

    /// Get as integer if possible.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string if possible.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for ParmValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParmValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for ParmValue {
    fn from(v: usize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<bool> for ParmValue {
    fn from(v: bool) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for ParmValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParmValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParmValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Named parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parm {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: ParmValue,
}

impl Parm {
    /// Create a new parameter.
    pub fn new(name: impl Into<String>, value: impl Into<ParmValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Typed configuration for one node kind.
pub trait NodeConfig {
    /// Node kind this configuration applies to.
    fn kind(&self) -> NodeKind;

    /// Lower into host parameters.
    fn to_parms(&self) -> Vec<Parm>;
}

// ============================================================================
// Shading nodes
// ============================================================================

/// Direction of a subnet connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorKind {
    Input = 0,
    Output = 1,
}

/// Subnet connector (`subnetconnector`) exposing a network terminal.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorConfig {
    pub connector: ConnectorKind,
    pub parm_name: String,
    pub parm_label: String,
    pub parm_type: String,
}

impl ConnectorConfig {
    /// Output connector for a terminal such as "surface" or "displacement".
    pub fn output(name: &str, label: &str) -> Self {
        Self {
            connector: ConnectorKind::Output,
            parm_name: name.to_string(),
            parm_label: label.to_string(),
            parm_type: name.to_string(),
        }
    }

    /// Surface terminal.
    pub fn surface() -> Self {
        Self::output("surface", "Surface")
    }

    /// Displacement terminal.
    pub fn displacement() -> Self {
        Self::output("displacement", "Displacement")
    }
}

impl NodeConfig for ConnectorConfig {
    fn kind(&self) -> NodeKind {
        NodeKind::SubnetConnector
    }

    fn to_parms(&self) -> Vec<Parm> {
        vec![
            Parm::new("connectorkind", self.connector as i64),
            Parm::new("parmname", self.parm_name.as_str()),
            Parm::new("parmlabel", self.parm_label.as_str()),
            Parm::new("parmtype", self.parm_type.as_str()),
        ]
    }
}

/// Default scale of the displacement shader.
pub const DEFAULT_DISPLACEMENT_SCALE: f64 = 0.05;

/// Displacement shader (`mtlxdisplacement`).
///
/// `signature` selects the nodedef variant and must match the type of
/// whatever feeds the `displacement` input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplacementConfig {
    pub scale: f64,
    pub signature: ImageSignature,
}

impl Default for DisplacementConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_DISPLACEMENT_SCALE,
            signature: ImageSignature::Float,
        }
    }
}

impl DisplacementConfig {
    pub fn with_signature(self, signature: ImageSignature) -> Self {
        Self { signature, ..self }
    }

    /// Node definition selected by the signature.
    pub fn nodedef(&self) -> &'static mtlx_stdlib::NodeDef {
        match self.signature {
            ImageSignature::Vector3 => &mtlx_stdlib::DISPLACEMENT_VECTOR3,
            _ => &mtlx_stdlib::DISPLACEMENT,
        }
    }
}

impl NodeConfig for DisplacementConfig {
    fn kind(&self) -> NodeKind {
        NodeKind::MtlxDisplacement
    }

    fn to_parms(&self) -> Vec<Parm> {
        vec![
            Parm::new("signature", self.signature.as_str()),
            Parm::new("scale", self.scale),
        ]
    }
}

/// Texture coordinate source (`mtlxtexcoord`).
#[derive(Clone, Debug, PartialEq)]
pub struct TexcoordConfig {
    pub signature: String,
    pub index: i64,
}

impl Default for TexcoordConfig {
    fn default() -> Self {
        Self {
            signature: "vector2".to_string(),
            index: 0,
        }
    }
}

impl NodeConfig for TexcoordConfig {
    fn kind(&self) -> NodeKind {
        NodeKind::MtlxTexcoord
    }

    fn to_parms(&self) -> Vec<Parm> {
        vec![
            Parm::new("signature", self.signature.as_str()),
            Parm::new("index", self.index),
        ]
    }
}

/// Output type of an image node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSignature {
    Color3,
    Float,
    Vector3,
}

impl ImageSignature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color3 => "color3",
            Self::Float => "float",
            Self::Vector3 => "vector3",
        }
    }

    /// MaterialX type of an output with this signature.
    pub fn input_type(&self) -> mtlx_stdlib::InputType {
        match self {
            Self::Color3 => mtlx_stdlib::InputType::Color3,
            Self::Float => mtlx_stdlib::InputType::Float,
            Self::Vector3 => mtlx_stdlib::InputType::Vector3,
        }
    }
}

/// Image source (`mtlximage`).
///
/// An empty `file` is the explicit "unresolved" marker.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageConfig {
    pub file: String,
    pub signature: ImageSignature,
}

impl NodeConfig for ImageConfig {
    fn kind(&self) -> NodeKind {
        NodeKind::MtlxImage
    }

    fn to_parms(&self) -> Vec<Parm> {
        vec![
            Parm::new("signature", self.signature.as_str()),
            Parm::new("file", self.file.as_str()),
        ]
    }
}

// ============================================================================
// Stage nodes
// ============================================================================

/// Material binding mode of a SOP import.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindMaterials {
    NoBind,
    CreateBind,
    ReferenceBind,
}

impl BindMaterials {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoBind => "nobind",
            Self::CreateBind => "createbind",
            Self::ReferenceBind => "referencebind",
        }
    }
}

/// Live geometry reference (`sopimport`).
#[derive(Clone, Debug, PartialEq)]
pub struct SopImportConfig {
    /// Path of the referenced geometry node.
    pub sop_path: String,
    /// Primitive path prefix (`$OS` expands to the import node's name).
    pub path_prefix: String,
    pub bind_materials: BindMaterials,
    pub enable_partition_attribs: bool,
    pub enable_prefix_partition_subsets: bool,
    pub prefix_partition_subsets: bool,
    /// Attribute(s) whose values partition the geometry into subsets.
    pub partition_attribs: String,
}

impl SopImportConfig {
    /// Reference bound through material subsets partitioned on `partition_attrib`.
    pub fn partitioned(sop_path: &str, path_prefix: &str, partition_attrib: &str) -> Self {
        Self {
            sop_path: sop_path.to_string(),
            path_prefix: path_prefix.to_string(),
            bind_materials: BindMaterials::CreateBind,
            enable_partition_attribs: true,
            enable_prefix_partition_subsets: true,
            prefix_partition_subsets: false,
            partition_attribs: partition_attrib.to_string(),
        }
    }
}

impl NodeConfig for SopImportConfig {
    fn kind(&self) -> NodeKind {
        NodeKind::SopImport
    }

    fn to_parms(&self) -> Vec<Parm> {
        vec![
            Parm::new("soppath", self.sop_path.as_str()),
            Parm::new("pathprefix", self.path_prefix.as_str()),
            Parm::new("bindmaterials", self.bind_materials.as_str()),
            Parm::new("enable_partitionattribs", self.enable_partition_attribs),
            Parm::new("enable_prefixpartitionsubsets", self.enable_prefix_partition_subsets),
            Parm::new("prefixpartitionsubsets", self.prefix_partition_subsets),
            Parm::new("partitionattribs", self.partition_attribs.as_str()),
        ]
    }
}

/// Material library assignment switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialAssignConfig {
    pub assign: bool,
}

impl NodeConfig for MaterialAssignConfig {
    fn kind(&self) -> NodeKind {
        NodeKind::MaterialLibrary
    }

    fn to_parms(&self) -> Vec<Parm> {
        vec![Parm::new("assign1", self.assign)]
    }
}
