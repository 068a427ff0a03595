//! Scene-graph editing surface.
//!
//! The synthesis engine never talks to a host application directly. It drives
//! the [`SceneGraph`] capability trait: create a node of a kind under a parent,
//! set typed parameters, connect inputs, test for existence, walk children.
//! A host binding implements the trait; [`MemoryScene`] is the in-process one.
//!
//! ## Key Concepts
//!
//! - **NodePath**: absolute slash-separated address (`/stage/lopnet/matlib`)
//! - **NodeKind**: the host node types the engine creates or reads
//! - **Parm**: a named parameter value; typed configs lower into these
//!
//! ## Example
//!
//! ```
//! use mtlx_synth::scene::{MemoryScene, NodeKind, NodePath, SceneGraph};
//!
//! let mut scene = MemoryScene::new();
//! let lopnet = scene.create_node(&NodePath::new("/stage"), NodeKind::Lopnet, "lopnet").unwrap();
//! assert!(scene.exists(&lopnet));
//! assert_eq!(lopnet.as_str(), "/stage/lopnet");
//! ```

mod memory;
mod parms;

pub use memory::*;
pub use parms::*;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

// ============================================================================
// Paths
// ============================================================================

/// Absolute path of a node in the scene graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NodePath(String);

impl NodePath {
    /// Create a path, normalizing slashes. Relative input is made absolute.
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut out = String::new();
        for part in path.as_ref().split('/').filter(|s| !s.is_empty()) {
            out.push('/');
            out.push_str(part);
        }
        if out.is_empty() {
            out.push('/');
        }
        Self(out)
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Last path component (empty for root).
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// Parent path (None for root).
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(pos) => Some(Self(self.0[..pos].to_string())),
            None => None,
        }
    }

    /// Child path.
    pub fn join(&self, name: &str) -> NodePath {
        if self.is_root() {
            Self::new(name)
        } else {
            Self::new(format!("{}/{}", self.0, name))
        }
    }

    /// Whether `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &NodePath) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(&ancestor.0)
            && self.0.as_bytes()[ancestor.0.len()] == b'/'
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<NodePath> for String {
    fn from(p: NodePath) -> Self {
        p.0
    }
}

// ============================================================================
// Node kinds
// ============================================================================

/// Host node types used by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Network manager (`/obj`, `/stage`) and the scene root.
    #[serde(rename = "manager")]
    Manager,
    /// Object-level subnet holding imported geometry.
    #[serde(rename = "objsubnet")]
    ObjSubnet,
    /// Object-level geometry container.
    #[serde(rename = "geo")]
    ObjGeometry,
    #[serde(rename = "lopnet")]
    Lopnet,
    #[serde(rename = "materiallibrary")]
    MaterialLibrary,
    #[serde(rename = "subnet")]
    Subnet,
    #[serde(rename = "subinput")]
    SubInput,
    #[serde(rename = "suboutput")]
    SubOutput,
    #[serde(rename = "subnetconnector")]
    SubnetConnector,
    #[serde(rename = "mtlxstandard_surface")]
    MtlxStandardSurface,
    #[serde(rename = "mtlxdisplacement")]
    MtlxDisplacement,
    #[serde(rename = "mtlxtexcoord")]
    MtlxTexcoord,
    #[serde(rename = "mtlximage")]
    MtlxImage,
    #[serde(rename = "xform")]
    Xform,
    #[serde(rename = "sopimport")]
    SopImport,
    #[serde(rename = "merge")]
    Merge,
    #[serde(rename = "output")]
    Output,
}

impl NodeKind {
    /// Host type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::ObjSubnet => "objsubnet",
            Self::ObjGeometry => "geo",
            Self::Lopnet => "lopnet",
            Self::MaterialLibrary => "materiallibrary",
            Self::Subnet => "subnet",
            Self::SubInput => "subinput",
            Self::SubOutput => "suboutput",
            Self::SubnetConnector => "subnetconnector",
            Self::MtlxStandardSurface => "mtlxstandard_surface",
            Self::MtlxDisplacement => "mtlxdisplacement",
            Self::MtlxTexcoord => "mtlxtexcoord",
            Self::MtlxImage => "mtlximage",
            Self::Xform => "xform",
            Self::SopImport => "sopimport",
            Self::Merge => "merge",
            Self::Output => "output",
        }
    }

    /// Whether nodes of this kind can hold children.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Manager
                | Self::ObjSubnet
                | Self::ObjGeometry
                | Self::Lopnet
                | Self::MaterialLibrary
                | Self::Subnet
        )
    }

    /// MaterialX node definition backing this kind, if any.
    pub fn nodedef(&self) -> Option<&'static mtlx_stdlib::NodeDef> {
        match self {
            Self::MtlxStandardSurface => Some(&mtlx_stdlib::STANDARD_SURFACE),
            Self::MtlxDisplacement => Some(&mtlx_stdlib::DISPLACEMENT),
            Self::MtlxImage => Some(&mtlx_stdlib::IMAGE),
            Self::MtlxTexcoord => Some(&mtlx_stdlib::TEXCOORD),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Capability trait
// ============================================================================

/// Editing interface of a host scene graph.
///
/// Required methods are the primitive host operations; provided methods are
/// built on top of them and rarely need overriding.
pub trait SceneGraph {
    /// Check whether a node exists.
    fn exists(&self, path: &NodePath) -> bool;

    /// Get the kind of an existing node.
    fn kind(&self, path: &NodePath) -> Result<NodeKind>;

    /// Create a child node and return its path.
    fn create_node(&mut self, parent: &NodePath, kind: NodeKind, name: &str) -> Result<NodePath>;

    /// Destroy a node and everything below it.
    fn destroy(&mut self, path: &NodePath) -> Result<()>;

    /// Direct children in creation order.
    fn children(&self, path: &NodePath) -> Result<Vec<NodePath>>;

    /// Set (create or overwrite) parameters.
    fn set_parms(&mut self, path: &NodePath, parms: &[Parm]) -> Result<()>;

    /// Read a parameter; `Ok(None)` if the node has no such parameter.
    fn parm(&self, path: &NodePath, name: &str) -> Result<Option<ParmValue>>;

    /// Connect `source`'s output into input `index` of `path`.
    fn set_input(&mut self, path: &NodePath, index: usize, source: &NodePath) -> Result<()>;

    /// Source connected to input `index`, if any.
    fn input(&self, path: &NodePath, index: usize) -> Result<Option<NodePath>>;

    /// Connect `source` to the input after the last connected one; returns the index used.
    fn append_input(&mut self, path: &NodePath, source: &NodePath) -> Result<usize>;

    /// Input names in host order.
    fn input_names(&self, path: &NodePath) -> Result<Vec<String>>;

    /// Per-primitive values of a string attribute on a geometry node's display output.
    fn prim_string_attrib(&self, path: &NodePath, attrib: &str) -> Result<Option<Vec<String>>>;

    /// Overwrite a per-primitive string attribute.
    fn set_prim_string_attrib(&mut self, path: &NodePath, attrib: &str, values: Vec<String>) -> Result<()>;

    /// Toggle the material flag of a subnet.
    fn set_material_flag(&mut self, path: &NodePath, on: bool) -> Result<()>;

    /// Trigger a named button/action parameter.
    fn press_button(&mut self, path: &NodePath, action: &str) -> Result<()>;

    /// Arrange children for display. No behavioral contract.
    fn layout_children(&mut self, path: &NodePath) -> Result<()> {
        if self.exists(path) {
            Ok(())
        } else {
            Err(Error::not_found(path.as_str()))
        }
    }

    // ------------------------------------------------------------------------
    // Provided
    // ------------------------------------------------------------------------

    /// Whether a node has at least one child.
    fn has_children(&self, path: &NodePath) -> Result<bool> {
        Ok(!self.children(path)?.is_empty())
    }

    /// All descendants of the given kind, depth-first pre-order.
    fn descendants(&self, path: &NodePath, kind: NodeKind) -> Result<Vec<NodePath>> {
        let mut result = Vec::new();
        let mut stack: Vec<NodePath> = self.children(path)?.into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.kind(&node)? == kind {
                result.push(node.clone());
            }
            if self.kind(&node)?.is_network() {
                stack.extend(self.children(&node)?.into_iter().rev());
            }
        }
        Ok(result)
    }

    /// Create a sibling of `path` and wire it into input `index` of `path`.
    fn create_input_node(
        &mut self,
        path: &NodePath,
        index: usize,
        kind: NodeKind,
        name: &str,
    ) -> Result<NodePath> {
        let parent = path.parent().ok_or_else(|| Error::not_found(path.as_str()))?;
        let node = self.create_node(&parent, kind, name)?;
        self.set_input(path, index, &node)?;
        Ok(node)
    }

    /// Distinct values of a per-primitive string attribute, first-seen order.
    fn prim_string_values(&self, path: &NodePath, attrib: &str) -> Result<Vec<String>> {
        let mut values: Vec<String> = Vec::new();
        for value in self.prim_string_attrib(path, attrib)?.unwrap_or_default() {
            if !values.contains(&value) {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Evaluate a numeric parameter.
    fn eval_float(&self, path: &NodePath, name: &str) -> Result<Option<f64>> {
        match self.parm(path, name)? {
            None => Ok(None),
            Some(value) => value.as_float().map(Some).ok_or_else(|| Error::ParmType {
                path: path.to_string(),
                parm: name.to_string(),
                expected: "float",
            }),
        }
    }

    /// Evaluate a string parameter.
    fn eval_string(&self, path: &NodePath, name: &str) -> Result<Option<String>> {
        match self.parm(path, name)? {
            None => Ok(None),
            Some(ParmValue::String(s)) => Ok(Some(s)),
            Some(_) => Err(Error::ParmType {
                path: path.to_string(),
                parm: name.to_string(),
                expected: "string",
            }),
        }
    }

    /// Apply a typed node configuration, checking the node kind first.
    fn configure<C: NodeConfig>(&mut self, path: &NodePath, config: &C) -> Result<()>
    where
        Self: Sized,
    {
        let actual = self.kind(path)?;
        if actual != config.kind() {
            return Err(Error::KindMismatch {
                path: path.to_string(),
                expected: config.kind().to_string(),
                actual: actual.to_string(),
            });
        }
        self.set_parms(path, &config.to_parms())
    }
}
