//! In-memory scene graph.
//!
//! A self-contained [`SceneGraph`] implementation that behaves like a host
//! for the operations the engine uses. Node names are unique per parent,
//! inputs are bounded by the node definition, and a material library knows
//! how to fill its material list.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use smallvec::SmallVec;

use super::{NodeKind, NodePath, Parm, ParmValue, SceneGraph};
use crate::util::{Error, Result};

/// Action name that fills a material library's material list.
pub const FILL_MATERIALS: &str = "fillmaterials";

#[derive(Clone, Debug)]
struct MemoryNode {
    kind: NodeKind,
    /// Child names in creation order.
    children: Vec<String>,
    parms: SmallVec<[Parm; 4]>,
    inputs: Vec<Option<NodePath>>,
    prim_attribs: BTreeMap<String, Vec<String>>,
    material_flag: bool,
}

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parms: SmallVec::new(),
            inputs: Vec::new(),
            prim_attribs: BTreeMap::new(),
            material_flag: false,
        }
    }

    fn set_parm(&mut self, parm: Parm) {
        // Update existing or add new
        for p in &mut self.parms {
            if p.name == parm.name {
                p.value = parm.value;
                return;
            }
        }
        self.parms.push(parm);
    }

    fn max_inputs(&self) -> usize {
        if let Some(def) = self.kind.nodedef() {
            return def.num_inputs();
        }
        match self.kind {
            NodeKind::Merge => usize::MAX,
            NodeKind::Subnet => 4,
            NodeKind::Manager | NodeKind::Lopnet | NodeKind::SubInput => 0,
            _ => 1,
        }
    }
}

/// One node of a topology snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub path: NodePath,
    pub kind: NodeKind,
    pub material_flag: bool,
    pub parms: Vec<Parm>,
    pub inputs: Vec<Option<NodePath>>,
}

/// In-memory scene graph with `/obj` and `/stage` managers.
#[derive(Clone, Debug)]
pub struct MemoryScene {
    nodes: HashMap<NodePath, MemoryNode>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create a scene with the root and the `/obj` and `/stage` managers.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        let mut root = MemoryNode::new(NodeKind::Manager);
        root.children = vec!["obj".to_string(), "stage".to_string()];
        nodes.insert(NodePath::root(), root);
        nodes.insert(NodePath::new("/obj"), MemoryNode::new(NodeKind::Manager));
        nodes.insert(NodePath::new("/stage"), MemoryNode::new(NodeKind::Manager));
        Self { nodes }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create an object-level geometry node carrying a per-primitive string attribute.
    pub fn create_geometry(
        &mut self,
        parent: &NodePath,
        name: &str,
        attrib: &str,
        prim_values: &[&str],
    ) -> Result<NodePath> {
        let path = self.create_node(parent, NodeKind::ObjGeometry, name)?;
        let values = prim_values.iter().map(|s| s.to_string()).collect();
        self.set_prim_string_attrib(&path, attrib, values)?;
        Ok(path)
    }

    /// Material flag of a node.
    pub fn material_flag(&self, path: &NodePath) -> Result<bool> {
        Ok(self.node(path)?.material_flag)
    }

    /// Deterministic pre-order listing of `root` and everything below it.
    pub fn snapshot(&self, root: &NodePath) -> Result<Vec<NodeSnapshot>> {
        let mut result = Vec::new();
        let mut stack = vec![root.clone()];
        while let Some(path) = stack.pop() {
            let node = self.node(&path)?;
            result.push(NodeSnapshot {
                path: path.clone(),
                kind: node.kind,
                material_flag: node.material_flag,
                parms: node.parms.to_vec(),
                inputs: node.inputs.clone(),
            });
            stack.extend(node.children.iter().rev().map(|c| path.join(c)));
        }
        Ok(result)
    }

    /// Pretty JSON of [`MemoryScene::snapshot`].
    pub fn to_json(&self, root: &NodePath) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot(root)?)?)
    }

    fn node(&self, path: &NodePath) -> Result<&MemoryNode> {
        self.nodes
            .get(path)
            .ok_or_else(|| Error::not_found(path.as_str()))
    }

    fn node_mut(&mut self, path: &NodePath) -> Result<&mut MemoryNode> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| Error::not_found(path.as_str()))
    }

    fn geometry_mut(&mut self, path: &NodePath) -> Result<&mut MemoryNode> {
        let node = self.node_mut(path)?;
        if node.kind != NodeKind::ObjGeometry {
            return Err(Error::KindMismatch {
                path: path.to_string(),
                expected: NodeKind::ObjGeometry.to_string(),
                actual: node.kind.to_string(),
            });
        }
        Ok(node)
    }

    /// Default contents of a freshly created node.
    fn populate_defaults(&mut self, path: &NodePath, kind: NodeKind, parent_kind: NodeKind) -> Result<()> {
        match kind {
            NodeKind::MaterialLibrary => {
                let node = self.node_mut(path)?;
                node.set_parm(Parm::new("matpathprefix", "/materials/"));
                node.set_parm(Parm::new("materials", 0));
            }
            NodeKind::Subnet if parent_kind == NodeKind::MaterialLibrary => {
                self.create_node(path, NodeKind::SubInput, "subinput1")?;
                self.create_node(path, NodeKind::SubOutput, "suboutput1")?;
            }
            NodeKind::Subnet => {
                self.create_node(path, NodeKind::Output, "output0")?;
            }
            _ => {}
        }
        Ok(())
    }

    fn fill_materials(&mut self, path: &NodePath) -> Result<()> {
        let prefix = match self.parm(path, "matpathprefix")? {
            Some(ParmValue::String(s)) => s,
            _ => "/materials/".to_string(),
        };
        let prefix = prefix.trim_end_matches('/').to_string();

        let names: Vec<String> = self
            .node(path)?
            .children
            .iter()
            .filter(|c| self.nodes.get(&path.join(c)).is_some_and(|n| n.material_flag))
            .cloned()
            .collect();

        let node = self.node_mut(path)?;
        node.set_parm(Parm::new("materials", names.len()));
        for (i, name) in names.iter().enumerate() {
            let n = i + 1;
            node.set_parm(Parm::new(format!("matnode{n}"), name.as_str()));
            node.set_parm(Parm::new(format!("matpath{n}"), format!("{prefix}/{name}")));
            node.set_parm(Parm::new(format!("geopath{n}"), format!("/Geometries/*/{name}")));
        }
        Ok(())
    }
}

impl SceneGraph for MemoryScene {
    fn exists(&self, path: &NodePath) -> bool {
        self.nodes.contains_key(path)
    }

    fn kind(&self, path: &NodePath) -> Result<NodeKind> {
        Ok(self.node(path)?.kind)
    }

    fn create_node(&mut self, parent: &NodePath, kind: NodeKind, name: &str) -> Result<NodePath> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::InvalidName(name.to_string()));
        }
        let parent_kind = self.node(parent)?.kind;
        if !parent_kind.is_network() {
            return Err(Error::KindMismatch {
                path: parent.to_string(),
                expected: "network".to_string(),
                actual: parent_kind.to_string(),
            });
        }
        let path = parent.join(name);
        if self.nodes.contains_key(&path) {
            return Err(Error::NodeExists(path.to_string()));
        }

        self.node_mut(parent)?.children.push(name.to_string());
        self.nodes.insert(path.clone(), MemoryNode::new(kind));
        self.populate_defaults(&path, kind, parent_kind)?;
        Ok(path)
    }

    fn destroy(&mut self, path: &NodePath) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::other("cannot destroy the scene root"))?;
        self.node(path)?;

        self.nodes
            .retain(|p, _| p != path && !p.is_descendant_of(path));
        let name = path.name().to_string();
        self.node_mut(&parent)?.children.retain(|c| *c != name);

        // Dangling connections are dropped like a host would.
        for node in self.nodes.values_mut() {
            for input in node.inputs.iter_mut() {
                if input.as_ref().is_some_and(|src| src == path || src.is_descendant_of(path)) {
                    *input = None;
                }
            }
        }
        Ok(())
    }

    fn children(&self, path: &NodePath) -> Result<Vec<NodePath>> {
        Ok(self.node(path)?.children.iter().map(|c| path.join(c)).collect())
    }

    fn set_parms(&mut self, path: &NodePath, parms: &[Parm]) -> Result<()> {
        let node = self.node_mut(path)?;
        for parm in parms {
            node.set_parm(parm.clone());
        }
        Ok(())
    }

    fn parm(&self, path: &NodePath, name: &str) -> Result<Option<ParmValue>> {
        Ok(self
            .node(path)?
            .parms
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.clone()))
    }

    fn set_input(&mut self, path: &NodePath, index: usize, source: &NodePath) -> Result<()> {
        self.node(source)?;
        if source.parent() != path.parent() {
            return Err(Error::other(format!(
                "cannot connect {source} into {path}: different networks"
            )));
        }
        let node = self.node_mut(path)?;
        let count = node.max_inputs();
        if index >= count {
            return Err(Error::InputOutOfBounds {
                path: path.to_string(),
                index,
                count,
            });
        }
        if node.inputs.len() <= index {
            node.inputs.resize(index + 1, None);
        }
        node.inputs[index] = Some(source.clone());
        Ok(())
    }

    fn input(&self, path: &NodePath, index: usize) -> Result<Option<NodePath>> {
        Ok(self.node(path)?.inputs.get(index).cloned().flatten())
    }

    fn append_input(&mut self, path: &NodePath, source: &NodePath) -> Result<usize> {
        let index = self
            .node(path)?
            .inputs
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1);
        self.set_input(path, index, source)?;
        Ok(index)
    }

    fn input_names(&self, path: &NodePath) -> Result<Vec<String>> {
        let node = self.node(path)?;
        if let Some(def) = node.kind.nodedef() {
            return Ok(def.input_names().map(str::to_string).collect());
        }
        // Unbounded inputs expose one spare slot past the connected ones.
        let count = match node.max_inputs() {
            usize::MAX => node.inputs.iter().rposition(Option::is_some).map_or(1, |i| i + 2),
            n => n,
        };
        Ok((1..=count).map(|i| format!("input{i}")).collect())
    }

    fn prim_string_attrib(&self, path: &NodePath, attrib: &str) -> Result<Option<Vec<String>>> {
        let node = self.node(path)?;
        if node.kind != NodeKind::ObjGeometry {
            return Err(Error::KindMismatch {
                path: path.to_string(),
                expected: NodeKind::ObjGeometry.to_string(),
                actual: node.kind.to_string(),
            });
        }
        Ok(node.prim_attribs.get(attrib).cloned())
    }

    fn set_prim_string_attrib(&mut self, path: &NodePath, attrib: &str, values: Vec<String>) -> Result<()> {
        let node = self.geometry_mut(path)?;
        if let Some(existing) = node.prim_attribs.values().next() {
            if existing.len() != values.len() {
                return Err(Error::other(format!(
                    "{path}: attribute '{attrib}' has {} values for {} primitives",
                    values.len(),
                    existing.len()
                )));
            }
        }
        node.prim_attribs.insert(attrib.to_string(), values);
        Ok(())
    }

    fn set_material_flag(&mut self, path: &NodePath, on: bool) -> Result<()> {
        self.node_mut(path)?.material_flag = on;
        Ok(())
    }

    fn press_button(&mut self, path: &NodePath, action: &str) -> Result<()> {
        let kind = self.node(path)?.kind;
        match (kind, action) {
            (NodeKind::MaterialLibrary, FILL_MATERIALS) => self.fill_materials(path),
            _ => Err(Error::UnknownAction {
                path: path.to_string(),
                action: action.to_string(),
            }),
        }
    }
}
