//! Live geometry references on the stage.
//!
//! Every source geometry node gets a transform node fed by a SOP import that
//! references the source live. The transforms are fanned into one merge node
//! feeding the geometry subnet's output.

use serde::Serialize;

use crate::material::{
    MATERIAL_BIND_ATTRIB, MATERIAL_PATH_ATTRIB, MATERIAL_PREFIX, USD_MATERIAL_PATH_ATTRIB,
};
use crate::scene::{NodeKind, NodePath, SceneGraph, SopImportConfig};
use crate::util::{Error, Result};

use super::TransformParams;

/// Default primitive path prefix of imported geometry.
pub const DEFAULT_PATH_PREFIX: &str = "/Geometries/$OS";

/// Name of the merge node aggregating all references.
pub const MERGE_NODE: &str = "merge";

/// Name of the geometry subnet's output node.
pub const OUTPUT_NODE: &str = "output0";

/// Binding key of a raw material path: everything after the last `/`.
pub fn binding_key(raw: &str) -> &str {
    match raw.rfind('/') {
        Some(pos) => &raw[pos + 1..],
        None => raw,
    }
}

/// Attribute names and prefix used when normalizing material paths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialPathRewrite {
    /// Raw material path attribute, rewritten in place.
    pub path_attrib: String,
    /// Receives the binding key; references partition on it.
    pub bind_attrib: String,
    /// Receives a copy of the normalized path for the exporter.
    pub usd_attrib: String,
    /// Prefix of normalized paths.
    pub prefix: String,
}

impl Default for MaterialPathRewrite {
    fn default() -> Self {
        Self {
            path_attrib: MATERIAL_PATH_ATTRIB.to_string(),
            bind_attrib: MATERIAL_BIND_ATTRIB.to_string(),
            usd_attrib: USD_MATERIAL_PATH_ATTRIB.to_string(),
            prefix: MATERIAL_PREFIX.to_string(),
        }
    }
}

impl MaterialPathRewrite {
    /// Normalized path for a raw material path.
    ///
    /// An empty binding key stays empty instead of becoming a bare
    /// `/materials/`. This differs from the VEX rewrite the tool replaces,
    /// which formats the prefix unconditionally.
    pub fn normalize(&self, raw: &str) -> String {
        let key = binding_key(raw);
        if key.is_empty() {
            return String::new();
        }
        format!("{}/{}", self.prefix.trim_end_matches('/'), key)
    }

    /// Rewrite the material path attributes of every geometry node.
    ///
    /// Destructive: the raw path attribute is overwritten. Running it again
    /// over already normalized paths gives the same values. Returns the
    /// number of nodes that carried the path attribute.
    #[tracing::instrument(skip_all, fields(geometry = geos.len(), attrib = %self.path_attrib))]
    pub fn apply<S: SceneGraph + ?Sized>(&self, scene: &mut S, geos: &[NodePath]) -> Result<usize> {
        let mut rewritten = 0;
        for geo in geos {
            let Some(raw) = scene.prim_string_attrib(geo, &self.path_attrib)? else {
                continue;
            };
            let keys: Vec<String> = raw.iter().map(|s| binding_key(s).to_string()).collect();
            let paths: Vec<String> = raw.iter().map(|s| self.normalize(s)).collect();

            scene.set_prim_string_attrib(geo, &self.bind_attrib, keys)?;
            scene.set_prim_string_attrib(geo, &self.usd_attrib, paths.clone())?;
            scene.set_prim_string_attrib(geo, &self.path_attrib, paths)?;
            tracing::debug!(%geo, prims = raw.len(), "rewrote material paths");
            rewritten += 1;
        }
        Ok(rewritten)
    }
}

/// Geometry reference created for one source node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeometryReference {
    pub source: NodePath,
    pub transform_node: NodePath,
    pub reference_node: NodePath,
    /// Transform copied from the source.
    pub transform: TransformParams,
    /// Merge input the transform was appended to.
    pub merge_input: usize,
}

/// References built by one pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceSet {
    pub created: Vec<GeometryReference>,
    /// Sources whose reference nodes already existed.
    pub skipped: Vec<NodePath>,
}

/// Builds geometry references inside the stage's geometry subnet.
#[derive(Clone, Debug)]
pub struct GeometryReferenceBuilder {
    subnet: NodePath,
    path_prefix: String,
    partition_attrib: String,
}

impl GeometryReferenceBuilder {
    pub fn new(subnet: NodePath) -> Self {
        Self {
            subnet,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            partition_attrib: MATERIAL_BIND_ATTRIB.to_string(),
        }
    }

    /// Set the primitive path prefix.
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Set the attribute material subsets are partitioned on.
    pub fn with_partition_attrib(mut self, attrib: impl Into<String>) -> Self {
        self.partition_attrib = attrib.into();
        self
    }

    pub fn subnet(&self) -> &NodePath {
        &self.subnet
    }

    /// Ensure the merge node exists and feeds the subnet output; returns the merge path.
    pub fn ensure_merge<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<NodePath> {
        if !scene.exists(&self.subnet) {
            return Err(Error::missing_container(self.subnet.as_str()));
        }
        let output = self.subnet.join(OUTPUT_NODE);
        if !scene.exists(&output) {
            scene.create_node(&self.subnet, NodeKind::Output, OUTPUT_NODE)?;
        }
        let merge = self.subnet.join(MERGE_NODE);
        if !scene.exists(&merge) {
            scene.create_node(&self.subnet, NodeKind::Merge, MERGE_NODE)?;
        }
        if scene.input(&output, 0)?.is_none() {
            scene.set_input(&output, 0, &merge)?;
        }
        Ok(merge)
    }

    /// Existing SOP import in the subnet referencing `source`, if any.
    pub fn find_reference<S: SceneGraph + ?Sized>(
        &self,
        scene: &S,
        source: &NodePath,
    ) -> Result<Option<NodePath>> {
        for child in scene.children(&self.subnet)? {
            if scene.kind(&child)? != NodeKind::SopImport {
                continue;
            }
            if scene.eval_string(&child, "soppath")?.as_deref() == Some(source.as_str()) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Free base name for a source: its own name, or the first numeric
    /// suffix for which neither the import nor its transform is taken.
    fn unique_name<S: SceneGraph + ?Sized>(&self, scene: &S, name: &str) -> String {
        let taken = |base: &str| {
            scene.exists(&self.subnet.join(base))
                || scene.exists(&self.subnet.join(&format!("{base}_transform")))
        };
        if !taken(name) {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{name}{n}"))
            .find(|base| !taken(base))
            .unwrap_or_else(|| name.to_string())
    }

    /// Build the reference of one source node unless one already imports it.
    pub fn build_reference<S: SceneGraph>(
        &self,
        scene: &mut S,
        source: &NodePath,
        merge: &NodePath,
    ) -> Result<Option<GeometryReference>> {
        if let Some(existing) = self.find_reference(&*scene, source)? {
            tracing::debug!(%source, %existing, "reference exists, skipping");
            return Ok(None);
        }

        let name = self.unique_name(&*scene, source.name());
        if name != source.name() {
            tracing::info!(%source, %name, "reference renamed to avoid a name clash");
        }
        let xform_name = format!("{name}_transform");

        let transform = TransformParams::read(&*scene, source)?;
        let xform = scene.create_node(&self.subnet, NodeKind::Xform, &xform_name)?;
        let reference = scene.create_input_node(&xform, 0, NodeKind::SopImport, &name)?;
        scene.configure(
            &reference,
            &SopImportConfig::partitioned(source.as_str(), &self.path_prefix, &self.partition_attrib),
        )?;
        scene.configure(&xform, &transform)?;
        let merge_input = scene.append_input(merge, &xform)?;

        tracing::debug!(%source, merge_input, "built geometry reference");
        Ok(Some(GeometryReference {
            source: source.clone(),
            transform_node: xform,
            reference_node: reference,
            transform,
            merge_input,
        }))
    }

    /// Build references for every source in order, then lay out the subnet.
    #[tracing::instrument(skip_all, fields(subnet = %self.subnet, geometry = sources.len()))]
    pub fn build_all<S: SceneGraph>(&self, scene: &mut S, sources: &[NodePath]) -> Result<ReferenceSet> {
        let merge = self.ensure_merge(scene)?;
        let mut set = ReferenceSet::default();
        for source in sources {
            match self.build_reference(scene, source, &merge)? {
                Some(reference) => set.created.push(reference),
                None => set.skipped.push(source.clone()),
            }
        }
        scene.layout_children(&self.subnet)?;
        tracing::info!(
            created = set.created.len(),
            skipped = set.skipped.len(),
            "built geometry references"
        );
        Ok(set)
    }
}
