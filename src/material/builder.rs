//! Shader graph construction inside a material library.

use crate::scene::{
    DisplacementConfig, MaterialAssignConfig, NodeKind, NodePath, SceneGraph, FILL_MATERIALS,
};
use crate::util::{Error, Result};

use super::{plan_subgraph, MaterialRecord, MaterialRecords, ShaderNetwork, SlotLayout, TextureFolder};

/// Names of the throwaway nodes used to read input orderings.
pub const REFERENCE_SURFACE: &str = "reference_mtlx";
pub const REFERENCE_DISPLACEMENT: &str = "reference_displacement";
pub const REFERENCE_IMAGE: &str = "reference_image";

/// Result of building one material.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildOutcome {
    /// Subgraph was created from this network.
    Created(ShaderNetwork),
    /// Container already had children; nothing was touched.
    Skipped,
}

impl BuildOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Outcome of one material, with the container it lives in.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialBuild {
    pub identifier: String,
    pub container: NodePath,
    pub outcome: BuildOutcome,
}

/// Builds one MaterialX subgraph per material record under a material library.
///
/// Construction is idempotent: a container that already has children is
/// left alone, so re-running against a partially built library only fills
/// in what is missing.
#[derive(Clone, Debug)]
pub struct ShaderGraphBuilder {
    matlib: NodePath,
    displacement: DisplacementConfig,
}

impl ShaderGraphBuilder {
    /// Builder targeting the material library at `matlib`.
    pub fn new(matlib: NodePath) -> Self {
        Self {
            matlib,
            displacement: DisplacementConfig::default(),
        }
    }

    /// Override the displacement shader settings.
    pub fn with_displacement(mut self, displacement: DisplacementConfig) -> Self {
        self.displacement = displacement;
        self
    }

    pub fn matlib(&self) -> &NodePath {
        &self.matlib
    }

    fn check_matlib<S: SceneGraph + ?Sized>(&self, scene: &S) -> Result<()> {
        if !scene.exists(&self.matlib) {
            return Err(Error::missing_container(self.matlib.as_str()));
        }
        let kind = scene.kind(&self.matlib)?;
        if kind != NodeKind::MaterialLibrary {
            return Err(Error::KindMismatch {
                path: self.matlib.to_string(),
                expected: NodeKind::MaterialLibrary.to_string(),
                actual: kind.to_string(),
            });
        }
        Ok(())
    }

    /// Input names of a node kind as the host reports them.
    ///
    /// A throwaway node is created, read and destroyed. A stale node of the
    /// same kind already under the probe name is read and destroyed too.
    fn probe<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        kind: NodeKind,
        name: &str,
    ) -> Result<Vec<String>> {
        let path = self.matlib.join(name);
        let path = if scene.exists(&path) && scene.kind(&path)? == kind {
            path
        } else {
            scene.create_node(&self.matlib, kind, name)?
        };
        let names = scene.input_names(&path);
        scene.destroy(&path)?;
        names
    }

    /// Read the slot layout of the shading nodes from the host.
    #[tracing::instrument(skip_all, fields(matlib = %self.matlib))]
    pub fn probe_layout<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<SlotLayout> {
        self.check_matlib(&*scene)?;
        let surface = self.probe(scene, NodeKind::MtlxStandardSurface, REFERENCE_SURFACE)?;
        let displacement = self.probe(scene, NodeKind::MtlxDisplacement, REFERENCE_DISPLACEMENT)?;
        let image = self.probe(scene, NodeKind::MtlxImage, REFERENCE_IMAGE)?;
        tracing::debug!(
            surface = surface.len(),
            displacement = displacement.len(),
            image = image.len(),
            "probed shading inputs"
        );
        Ok(SlotLayout::new(surface, displacement, image))
    }

    /// Ensure the material container exists; returns its path and whether it was created.
    ///
    /// A new container gets the material flag and is emptied of the items the
    /// host puts into fresh subnets.
    pub fn ensure_container<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        identifier: &str,
    ) -> Result<(NodePath, bool)> {
        let path = self.matlib.join(identifier);
        if scene.exists(&path) {
            let kind = scene.kind(&path)?;
            if kind != NodeKind::Subnet {
                return Err(Error::KindMismatch {
                    path: path.to_string(),
                    expected: NodeKind::Subnet.to_string(),
                    actual: kind.to_string(),
                });
            }
            return Ok((path, false));
        }

        let path = scene.create_node(&self.matlib, NodeKind::Subnet, identifier)?;
        scene.set_material_flag(&path, true)?;
        for child in scene.children(&path)? {
            scene.destroy(&child)?;
        }
        Ok((path, true))
    }

    /// Create every planned node inside `container`, then wire them.
    pub fn apply<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        container: &NodePath,
        network: &ShaderNetwork,
    ) -> Result<()> {
        for node in &network.nodes {
            let path = scene.create_node(container, node.kind, &node.name)?;
            if !node.parameters.is_empty() {
                scene.set_parms(&path, &node.parameters)?;
            }
        }
        for node in &network.nodes {
            let path = container.join(&node.name);
            for (index, source) in &node.connections {
                scene.set_input(&path, *index, &container.join(source))?;
            }
        }
        scene.layout_children(container)
    }

    /// Build the subgraph of one material unless its container is already populated.
    pub fn build_material<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        record: &MaterialRecord,
        folder: &TextureFolder,
        layout: &SlotLayout,
    ) -> Result<MaterialBuild> {
        let (container, created) = self.ensure_container(scene, &record.identifier)?;
        if !created && scene.has_children(&container)? {
            tracing::info!(material = %record.identifier, "subgraph exists, skipping");
            return Ok(MaterialBuild {
                identifier: record.identifier.clone(),
                container,
                outcome: BuildOutcome::Skipped,
            });
        }

        let network = plan_subgraph(record, folder, layout, &self.displacement)?;
        self.apply(scene, &container, &network)?;

        let bound = network.bindings.iter().filter(|b| b.is_resolved()).count();
        tracing::info!(
            material = %record.identifier,
            nodes = network.nodes.len(),
            bound,
            "built subgraph"
        );
        Ok(MaterialBuild {
            identifier: record.identifier.clone(),
            container,
            outcome: BuildOutcome::Created(network),
        })
    }

    /// Build every record's subgraph in record order.
    #[tracing::instrument(skip_all, fields(matlib = %self.matlib, materials = records.len()))]
    pub fn build_all<S: SceneGraph + ?Sized>(
        &self,
        scene: &mut S,
        records: &MaterialRecords,
        folder: &TextureFolder,
    ) -> Result<Vec<MaterialBuild>> {
        let layout = self.probe_layout(scene)?;
        records
            .iter()
            .map(|record| self.build_material(scene, record, folder, &layout))
            .collect()
    }

    /// Fill the library's material list and turn on assignment.
    pub fn assign_materials<S: SceneGraph>(&self, scene: &mut S) -> Result<()> {
        self.check_matlib(&*scene)?;
        scene.layout_children(&self.matlib)?;
        scene.press_button(&self.matlib, FILL_MATERIALS)?;
        scene.configure(&self.matlib, &MaterialAssignConfig { assign: true })
    }
}
