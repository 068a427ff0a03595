//! Run orchestration.
//!
//! A [`Pipeline`] takes a [`PipelineConfig`] and a scene, and sequences the
//! engine: extract identifiers, create the container tree, normalize material
//! paths, correlate textures, build geometry references, build shading
//! subgraphs and assign them. Every step checks what already exists, so a
//! second run over the same scene only adds what is missing.
//!
//! ## Example
//!
//! ```no_run
//! use mtlx_synth::pipeline::{Pipeline, PipelineConfig};
//! use mtlx_synth::scene::MemoryScene;
//!
//! let mut scene = MemoryScene::new();
//! let config = PipelineConfig::new("/textures/chair", "/obj/chair_fbx");
//! let report = Pipeline::new(config)
//!     .with_progress(|event| println!("{event:?}"))
//!     .run(&mut scene)
//!     .unwrap();
//! println!("{} materials", report.materials.len());
//! ```

mod config;

pub use config::*;

use serde::Serialize;

use crate::geom::GeometryReferenceBuilder;
use crate::material::{
    collect_identifiers, correlate_records, BuildOutcome, ChannelBinding, MaterialBuild,
    ShaderGraphBuilder, TextureFolder,
};
use crate::scene::{NodeKind, NodePath, SceneGraph};
use crate::util::{Error, Result};

/// Pipeline stage, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    Extract,
    Rewrite,
    Correlate,
    References,
    Shaders,
}

/// Progress notification delivered to the optional callback.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    StageStarted(Stage),
    ReferenceBuilt { source: NodePath, created: bool },
    MaterialBuilt { identifier: String, created: bool },
    Finished,
}

/// Top-level containers of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Containers {
    pub lopnet: NodePath,
    pub matlib: NodePath,
    pub geometries: NodePath,
    /// Whether this run created them.
    pub created: bool,
}

/// Per-material part of a [`RunReport`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaterialSummary {
    pub identifier: String,
    pub container: NodePath,
    /// Correlated texture filenames, scan order.
    pub textures: Vec<String>,
    /// Whether the subgraph was built by this run.
    pub created: bool,
    /// Channel bindings; empty when the subgraph was skipped.
    pub bindings: Vec<ChannelBinding>,
}

/// What a run did.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Materials in identifier discovery order.
    pub materials: Vec<MaterialSummary>,
    pub containers_created: bool,
    pub references_created: usize,
    pub references_skipped: usize,
    pub subgraphs_created: usize,
    pub subgraphs_skipped: usize,
}

impl RunReport {
    pub fn identifiers(&self) -> Vec<&str> {
        self.materials.iter().map(|m| m.identifier.as_str()).collect()
    }

    pub fn material(&self, identifier: &str) -> Option<&MaterialSummary> {
        self.materials.iter().find(|m| m.identifier == identifier)
    }
}

type ProgressFn<'a> = Box<dyn FnMut(&ProgressEvent) + 'a>;

/// Material and geometry synthesis over one scene.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    progress: Option<ProgressFn<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Receive progress events while running.
    pub fn with_progress(mut self, callback: impl FnMut(&ProgressEvent) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn emit(&mut self, event: ProgressEvent) {
        if let Some(callback) = self.progress.as_mut() {
            callback(&event);
        }
    }

    fn stage(&mut self, stage: Stage) {
        tracing::info!(?stage, "stage started");
        self.emit(ProgressEvent::StageStarted(stage));
    }

    /// Ensure the lopnet, material library and geometry subnet exist.
    ///
    /// A missing lopnet gets the whole tree. A lopnet missing either child is
    /// partial state and fails with [`Error::MissingContainer`].
    pub fn ensure_containers<S: SceneGraph + ?Sized>(&self, scene: &mut S) -> Result<Containers> {
        let stage = &self.config.stage_root;
        if !scene.exists(stage) {
            return Err(Error::missing_container(stage.as_str()));
        }

        let lopnet = self.config.lopnet_path();
        let matlib = self.config.matlib_path();
        let geometries = self.config.geometries_path();

        if !scene.exists(&lopnet) {
            scene.create_node(stage, NodeKind::Lopnet, &self.config.lopnet_name)?;
            scene.create_node(&lopnet, NodeKind::MaterialLibrary, &self.config.matlib_name)?;
            scene.create_input_node(&matlib, 0, NodeKind::Subnet, &self.config.geometries_name)?;
            tracing::info!(%lopnet, "created container tree");
            return Ok(Containers {
                lopnet,
                matlib,
                geometries,
                created: true,
            });
        }

        for path in [&matlib, &geometries] {
            if !scene.exists(path) {
                return Err(Error::missing_container(path.as_str()));
            }
        }
        Ok(Containers {
            lopnet,
            matlib,
            geometries,
            created: false,
        })
    }

    /// Run every stage against `scene`.
    ///
    /// Aborts on the first error; there is no partial-success report.
    pub fn run<S: SceneGraph>(&mut self, scene: &mut S) -> Result<RunReport> {
        self.config.validate()?;
        let folder = TextureFolder::scan(&self.config.texture_folder)?;
        let asset_root = self.config.asset_root.clone();
        if !scene.exists(&asset_root) {
            return Err(Error::not_found(asset_root.as_str()));
        }

        self.stage(Stage::Extract);
        let geos = scene.descendants(&asset_root, NodeKind::ObjGeometry)?;
        let mut records = collect_identifiers(&*scene, &geos, &self.config.material_source)?;

        let containers = self.ensure_containers(scene)?;

        if let Some(rewrite) = self.config.material_rewrite() {
            self.stage(Stage::Rewrite);
            rewrite.apply(scene, &geos)?;
        }

        self.stage(Stage::Correlate);
        correlate_records(&mut records, folder.files());

        self.stage(Stage::References);
        let references = GeometryReferenceBuilder::new(containers.geometries.clone())
            .with_path_prefix(self.config.geometry_path_prefix.as_str())
            .with_partition_attrib(self.config.bind_attrib.as_str())
            .build_all(scene, &geos)?;
        for reference in &references.created {
            self.emit(ProgressEvent::ReferenceBuilt {
                source: reference.source.clone(),
                created: true,
            });
        }
        for source in &references.skipped {
            self.emit(ProgressEvent::ReferenceBuilt {
                source: source.clone(),
                created: false,
            });
        }

        self.stage(Stage::Shaders);
        let shaders = ShaderGraphBuilder::new(containers.matlib.clone())
            .with_displacement(self.config.displacement());
        let builds = shaders.build_all(scene, &records, &folder)?;
        shaders.assign_materials(scene)?;

        let mut report = RunReport {
            containers_created: containers.created,
            references_created: references.created.len(),
            references_skipped: references.skipped.len(),
            ..Default::default()
        };
        for (build, record) in builds.into_iter().zip(records.iter()) {
            let MaterialBuild {
                identifier,
                container,
                outcome,
            } = build;
            let created = outcome.is_created();
            self.emit(ProgressEvent::MaterialBuilt {
                identifier: identifier.clone(),
                created,
            });
            let bindings = match outcome {
                BuildOutcome::Created(network) => {
                    report.subgraphs_created += 1;
                    network.bindings
                }
                BuildOutcome::Skipped => {
                    report.subgraphs_skipped += 1;
                    Vec::new()
                }
            };
            report.materials.push(MaterialSummary {
                identifier,
                container,
                textures: record.textures.clone(),
                created,
                bindings,
            });
        }

        tracing::info!(
            materials = report.materials.len(),
            subgraphs_created = report.subgraphs_created,
            references_created = report.references_created,
            "run finished"
        );
        self.emit(ProgressEvent::Finished);
        Ok(report)
    }
}
