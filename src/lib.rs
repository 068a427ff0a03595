//! # mtlx-synth
//!
//! Synthesizes MaterialX shading networks and geometry references from an
//! imported asset hierarchy and a folder of loose texture files.
//!
//! Imported geometry carries raw material paths per primitive. The engine
//! derives a material identifier from each, matches texture files to the
//! identifiers by name, classifies every file into a PBR channel and builds
//! one MaterialX subgraph per material. Alongside, each source geometry node
//! gets a live reference with its transform copied, merged into one stage
//! aggregate and partitioned on the material binding.
//!
//! ## Modules
//!
//! - [`util`] - Errors and logging setup
//! - [`scene`] - Scene-graph capability trait, typed node configs, in-memory scene
//! - [`material`] - Identifiers, correlation, channel classification, shader graphs
//! - [`geom`] - Transforms, material path rewrite, geometry references
//! - [`pipeline`] - Configuration and run orchestration
//!
//! ## Example
//!
//! ```ignore
//! use mtlx_synth::prelude::*;
//!
//! let mut scene = MemoryScene::new();
//! let config = PipelineConfig::load("pipeline.json")?;
//! let report = Pipeline::new(config).run(&mut scene)?;
//!
//! for material in &report.materials {
//!     println!("{} -> {}", material.identifier, material.container);
//! }
//! ```

pub mod util;
pub mod scene;
pub mod material;
pub mod geom;
pub mod pipeline;

// Re-export commonly used types
pub use util::{Error, Result};
pub use pipeline::{Pipeline, PipelineConfig, RunReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{init_logging, Error, Result};
    pub use crate::scene::{MemoryScene, NodeKind, NodePath, SceneGraph};
    pub use crate::material::{ChannelCategory, MaterialRecords, ShaderGraphBuilder, TextureFolder};
    pub use crate::geom::{GeometryReferenceBuilder, TransformParams};
    pub use crate::pipeline::{Pipeline, PipelineConfig, ProgressEvent, RunReport, Stage};
}
