//! Geometry references for the stage.
//!
//! - [`TransformParams`] - transform-and-pivot parameters copied off source nodes
//! - [`MaterialPathRewrite`] - destructive material path normalization
//! - [`GeometryReferenceBuilder`] - live references fanned into one merge

pub mod reference;
pub mod xform;

pub use reference::{
    binding_key, GeometryReference, GeometryReferenceBuilder, MaterialPathRewrite, ReferenceSet,
    DEFAULT_PATH_PREFIX, MERGE_NODE, OUTPUT_NODE,
};
pub use xform::TransformParams;
