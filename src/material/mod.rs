//! Material synthesis - from raw material paths and loose textures to shading networks.
//!
//! Imported geometry carries a raw material path per primitive
//! (`/shop/materials/rustediron`). This module turns those into canonical
//! material identifiers, matches texture files against them, classifies each
//! file into a PBR channel and builds one MaterialX subgraph per material.
//!
//! ## Key Concepts
//!
//! - **Material identifier**: trailing word run of a raw material path
//! - **Correlation**: a texture belongs to every identifier its name contains
//! - **Channel**: the shading slot a texture feeds (base color, roughness, ...)
//! - **Shader network**: planned node set, applied to the scene in one pass
//!
//! ## Example
//!
//! ```
//! use mtlx_synth::material::{classify, correlate, extract_identifier, ChannelCategory};
//!
//! let id = extract_identifier("/shop/materials/rustediron");
//! assert_eq!(id, "rustediron");
//!
//! let files = vec!["rustediron_basecolor.png".to_string(), "wood_normal.png".to_string()];
//! let matched = correlate(id, &files);
//! assert_eq!(matched, vec!["rustediron_basecolor.png".to_string()]);
//! assert_eq!(classify(&matched[0], id), vec![ChannelCategory::BaseColor]);
//! ```

mod builder;
mod channel;
mod correlate;
mod identifier;
mod network;

pub use builder::*;
pub use channel::*;
pub use correlate::*;
pub use identifier::*;
pub use network::*;

/// Per-primitive attribute holding the imported material path.
pub const MATERIAL_PATH_ATTRIB: &str = "shop_materialpath";

/// Per-primitive attribute the geometry references partition on.
pub const MATERIAL_BIND_ATTRIB: &str = "materialBind";

/// Per-primitive attribute read by the stage exporter to resolve bound materials.
pub const USD_MATERIAL_PATH_ATTRIB: &str = "usdmaterialpath";

/// Prefix of normalized material paths.
pub const MATERIAL_PREFIX: &str = "/materials";
