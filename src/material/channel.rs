//! PBR channel classification of texture filenames.
//!
//! Classification is plain case-insensitive substring matching against a
//! fixed synonym table. The material identifier is cut out of the filename
//! first so a material called `Specular_Paint` does not make every one of its
//! textures a specular map.

use serde::{Deserialize, Serialize};

use crate::scene::ImageSignature;

/// Shading channel a texture can feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelCategory {
    BaseColor,
    Roughness,
    Specular,
    Metallic,
    Normal,
}

/// Which shader of a subgraph owns a channel's input slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderRole {
    /// The core PBR surface shader.
    Surface,
    /// The displacement shader.
    Displacement,
}

impl ChannelCategory {
    /// All channels in slot-binding priority order.
    pub const ALL: [ChannelCategory; 5] = [
        Self::BaseColor,
        Self::Roughness,
        Self::Specular,
        Self::Metallic,
        Self::Normal,
    ];

    /// Lowercase filename tokens that select this channel.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::BaseColor => &["base", "diffuse", "albedo", "diff"],
            Self::Metallic => &["metallic", "metalness"],
            Self::Specular => &["specular", "spec"],
            Self::Roughness => &["roughness", "rough", "gloss", "glossiness"],
            Self::Normal => &["normal", "nrm"],
        }
    }

    /// Shader owning the slot and the slot's input name on it.
    pub fn slot(&self) -> (ShaderRole, &'static str) {
        match self {
            Self::BaseColor => (ShaderRole::Surface, "base_color"),
            Self::Metallic => (ShaderRole::Surface, "metalness"),
            Self::Specular => (ShaderRole::Surface, "specular"),
            Self::Roughness => (ShaderRole::Surface, "specular_roughness"),
            Self::Normal => (ShaderRole::Displacement, "displacement"),
        }
    }

    /// Name of the image node feeding this channel.
    pub fn node_name(&self) -> &'static str {
        match self {
            Self::BaseColor => "base_color",
            Self::Metallic => "metalness",
            Self::Specular => "specular",
            Self::Roughness => "specular_roughness",
            Self::Normal => "normal",
        }
    }

    /// Output signature of the image node feeding this channel.
    pub fn signature(&self) -> ImageSignature {
        match self {
            Self::BaseColor => ImageSignature::Color3,
            Self::Normal => ImageSignature::Vector3,
            _ => ImageSignature::Float,
        }
    }
}

/// Lowercase filename with the first occurrence of the identifier removed.
pub fn strip_identifier(filename: &str, identifier: &str) -> String {
    let lower = filename.to_lowercase();
    if identifier.is_empty() {
        return lower;
    }
    lower.replacen(&identifier.to_lowercase(), "", 1)
}

/// First synonym of `channel` found in an already stripped filename.
pub fn matching_synonym(channel: ChannelCategory, stripped: &str) -> Option<&'static str> {
    channel
        .synonyms()
        .iter()
        .copied()
        .find(|token| stripped.contains(token))
}

/// Whether a filename correlated under `identifier` feeds `channel`.
pub fn feeds_channel(filename: &str, identifier: &str, channel: ChannelCategory) -> bool {
    matching_synonym(channel, &strip_identifier(filename, identifier)).is_some()
}

/// Every channel a filename feeds, in priority order.
pub fn classify(filename: &str, identifier: &str) -> Vec<ChannelCategory> {
    let stripped = strip_identifier(filename, identifier);
    ChannelCategory::ALL
        .into_iter()
        .filter(|&c| matching_synonym(c, &stripped).is_some())
        .collect()
}

/// First filename in `textures` that feeds `channel`.
pub fn find_texture<'a>(
    textures: &'a [String],
    identifier: &str,
    channel: ChannelCategory,
) -> Option<&'a str> {
    textures
        .iter()
        .find(|f| feeds_channel(f, identifier, channel))
        .map(String::as_str)
}
