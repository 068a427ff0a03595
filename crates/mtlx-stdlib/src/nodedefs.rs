//! Node definition tables
//!
//! Transcribed from `stdlib_defs.mtlx` and `standard_surface.mtlx`.
//! All color defaults are linear.

use glam::{Vec2, Vec3};

use crate::{InputDef, InputDefault as D, InputType as T, NodeDef};

const ONE: D = D::Color3(Vec3::new(1.0, 1.0, 1.0));

/// `ND_standard_surface_surfaceshader`
pub const STANDARD_SURFACE: NodeDef = NodeDef {
    category: "standard_surface",
    output: "surfaceshader",
    inputs: &[
        InputDef::new("base", T::Float, D::Float(1.0)),
        InputDef::new("base_color", T::Color3, D::Color3(Vec3::new(0.8, 0.8, 0.8))),
        InputDef::new("diffuse_roughness", T::Float, D::Float(0.0)),
        InputDef::new("metalness", T::Float, D::Float(0.0)),
        InputDef::new("specular", T::Float, D::Float(1.0)),
        InputDef::new("specular_color", T::Color3, ONE),
        InputDef::new("specular_roughness", T::Float, D::Float(0.2)),
        InputDef::new("specular_IOR", T::Float, D::Float(1.5)),
        InputDef::new("specular_anisotropy", T::Float, D::Float(0.0)),
        InputDef::new("specular_rotation", T::Float, D::Float(0.0)),
        InputDef::new("transmission", T::Float, D::Float(0.0)),
        InputDef::new("transmission_color", T::Color3, ONE),
        InputDef::new("transmission_depth", T::Float, D::Float(0.0)),
        InputDef::new("transmission_scatter", T::Color3, D::Color3(Vec3::ZERO)),
        InputDef::new("transmission_scatter_anisotropy", T::Float, D::Float(0.0)),
        InputDef::new("transmission_dispersion", T::Float, D::Float(0.0)),
        InputDef::new("transmission_extra_roughness", T::Float, D::Float(0.0)),
        InputDef::new("subsurface", T::Float, D::Float(0.0)),
        InputDef::new("subsurface_color", T::Color3, ONE),
        InputDef::new("subsurface_radius", T::Color3, ONE),
        InputDef::new("subsurface_scale", T::Float, D::Float(1.0)),
        InputDef::new("subsurface_anisotropy", T::Float, D::Float(0.0)),
        InputDef::new("sheen", T::Float, D::Float(0.0)),
        InputDef::new("sheen_color", T::Color3, ONE),
        InputDef::new("sheen_roughness", T::Float, D::Float(0.3)),
        InputDef::new("coat", T::Float, D::Float(0.0)),
        InputDef::new("coat_color", T::Color3, ONE),
        InputDef::new("coat_roughness", T::Float, D::Float(0.1)),
        InputDef::new("coat_anisotropy", T::Float, D::Float(0.0)),
        InputDef::new("coat_rotation", T::Float, D::Float(0.0)),
        InputDef::new("coat_IOR", T::Float, D::Float(1.5)),
        InputDef::new("coat_normal", T::Vector3, D::None),
        InputDef::new("coat_affect_color", T::Float, D::Float(0.0)),
        InputDef::new("coat_affect_roughness", T::Float, D::Float(0.0)),
        InputDef::new("thin_film_thickness", T::Float, D::Float(0.0)),
        InputDef::new("thin_film_IOR", T::Float, D::Float(1.5)),
        InputDef::new("emission", T::Float, D::Float(0.0)),
        InputDef::new("emission_color", T::Color3, ONE),
        InputDef::new("opacity", T::Color3, ONE),
        InputDef::new("thin_walled", T::Boolean, D::Boolean(false)),
        InputDef::new("normal", T::Vector3, D::None),
        InputDef::new("tangent", T::Vector3, D::None),
    ],
};

/// `ND_displacement_float`
pub const DISPLACEMENT: NodeDef = NodeDef {
    category: "displacement",
    output: "displacementshader",
    inputs: &[
        InputDef::new("displacement", T::Float, D::Float(0.0)),
        InputDef::new("scale", T::Float, D::Float(1.0)),
    ],
};

/// `ND_displacement_vector3`
pub const DISPLACEMENT_VECTOR3: NodeDef = NodeDef {
    category: "displacement",
    output: "displacementshader",
    inputs: &[
        InputDef::new("displacement", T::Vector3, D::Vector3(Vec3::ZERO)),
        InputDef::new("scale", T::Float, D::Float(1.0)),
    ],
};

/// `ND_image_color3`
pub const IMAGE: NodeDef = NodeDef {
    category: "image",
    output: "color3",
    inputs: &[
        InputDef::new("file", T::Filename, D::String("")),
        InputDef::new("layer", T::String, D::String("")),
        InputDef::new("default", T::Color3, D::Color3(Vec3::ZERO)),
        InputDef::new("texcoord", T::Vector2, D::None),
        InputDef::new("uaddressmode", T::String, D::String("periodic")),
        InputDef::new("vaddressmode", T::String, D::String("periodic")),
        InputDef::new("filtertype", T::String, D::String("linear")),
        InputDef::new("framerange", T::String, D::String("")),
        InputDef::new("frameoffset", T::Integer, D::Integer(0)),
        InputDef::new("frameendaction", T::String, D::String("constant")),
        InputDef::new("uvtiling", T::Vector2, D::Vector2(Vec2::new(1.0, 1.0))),
        InputDef::new("uvoffset", T::Vector2, D::Vector2(Vec2::ZERO)),
    ],
};

/// `ND_texcoord_vector2`
pub const TEXCOORD: NodeDef = NodeDef {
    category: "texcoord",
    output: "vector2",
    inputs: &[InputDef::new("index", T::Integer, D::Integer(0))],
};
