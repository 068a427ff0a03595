//! MaterialX standard library node definitions
//!
//! Input ordering, types and defaults for the handful of stdlib nodes a
//! texture-driven shading network needs. Hosts expose node inputs by index,
//! so the order here matches the nodedefs shipped with MaterialX.
//!
//! ## References
//! - [MaterialX stdlib](https://github.com/AcademySoftwareFoundation/MaterialX/tree/main/libraries/stdlib)
//! - [Autodesk Standard Surface](https://autodesk.github.io/standard-surface/)
//!
//! ## Usage
//!
//! ```
//! use mtlx_stdlib::STANDARD_SURFACE;
//!
//! assert_eq!(STANDARD_SURFACE.input_index("base_color"), Some(1));
//! assert_eq!(STANDARD_SURFACE.input_index("metalness"), Some(3));
//! ```

mod nodedefs;

pub use nodedefs::{DISPLACEMENT, DISPLACEMENT_VECTOR3, IMAGE, STANDARD_SURFACE, TEXCOORD};

use glam::{Vec2, Vec3};

/// Value type of a node input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    Float,
    Integer,
    Boolean,
    Color3,
    Vector2,
    Vector3,
    String,
    Filename,
}

impl InputType {
    /// MaterialX type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Color3 => "color3",
            Self::Vector2 => "vector2",
            Self::Vector3 => "vector3",
            Self::String => "string",
            Self::Filename => "filename",
        }
    }
}

/// Default value of a node input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputDefault {
    /// No authored default (geometric inputs like `normal`).
    None,
    Float(f32),
    Integer(i32),
    Boolean(bool),
    Color3(Vec3),
    Vector2(Vec2),
    Vector3(Vec3),
    String(&'static str),
}

/// A single input of a node definition.
#[derive(Clone, Copy, Debug)]
pub struct InputDef {
    pub name: &'static str,
    pub ty: InputType,
    pub default: InputDefault,
}

impl InputDef {
    pub(crate) const fn new(name: &'static str, ty: InputType, default: InputDefault) -> Self {
        Self { name, ty, default }
    }
}

/// Node definition: category name plus ordered inputs.
#[derive(Clone, Copy, Debug)]
pub struct NodeDef {
    /// MaterialX node category (e.g. "standard_surface").
    pub category: &'static str,
    /// Output type of the node.
    pub output: &'static str,
    /// Inputs in host order.
    pub inputs: &'static [InputDef],
}

impl NodeDef {
    /// Index of the input with the given name.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|i| i.name == name)
    }

    /// Input definition by name.
    pub fn input(&self, name: &str) -> Option<&InputDef> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// Input names in order.
    pub fn input_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inputs.iter().map(|i| i.name)
    }

    /// Number of inputs.
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }
}
