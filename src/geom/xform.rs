//! Transform parameters of object-level nodes.
//!
//! Geometry references copy the transform of their source node verbatim:
//! translate, rotate, scale, uniform scale, pivot and pivot rotation are read
//! off the source and written onto the new transform node. Nothing is baked
//! or interpolated.

use glam::{DMat4, DQuat, DVec3, EulerRot};
use serde::{Deserialize, Serialize};

use crate::scene::{NodeConfig, NodeKind, NodePath, Parm, SceneGraph};
use crate::util::Result;

/// Parameter name triples, in copy order.
const TRANSLATE: [&str; 3] = ["tx", "ty", "tz"];
const ROTATE: [&str; 3] = ["rx", "ry", "rz"];
const SCALE: [&str; 3] = ["sx", "sy", "sz"];
const UNIFORM_SCALE: &str = "scale";
const PIVOT: [&str; 3] = ["px", "py", "pz"];
const PIVOT_ROTATE: [&str; 3] = ["prx", "pry", "prz"];

/// Transform-and-pivot parameters of a node.
///
/// Rotations are Euler angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    pub translate: DVec3,
    pub rotate: DVec3,
    pub scale: DVec3,
    pub uniform_scale: f64,
    pub pivot: DVec3,
    pub pivot_rotate: DVec3,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformParams {
    /// Identity transform (host defaults).
    pub const IDENTITY: Self = Self {
        translate: DVec3::ZERO,
        rotate: DVec3::ZERO,
        scale: DVec3::ONE,
        uniform_scale: 1.0,
        pivot: DVec3::ZERO,
        pivot_rotate: DVec3::ZERO,
    };

    /// Check if this is the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Read the transform of a node. Parameters the node lacks keep their defaults.
    pub fn read<S: SceneGraph + ?Sized>(scene: &S, path: &NodePath) -> Result<Self> {
        let read3 = |names: [&str; 3], default: DVec3| -> Result<DVec3> {
            let mut v = default;
            for (i, name) in names.iter().enumerate() {
                if let Some(value) = scene.eval_float(path, name)? {
                    v[i] = value;
                }
            }
            Ok(v)
        };

        let d = Self::IDENTITY;
        Ok(Self {
            translate: read3(TRANSLATE, d.translate)?,
            rotate: read3(ROTATE, d.rotate)?,
            scale: read3(SCALE, d.scale)?,
            uniform_scale: scene.eval_float(path, UNIFORM_SCALE)?.unwrap_or(d.uniform_scale),
            pivot: read3(PIVOT, d.pivot)?,
            pivot_rotate: read3(PIVOT_ROTATE, d.pivot_rotate)?,
        })
    }

    fn rotation(angles: DVec3) -> DQuat {
        // X first, then Y, then Z
        DQuat::from_euler(
            EulerRot::ZYX,
            angles.z.to_radians(),
            angles.y.to_radians(),
            angles.x.to_radians(),
        )
    }

    /// Local matrix: scale and rotate about the (rotated) pivot, then translate.
    pub fn matrix(&self) -> DMat4 {
        let pivot = DMat4::from_translation(self.pivot)
            * DMat4::from_quat(Self::rotation(self.pivot_rotate));
        DMat4::from_translation(self.translate)
            * pivot
            * DMat4::from_quat(Self::rotation(self.rotate))
            * DMat4::from_scale(self.scale * self.uniform_scale)
            * pivot.inverse()
    }
}

impl NodeConfig for TransformParams {
    fn kind(&self) -> NodeKind {
        NodeKind::Xform
    }

    fn to_parms(&self) -> Vec<Parm> {
        let mut parms = Vec::with_capacity(16);
        let mut push3 = |names: [&str; 3], v: DVec3| {
            for (name, value) in names.iter().zip(v.to_array()) {
                parms.push(Parm::new(*name, value));
            }
        };
        push3(TRANSLATE, self.translate);
        push3(ROTATE, self.rotate);
        push3(SCALE, self.scale);
        push3(PIVOT, self.pivot);
        push3(PIVOT_ROTATE, self.pivot_rotate);
        parms.push(Parm::new(UNIFORM_SCALE, self.uniform_scale));
        parms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, ParmValue};

    #[test]
    fn test_identity() {
        assert!(TransformParams::default().is_identity());
        let m = TransformParams::IDENTITY.matrix();
        assert!(m.abs_diff_eq(DMat4::IDENTITY, 1e-12));
    }

    #[test]
    fn test_read_defaults_and_values() {
        let mut scene = MemoryScene::new();
        let geo = scene
            .create_node(&NodePath::new("/obj"), NodeKind::ObjGeometry, "body")
            .unwrap();
        scene
            .set_parms(&geo, &[Parm::new("ty", 2.5), Parm::new("sx", 3), Parm::new("scale", 0.5)])
            .unwrap();

        let t = TransformParams::read(&scene, &geo).unwrap();
        assert_eq!(t.translate, DVec3::new(0.0, 2.5, 0.0));
        assert_eq!(t.scale, DVec3::new(3.0, 1.0, 1.0));
        assert_eq!(t.uniform_scale, 0.5);
        assert_eq!(t.pivot, DVec3::ZERO);
    }

    #[test]
    fn test_read_rejects_string() {
        let mut scene = MemoryScene::new();
        let geo = scene
            .create_node(&NodePath::new("/obj"), NodeKind::ObjGeometry, "body")
            .unwrap();
        scene.set_parms(&geo, &[Parm::new("tx", "$F")]).unwrap();
        assert!(TransformParams::read(&scene, &geo).is_err());
    }

    #[test]
    fn test_to_parms() {
        let t = TransformParams {
            rotate: DVec3::new(10.0, 20.0, 30.0),
            ..Default::default()
        };
        let parms = t.to_parms();
        assert_eq!(parms.len(), 16);
        assert_eq!(parms[4], Parm::new("ry", 20.0));
        assert_eq!(parms[15].value, ParmValue::Float(1.0));
    }

    #[test]
    fn test_matrix() {
        let t = TransformParams {
            translate: DVec3::new(1.0, 2.0, 3.0),
            uniform_scale: 2.0,
            ..Default::default()
        };
        let p = t.matrix().transform_point3(DVec3::new(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(DVec3::new(3.0, 2.0, 3.0), 1e-12));

        let r = TransformParams {
            rotate: DVec3::new(0.0, 0.0, 90.0),
            pivot: DVec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        // Rotating about the pivot leaves the pivot in place
        let p = r.matrix().transform_point3(DVec3::new(1.0, 0.0, 0.0));
        assert!(p.abs_diff_eq(DVec3::new(1.0, 0.0, 0.0), 1e-12));
    }
}
