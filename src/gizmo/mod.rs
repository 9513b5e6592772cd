//! Translate / rotate / scale gizmo.
//!
//! [`TransformControls`] owns the gizmo state: the attached node, the
//! hovered and dragged handle, and the drag maths that write the node's
//! transform. [`GizmoFrame`] caches the decomposed world, parent and camera
//! transforms the maths runs against; [`handles`] holds the handle shapes
//! used for both hit testing and drawing.

pub mod controls;
pub mod frame;
pub mod handles;

pub use controls::{GizmoEvent, TransformControls};
pub use frame::GizmoFrame;
use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which transform a drag applies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GizmoMode {
    /// Move along axes and planes.
    #[default]
    Translate,
    /// Rotate about an axis.
    Rotate,
    /// Scale along axes or uniformly.
    Scale,
}

impl std::fmt::Display for GizmoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// Coordinate space the handles are aligned to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpace {
    /// World axes.
    #[default]
    World,
    /// The attached object's axes.
    Local,
}

impl TransformSpace {
    /// The other space.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::World => Self::Local,
            Self::Local => Self::World,
        }
    }
}

impl std::fmt::Display for TransformSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::World => "world",
            Self::Local => "local",
        })
    }
}

/// A grabbable part of the gizmo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    /// X axis arrow, scale handle or ring.
    X,
    /// Y axis arrow, scale handle or ring.
    Y,
    /// Z axis arrow, scale handle or ring.
    Z,
    /// Translate in the XY plane.
    XY,
    /// Translate in the YZ plane.
    YZ,
    /// Translate in the XZ plane.
    XZ,
    /// Centre handle: free translate or uniform scale.
    XYZ,
}

impl GizmoAxis {
    /// 1.0 for every component this handle moves, 0.0 otherwise.
    #[must_use]
    pub fn mask(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
            Self::XY => Vec3::new(1.0, 1.0, 0.0),
            Self::YZ => Vec3::new(0.0, 1.0, 1.0),
            Self::XZ => Vec3::new(1.0, 0.0, 1.0),
            Self::XYZ => Vec3::ONE,
        }
    }

    /// Unit direction of a single axis; `None` for planes and the centre.
    #[must_use]
    pub fn direction(self) -> Option<Vec3> {
        match self {
            Self::X => Some(Vec3::X),
            Self::Y => Some(Vec3::Y),
            Self::Z => Some(Vec3::Z),
            _ => None,
        }
    }

    /// Normal of a plane handle; `None` for axes and the centre.
    #[must_use]
    pub fn plane_normal(self) -> Option<Vec3> {
        match self {
            Self::XY => Some(Vec3::Z),
            Self::YZ => Some(Vec3::X),
            Self::XZ => Some(Vec3::Y),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&GizmoMode::Rotate).unwrap();
        assert_eq!(json, "\"rotate\"");
        let space: TransformSpace = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(space, TransformSpace::Local);
    }

    #[test]
    fn space_toggles() {
        assert_eq!(TransformSpace::World.toggled(), TransformSpace::Local);
        assert_eq!(TransformSpace::Local.toggled(), TransformSpace::World);
    }

    #[test]
    fn axis_masks() {
        assert_eq!(GizmoAxis::XZ.mask(), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(GizmoAxis::Y.direction(), Some(Vec3::Y));
        assert_eq!(GizmoAxis::XY.plane_normal(), Some(Vec3::Z));
        assert!(GizmoAxis::XYZ.direction().is_none());
    }
}
