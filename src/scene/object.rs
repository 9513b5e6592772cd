//! Scene nodes: transform, visibility and what the node draws.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use super::geometry::Geometry;
use super::material::Material;
use crate::camera::core::Projection;
use crate::util::color::Color;
use crate::util::id::generate_uuid;

/// Position, rotation and scale relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Transform at `position` with no rotation or scale.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Decompose a local matrix.
    #[must_use]
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Local matrix (scale, then rotate, then translate).
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.position,
        )
    }
}

/// Kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform light from everywhere.
    Ambient,
    /// Parallel rays from the light position towards the origin.
    Directional,
    /// Omnidirectional from a point.
    Point,
    /// Cone from a point.
    Spot,
    /// Sky/ground gradient.
    Hemisphere,
}

/// Light source parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Kind of light.
    pub kind: LightKind,
    /// Light colour.
    pub color: Color,
    /// Brightness multiplier.
    pub intensity: f32,
}

impl Light {
    /// White light of intensity 1.
    #[must_use]
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

/// What a node contributes to the scene.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Transform-only container.
    Group,
    /// Triangle mesh.
    Mesh {
        /// Shared geometry.
        geometry: Arc<Geometry>,
        /// Shared material.
        material: Arc<Material>,
    },
    /// Point cloud using the geometry's positions.
    Points {
        /// Shared geometry.
        geometry: Arc<Geometry>,
        /// Shared material.
        material: Arc<Material>,
    },
    /// A camera placed in the scene.
    Camera(Projection),
    /// A light source.
    Light(Light),
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct Object3D {
    /// Stable identifier from scene JSON or generated.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// What the node draws.
    pub kind: ObjectKind,
    /// Local transform.
    pub transform: Transform,
    /// Up direction, used by cameras when looking at a target.
    pub up: Vec3,
    /// Hidden objects and their descendants are not drawn, picked or counted.
    pub visible: bool,
    /// Free-form data carried through from scene JSON.
    pub user_data: serde_json::Value,
}

impl Object3D {
    /// Visible node at the origin with a generated uuid.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            uuid: generate_uuid(),
            name: String::new(),
            kind,
            transform: Transform::default(),
            up: Vec3::Y,
            visible: true,
            user_data: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Empty group.
    #[must_use]
    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    /// Mesh of `geometry` drawn with `material`.
    #[must_use]
    pub fn mesh(geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self::new(ObjectKind::Mesh { geometry, material })
    }

    /// Light source.
    #[must_use]
    pub fn light(light: Light) -> Self {
        Self::new(ObjectKind::Light(light))
    }

    /// Builder-style name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style position.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Geometry drawn by meshes and points.
    #[must_use]
    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        match &self.kind {
            ObjectKind::Mesh { geometry, .. }
            | ObjectKind::Points { geometry, .. } => Some(geometry),
            _ => None,
        }
    }

    /// Material of meshes and points.
    #[must_use]
    pub fn material(&self) -> Option<&Arc<Material>> {
        match &self.kind {
            ObjectKind::Mesh { material, .. }
            | ObjectKind::Points { material, .. } => Some(material),
            _ => None,
        }
    }

    /// Whether this is a mesh.
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, ObjectKind::Mesh { .. })
    }

    /// Whether this is a point cloud.
    #[must_use]
    pub fn is_points(&self) -> bool {
        matches!(self.kind, ObjectKind::Points { .. })
    }

    /// Short type name for logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ObjectKind::Group => "Group",
            ObjectKind::Mesh { .. } => "Mesh",
            ObjectKind::Points { .. } => "Points",
            ObjectKind::Camera(_) => "Camera",
            ObjectKind::Light(_) => "Light",
        }
    }
}

/// An object with its descendants, detached from any scene. This is what
/// the loader produces and what is inserted into or removed from a scene.
#[derive(Debug, Clone)]
pub struct ObjectTree {
    /// The subtree root.
    pub object: Object3D,
    /// Children in draw order.
    pub children: Vec<ObjectTree>,
}

impl ObjectTree {
    /// Leaf tree.
    #[must_use]
    pub fn leaf(object: Object3D) -> Self {
        Self {
            object,
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Pre-order visit of every object in the tree.
    pub fn traverse(&self, f: &mut impl FnMut(&Object3D)) {
        f(&self.object);
        for child in &self.children {
            child.traverse(f);
        }
    }

    /// Number of objects in the tree.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

impl From<Object3D> for ObjectTree {
    fn from(object: Object3D) -> Self {
        Self::leaf(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_matrix_round_trip() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::new(2.0, 1.0, 0.5),
        };
        let back = Transform::from_matrix(&t.matrix());
        assert!((back.position - t.position).length() < 1e-5);
        assert!((back.scale - t.scale).length() < 1e-5);
        assert!(back.rotation.dot(t.rotation).abs() > 0.9999);
    }

    #[test]
    fn tree_len_and_traverse() {
        let tree = ObjectTree::leaf(Object3D::group().with_name("root"))
            .with_child(Object3D::group().with_name("a").into())
            .with_child(
                ObjectTree::leaf(Object3D::group().with_name("b"))
                    .with_child(Object3D::group().with_name("c").into()),
            );
        assert_eq!(tree.count(), 4);
        let mut names = Vec::new();
        tree.traverse(&mut |o| names.push(o.name.clone()));
        assert_eq!(names, ["root", "a", "b", "c"]);
    }
}
