//! Object, vertex and triangle counts shown by the host.

use super::{ObjectKind, Scene};

/// Scene statistics plus the last measured frame time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportStatistics {
    /// Visible objects below the scene root.
    pub objects: usize,
    /// Vertices of visible meshes and points.
    pub vertices: usize,
    /// Triangles of visible meshes.
    pub triangles: usize,
    /// Milliseconds spent submitting the last frame.
    pub frametime: f64,
}

impl ViewportStatistics {
    /// Count every visible descendant of each root-level object. Hidden
    /// objects hide their subtree. `frametime` is left at zero.
    #[must_use]
    pub fn compute(scene: &Scene) -> Self {
        let mut stats = Self::default();
        for &root in scene.root_children() {
            scene.traverse_visible(root, &mut |_, object| {
                stats.objects += 1;
                match &object.kind {
                    ObjectKind::Mesh { geometry, .. } => {
                        stats.vertices += geometry.vertex_count();
                        stats.triangles += geometry.triangle_count();
                    }
                    ObjectKind::Points { geometry, .. } => {
                        stats.vertices += geometry.vertex_count();
                    }
                    _ => {}
                }
            });
        }
        stats
    }

    /// Copy with the given frame time.
    #[must_use]
    pub fn with_frametime(mut self, frametime: f64) -> Self {
        self.frametime = frametime;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene::{
        Geometry, Light, LightKind, Material, MaterialKind, Object3D,
        ObjectTree,
    };
    use crate::util::color::Color;

    #[test]
    fn empty_scene() {
        let stats = ViewportStatistics::compute(&Scene::new());
        assert_eq!(stats, ViewportStatistics::default());
    }

    #[test]
    fn counts_meshes_points_and_others() {
        let mut scene = Scene::new();
        let cube = Arc::new(Geometry::unit_box());
        let material = Arc::new(Material::default());
        let _ = scene.add(Object3D::mesh(cube, material));
        let _ = scene.add(Object3D::light(Light::new(LightKind::Directional)));
        let cloud = Arc::new(Geometry::new(vec![glam::Vec3::ZERO; 7], None, None));
        let _ = scene.add(Object3D::new(ObjectKind::Points {
            geometry: cloud,
            material: Arc::new(Material::new(MaterialKind::Points, Color::WHITE)),
        }));

        let stats = ViewportStatistics::compute(&scene);
        assert_eq!(stats.objects, 3);
        assert_eq!(stats.vertices, 24 + 7);
        assert_eq!(stats.triangles, 12);
    }

    #[test]
    fn hidden_subtree_not_counted() {
        let mut scene = Scene::new();
        let cube = Arc::new(Geometry::unit_box());
        let material = Arc::new(Material::default());
        let mut group = Object3D::group();
        group.visible = false;
        let _ = scene.add(
            ObjectTree::leaf(group)
                .with_child(Object3D::mesh(cube.clone(), material.clone()).into()),
        );
        let _ = scene.add(
            ObjectTree::leaf(Object3D::group())
                .with_child(Object3D::mesh(cube, material).into()),
        );
        let stats = ViewportStatistics::compute(&scene);
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.triangles, 12);
    }
}
