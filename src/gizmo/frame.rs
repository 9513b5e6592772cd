//! World, parent and camera decomposition for the attached node.

use glam::{Mat4, Quat, Vec3};

use crate::camera::core::{Camera, Projection};
use crate::scene::{NodeId, Scene};

/// Decomposed transforms the gizmo maths runs against, refreshed before
/// every hover, drag and draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoFrame {
    /// Attached node's world position.
    pub world_position: Vec3,
    /// Attached node's world rotation.
    pub world_quaternion: Quat,
    /// Attached node's world scale.
    pub world_scale: Vec3,
    /// Inverse of `world_quaternion`.
    pub world_quaternion_inv: Quat,
    /// Parent world position (origin for root-level nodes).
    pub parent_position: Vec3,
    /// Parent world rotation.
    pub parent_quaternion: Quat,
    /// Parent world scale.
    pub parent_scale: Vec3,
    /// Inverse of `parent_quaternion`.
    pub parent_quaternion_inv: Quat,
    /// Camera world position.
    pub camera_position: Vec3,
    /// Camera world rotation.
    pub camera_quaternion: Quat,
    /// Unit vector from the gizmo towards the viewer.
    pub eye: Vec3,
}

impl Default for GizmoFrame {
    fn default() -> Self {
        Self {
            world_position: Vec3::ZERO,
            world_quaternion: Quat::IDENTITY,
            world_scale: Vec3::ONE,
            world_quaternion_inv: Quat::IDENTITY,
            parent_position: Vec3::ZERO,
            parent_quaternion: Quat::IDENTITY,
            parent_scale: Vec3::ONE,
            parent_quaternion_inv: Quat::IDENTITY,
            camera_position: Vec3::ZERO,
            camera_quaternion: Quat::IDENTITY,
            eye: Vec3::Z,
        }
    }
}

impl GizmoFrame {
    /// Refresh from the scene and camera.
    ///
    /// A node that is no longer part of the scene graph keeps its last
    /// decomposition and logs an error.
    pub fn update(&mut self, scene: &Scene, node: Option<NodeId>, camera: &Camera) {
        if let Some(node) = node {
            if let Some(world) = scene.world_matrix(node) {
                let parent = scene
                    .parent(node)
                    .and_then(|p| scene.world_matrix(p))
                    .unwrap_or(Mat4::IDENTITY);
                (self.parent_scale, self.parent_quaternion, self.parent_position) =
                    parent.to_scale_rotation_translation();
                (self.world_scale, self.world_quaternion, self.world_position) =
                    world.to_scale_rotation_translation();
            } else {
                log::error!(
                    "transform gizmo: the attached object must be part of the scene graph"
                );
            }
            self.parent_quaternion_inv = self.parent_quaternion.inverse();
            self.world_quaternion_inv = self.world_quaternion.inverse();
        }

        self.camera_position = camera.position;
        self.camera_quaternion = camera.rotation;
        self.eye = if camera.projection.is_orthographic() {
            -camera.world_direction()
        } else {
            (self.camera_position - self.world_position).normalize_or(Vec3::Z)
        };
    }

    /// World-space size of one gizmo unit, keeping the handles a constant
    /// size on screen.
    #[must_use]
    pub fn screen_factor(&self, camera: &Camera) -> f32 {
        match camera.projection {
            Projection::Perspective { fov, .. } => {
                let half = (fov.to_radians() * 0.5).tan();
                self.world_position.distance(self.camera_position)
                    * (1.9 * half).min(7.0)
            }
            Projection::Orthographic {
                top, bottom, zoom, ..
            } => (top - bottom) / zoom,
        }
    }

    /// Handle scale for a gizmo of the given size multiplier.
    #[must_use]
    pub fn handle_scale(&self, camera: &Camera, size: f32) -> f32 {
        self.screen_factor(camera) * size / 4.0
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::scene::{ObjectTree, Object3D, Transform};

    fn camera_at(position: Vec3) -> Camera {
        let mut camera = Camera::new(Projection::default());
        camera.position = position;
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn root_object_has_identity_parent() {
        let mut scene = Scene::new();
        let id = scene.add(Object3D::group().with_position(Vec3::new(1.0, 2.0, 3.0)));
        let mut frame = GizmoFrame::default();
        frame.update(&scene, Some(id), &camera_at(Vec3::new(0.0, 0.0, 10.0)));
        assert_eq!(frame.parent_quaternion, Quat::IDENTITY);
        assert_eq!(frame.parent_scale, Vec3::ONE);
        assert!(approx(frame.world_position, Vec3::new(1.0, 2.0, 3.0)));
        assert!(approx(frame.eye, (Vec3::new(-1.0, -2.0, 7.0)).normalize()));
    }

    #[test]
    fn child_decomposes_parent() {
        let mut scene = Scene::new();
        let mut parent = Object3D::group();
        parent.transform = Transform {
            position: Vec3::new(0.0, 1.0, 0.0),
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let tree = ObjectTree::leaf(parent)
            .with_child(Object3D::group().with_position(Vec3::X).into());
        let root = scene.add(tree);
        let child = scene.children(root)[0];

        let mut frame = GizmoFrame::default();
        frame.update(&scene, Some(child), &camera_at(Vec3::new(0.0, 0.0, 10.0)));
        assert!(approx(frame.parent_position, Vec3::new(0.0, 1.0, 0.0)));
        assert!(approx(frame.parent_scale, Vec3::splat(2.0)));
        assert!(frame.parent_quaternion.abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-5));
        // +X rotated a quarter turn about Y is -Z, doubled by the parent scale
        assert!(approx(frame.world_position, Vec3::new(0.0, 1.0, -2.0)));
        assert!(approx(frame.world_scale, Vec3::splat(2.0)));
        assert!(
            (frame.parent_quaternion_inv * frame.parent_quaternion)
                .abs_diff_eq(Quat::IDENTITY, 1e-5)
        );
    }

    #[test]
    fn detached_node_keeps_last_decomposition() {
        let mut scene = Scene::new();
        let id = scene.add(Object3D::group().with_position(Vec3::new(4.0, 0.0, 0.0)));
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut frame = GizmoFrame::default();
        frame.update(&scene, Some(id), &camera);
        let _ = scene.remove(id);
        frame.update(&scene, Some(id), &camera);
        assert!(approx(frame.world_position, Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn perspective_screen_factor() {
        let scene = Scene::new();
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut frame = GizmoFrame::default();
        frame.update(&scene, None, &camera);
        let expected = 10.0 * 1.9 * 25f32.to_radians().tan();
        assert!((frame.screen_factor(&camera) - expected).abs() < 1e-4);
        assert!((frame.handle_scale(&camera, 2.0) - expected / 2.0).abs() < 1e-4);
    }

    #[test]
    fn orthographic_eye_and_factor() {
        let mut camera = Camera::new(Projection::Orthographic {
            left: -4.0,
            right: 4.0,
            top: 3.0,
            bottom: -3.0,
            near: 0.1,
            far: 100.0,
            zoom: 2.0,
        });
        camera.position = Vec3::new(0.0, 10.0, 0.0);
        camera.look_at(Vec3::ZERO);
        let mut frame = GizmoFrame::default();
        frame.update(&Scene::new(), None, &camera);
        assert!(approx(frame.eye, Vec3::Y));
        assert!((frame.screen_factor(&camera) - 3.0).abs() < 1e-6);
    }
}
