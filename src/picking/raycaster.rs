//! Casting rays from the camera into the scene.

use glam::{Vec2, Vec3};

use super::ray::Ray;
use crate::camera::core::Camera;
use crate::scene::{NodeId, ObjectKind, Scene, Side};

/// A ray hit on a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// The object hit.
    pub node: NodeId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
    /// Triangle index for mesh hits, point index for point clouds.
    pub index: usize,
    /// Distance from the ray for point-cloud hits.
    pub distance_to_ray: Option<f32>,
}

/// Ray caster with near/far limits and a point-cloud pick radius.
#[derive(Debug, Clone)]
pub struct Raycaster {
    /// The world-space ray.
    pub ray: Ray,
    /// Hits closer than this are dropped.
    pub near: f32,
    /// Hits farther than this are dropped.
    pub far: f32,
    /// World-space pick radius for points.
    pub points_threshold: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            ray: Ray::default(),
            near: 0.0,
            far: f32::INFINITY,
            points_threshold: 1.0,
        }
    }
}

impl Raycaster {
    /// Aim through normalized device coordinates `ndc` (x and y in -1..1,
    /// +y up) of `camera`.
    pub fn set_from_camera(&mut self, ndc: Vec2, camera: &Camera) {
        if camera.projection.is_orthographic() {
            let origin = camera.unproject(ndc.extend(0.0));
            self.ray = Ray::new(origin, camera.world_direction());
        } else {
            let through = camera.unproject(ndc.extend(0.5));
            self.ray = Ray::new(camera.position, through - camera.position);
        }
    }

    /// Hits on `ids` (and their descendants when `recursive`), nearest
    /// first. Hidden objects are skipped.
    #[must_use]
    pub fn intersect_objects(
        &self,
        scene: &Scene,
        ids: &[NodeId],
        recursive: bool,
    ) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for &id in ids {
            self.intersect_object(scene, id, recursive, &mut hits);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn intersect_object(
        &self,
        scene: &Scene,
        id: NodeId,
        recursive: bool,
        hits: &mut Vec<Intersection>,
    ) {
        let Some(object) = scene.get(id) else {
            return;
        };
        if !object.visible {
            return;
        }
        match &object.kind {
            ObjectKind::Mesh { .. } => self.intersect_mesh(scene, id, hits),
            ObjectKind::Points { .. } => self.intersect_points(scene, id, hits),
            _ => {}
        }
        if recursive {
            for &child in scene.children(id) {
                self.intersect_object(scene, child, true, hits);
            }
        }
    }

    fn intersect_mesh(
        &self,
        scene: &Scene,
        id: NodeId,
        hits: &mut Vec<Intersection>,
    ) {
        let (Some(object), Some(world)) = (scene.get(id), scene.world_matrix(id))
        else {
            return;
        };
        let (Some(geometry), Some(material)) =
            (object.geometry(), object.material())
        else {
            return;
        };
        let local = self.ray.transformed(&world.inverse());
        if local.intersect_aabb(&geometry.bounding_box()).is_none() {
            return;
        }

        let mut best: Option<Intersection> = None;
        for face in 0..geometry.triangle_count() {
            let Some([a, b, c]) = geometry.triangle_positions(face) else {
                continue;
            };
            let t = match material.side {
                Side::Back => local.intersect_triangle(c, b, a, true),
                Side::Front => local.intersect_triangle(a, b, c, true),
                Side::Double => local.intersect_triangle(a, b, c, false),
            };
            let Some(t) = t else { continue };
            let point = world.transform_point3(local.at(t));
            let distance = self.ray.origin.distance(point);
            if distance < self.near || distance > self.far {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Intersection {
                    node: id,
                    distance,
                    point,
                    index: face,
                    distance_to_ray: None,
                });
            }
        }
        hits.extend(best);
    }

    fn intersect_points(
        &self,
        scene: &Scene,
        id: NodeId,
        hits: &mut Vec<Intersection>,
    ) {
        let (Some(object), Some(world)) = (scene.get(id), scene.world_matrix(id))
        else {
            return;
        };
        let Some(geometry) = object.geometry() else {
            return;
        };
        let scale = object.transform.scale;
        let local_threshold =
            self.points_threshold / ((scale.x + scale.y + scale.z) / 3.0);
        let threshold_sq = local_threshold * local_threshold;

        let local = self.ray.transformed(&world.inverse());
        let mut padded = geometry.bounding_box();
        padded.min -= Vec3::splat(local_threshold);
        padded.max += Vec3::splat(local_threshold);
        if local.intersect_aabb(&padded).is_none() {
            return;
        }

        for (index, &p) in geometry.positions.iter().enumerate() {
            let d2 = local.distance_sq_to_point(p);
            if d2 >= threshold_sq {
                continue;
            }
            let point = world.transform_point3(local.closest_point_to_point(p));
            let distance = self.ray.origin.distance(point);
            if distance < self.near || distance > self.far {
                continue;
            }
            hits.push(Intersection {
                node: id,
                distance,
                point,
                index,
                distance_to_ray: Some(d2.sqrt()),
            });
        }
    }
}
