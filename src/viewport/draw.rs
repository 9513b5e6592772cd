//! Flattening the scene graph into world-space draw lists.

use glam::{Mat3, Mat4, Vec3};

use super::frame::{FrameData, LineVertex, MeshVertex, PointInstance};
use super::overlay::box_edges;
use crate::camera::core::{Camera, LightUniform};
use crate::scene::{Geometry, LightKind, Material, ObjectKind, Scene, Side};

/// Ambient term used when the scene has no lights of its own.
const HEADLAMP_AMBIENT: f32 = 0.2;

/// Key light for the lit shader: the first visible directional, point or
/// spot light, shining towards the origin. Ambient and hemisphere lights
/// add to the ambient term. A scene with no key light gets a headlamp
/// along the view direction.
pub(crate) fn key_light(scene: &Scene, camera: &Camera) -> LightUniform {
    let mut ambient = 0.0;
    let mut any_light = false;
    let mut key = None;
    for id in scene.visible_objects() {
        let Some(object) = scene.get(id) else { continue };
        let ObjectKind::Light(light) = &object.kind else { continue };
        any_light = true;
        let luminance = light.color.to_array().iter().sum::<f32>() / 3.0;
        match light.kind {
            LightKind::Ambient | LightKind::Hemisphere => {
                ambient += light.intensity * luminance;
            }
            LightKind::Directional | LightKind::Point | LightKind::Spot => {
                if key.is_none() {
                    let position = scene.world_position(id).unwrap_or(Vec3::Y);
                    let direction = (-position).normalize_or(Vec3::NEG_Y);
                    key = Some((direction, Vec3::from(light.color.to_array()), light.intensity));
                }
            }
        }
    }
    let (direction, color, intensity) =
        key.unwrap_or((camera.world_direction(), Vec3::ONE, 1.0));
    if !any_light {
        ambient = HEADLAMP_AMBIENT;
    }
    LightUniform {
        direction,
        color,
        intensity,
        ambient: ambient.min(1.0),
    }
}

/// Append every visible mesh and point cloud. Triangles are culled by
/// their material side against the camera; transparent triangles follow
/// the opaque ones.
pub(crate) fn push_scene(scene: &Scene, camera: &Camera, frame: &mut FrameData) {
    let mut transparent = Vec::new();
    for id in scene.visible_objects() {
        let (Some(object), Some(world)) = (scene.get(id), scene.world_matrix(id)) else {
            continue;
        };
        match &object.kind {
            ObjectKind::Mesh { geometry, material } => {
                let target = if material.alpha() < 1.0 {
                    &mut transparent
                } else {
                    &mut frame.triangles
                };
                push_mesh(geometry, material, &world, camera, target, &mut frame.lines);
            }
            ObjectKind::Points { geometry, material } => {
                let color = material.color.to_rgba(material.alpha());
                frame.points.extend(geometry.positions.iter().map(|p| PointInstance {
                    position: world.transform_point3(*p).to_array(),
                    size: material.size.max(1.0),
                    color,
                }));
            }
            _ => {}
        }
    }
    frame.triangles.append(&mut transparent);
}

fn push_mesh(
    geometry: &Geometry,
    material: &Material,
    world: &Mat4,
    camera: &Camera,
    triangles: &mut Vec<MeshVertex>,
    lines: &mut Vec<LineVertex>,
) {
    let color = material.color.to_rgba(material.alpha());
    let lit = if material.kind.is_lit() { 1.0 } else { 0.0 };
    let normal_matrix = Mat3::from_mat4(*world).inverse().transpose();
    let mirrored = world.determinant() < 0.0;
    let view_dir = camera.projection.is_orthographic().then(|| camera.world_direction());

    for face in 0..geometry.triangle_count() {
        let (Some(idx), Some(local)) =
            (geometry.triangle(face), geometry.triangle_positions(face))
        else {
            continue;
        };
        let p = local.map(|v| world.transform_point3(v));

        if material.wireframe {
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                lines.push(LineVertex::new(p[a], color));
                lines.push(LineVertex::new(p[b], color));
            }
            continue;
        }

        let mut face_normal = (p[1] - p[0]).cross(p[2] - p[0]);
        if mirrored {
            face_normal = -face_normal;
        }
        let to_eye = view_dir.map_or(camera.position - p[0], |d| -d);
        let front = face_normal.dot(to_eye) >= 0.0;
        let visible = match material.side {
            Side::Front => front,
            Side::Back => !front,
            Side::Double => true,
        };
        if !visible {
            continue;
        }

        let local_normal = (local[1] - local[0]).cross(local[2] - local[0]).normalize_or_zero();
        let flip = if front { 1.0 } else { -1.0 };
        for (k, &i) in idx.iter().enumerate() {
            let n = (normal_matrix * geometry.vertex_normal(i, local_normal)).normalize_or_zero();
            triangles.push(MeshVertex {
                position: p[k].to_array(),
                normal: (n * flip).to_array(),
                color,
                lit,
            });
        }
    }

    // Keep the bounds visible for meshes that drew nothing
    if geometry.triangle_count() == 0 && !geometry.positions.is_empty() {
        let bounds = geometry.bounding_box().transformed(world);
        box_edges(lines, &bounds, color);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::camera::core::Projection;
    use crate::scene::{Light, MaterialKind, Object3D};
    use crate::util::color::Color;

    fn camera() -> Camera {
        let mut camera = Camera::new(Projection::default());
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn frame_for(scene: &Scene) -> FrameData {
        let cam = camera();
        let mut frame = FrameData::new(cam.uniform(&key_light(scene, &cam), 1.0, 1.0), [0.0; 4]);
        push_scene(scene, &cam, &mut frame);
        frame
    }

    fn cube(material: Material) -> Object3D {
        Object3D::mesh(Arc::new(Geometry::unit_box()), Arc::new(material))
    }

    #[test]
    fn front_side_culls_back_faces() {
        let mut scene = Scene::new();
        let _ = scene.add(cube(Material::new(MaterialKind::Phong, Color::WHITE)));
        // Only the +Z face looks at a camera on the +Z axis
        assert_eq!(frame_for(&scene).triangles.len(), 2 * 3);
    }

    #[test]
    fn double_side_keeps_every_face() {
        let mut material = Material::new(MaterialKind::Basic, Color::WHITE);
        material.side = Side::Double;
        let mut scene = Scene::new();
        let _ = scene.add(cube(material));
        let frame = frame_for(&scene);
        assert_eq!(frame.triangles.len(), 12 * 3);
        // Every normal faces the viewer
        for v in &frame.triangles {
            let to_eye = Vec3::new(0.0, 0.0, 10.0) - Vec3::from(v.position);
            assert!(Vec3::from(v.normal).dot(to_eye) >= -1e-4);
        }
        assert!(frame.triangles.iter().all(|v| v.lit == 0.0));
    }

    #[test]
    fn wireframe_emits_edges() {
        let mut material = Material::new(MaterialKind::Basic, Color::WHITE);
        material.wireframe = true;
        let mut scene = Scene::new();
        let _ = scene.add(cube(material));
        let frame = frame_for(&scene);
        assert!(frame.triangles.is_empty());
        assert_eq!(frame.lines.len(), 12 * 3 * 2);
    }

    #[test]
    fn hidden_objects_are_skipped() {
        let mut object = cube(Material::default());
        object.visible = false;
        let mut scene = Scene::new();
        let _ = scene.add(object);
        assert!(frame_for(&scene).triangles.is_empty());
    }

    #[test]
    fn transparent_after_opaque() {
        let mut glass = Material::new(MaterialKind::Basic, Color::WHITE);
        glass.transparent = true;
        glass.opacity = 0.5;
        let mut scene = Scene::new();
        let _ = scene.add(cube(glass));
        let _ = scene.add(cube(Material::default()).with_position(Vec3::X * 3.0));
        let frame = frame_for(&scene);
        let first_transparent = frame
            .triangles
            .iter()
            .position(|v| v.color[3] < 1.0)
            .unwrap();
        assert!(frame.triangles[first_transparent..].iter().all(|v| v.color[3] < 1.0));
        assert!(first_transparent > 0);
    }

    #[test]
    fn headlamp_without_lights() {
        let scene = Scene::new();
        let cam = camera();
        let light = key_light(&scene, &cam);
        assert!((light.direction - cam.world_direction()).length() < 1e-5);
        assert_eq!(light.ambient, HEADLAMP_AMBIENT);
    }

    #[test]
    fn directional_light_points_at_origin() {
        let mut scene = Scene::new();
        let mut light = Light::new(LightKind::Directional);
        light.intensity = 2.0;
        let _ = scene.add(Object3D::light(light).with_position(Vec3::new(0.0, 10.0, 0.0)));
        let light = key_light(&scene, &camera());
        assert!((light.direction - Vec3::NEG_Y).length() < 1e-5);
        assert_eq!(light.intensity, 2.0);
        assert_eq!(light.ambient, 0.0);
    }
}
