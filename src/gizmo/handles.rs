//! Handle shapes in gizmo units: one unit is the handle scale.
//!
//! The same shapes drive picking and drawing, so what the user sees is
//! what they can grab.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use super::{GizmoAxis, GizmoMode};
use crate::picking::Ray;
use crate::viewport::frame::LineVertex;

/// Length of an axis handle.
const AXIS_LENGTH: f32 = 1.0;
/// Inner and outer edge of a plane handle square.
const PLANE_MIN: f32 = 0.15;
const PLANE_MAX: f32 = 0.45;
/// Grab radius of the centre handle.
const CENTER_RADIUS: f32 = 0.15;
/// Radius of the rotation rings.
const RING_RADIUS: f32 = 1.0;
const RING_SEGMENTS: usize = 48;
/// Grab distance from axes and rings.
const PICK_RADIUS: f32 = 0.12;
const ARROW_SIZE: f32 = 0.15;
const SCALE_BOX: f32 = 0.06;

const RED: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
const GREEN: [f32; 4] = [0.2, 1.0, 0.2, 1.0];
const BLUE: [f32; 4] = [0.2, 0.4, 1.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const HIGHLIGHT: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// Placement of the handles in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleFrame {
    /// Gizmo centre.
    pub origin: Vec3,
    /// Handle orientation: identity in world space, the object's world
    /// rotation in local space.
    pub orientation: Quat,
    /// World size of one gizmo unit.
    pub scale: f32,
}

impl HandleFrame {
    /// World-space direction of a gizmo-space axis.
    #[must_use]
    pub fn axis(&self, local: Vec3) -> Vec3 {
        self.orientation * local
    }

    /// World-space position of a point in gizmo units.
    #[must_use]
    pub fn point(&self, local: Vec3) -> Vec3 {
        self.origin + self.orientation * (local * self.scale)
    }
}

fn axis_color(axis: GizmoAxis) -> [f32; 4] {
    match axis {
        GizmoAxis::X | GizmoAxis::YZ => RED,
        GizmoAxis::Y | GizmoAxis::XZ => GREEN,
        GizmoAxis::Z | GizmoAxis::XY => BLUE,
        GizmoAxis::XYZ => WHITE,
    }
}

const AXES: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];
const PLANES: [GizmoAxis; 3] = [GizmoAxis::XY, GizmoAxis::YZ, GizmoAxis::XZ];

// ---------------------------------------------------------------------------
// Picking
// ---------------------------------------------------------------------------

/// Handle under `ray`, if any. The centre handle wins outright; otherwise
/// the nearest hit along the ray.
#[must_use]
pub fn pick(mode: GizmoMode, frame: &HandleFrame, ray: &Ray) -> Option<GizmoAxis> {
    let pick_sq = (PICK_RADIUS * frame.scale).powi(2);
    if mode != GizmoMode::Rotate {
        let r = CENTER_RADIUS * frame.scale;
        if ray.distance_sq_to_point(frame.origin) < r * r {
            return Some(GizmoAxis::XYZ);
        }
    }

    let mut best: Option<(f32, GizmoAxis)> = None;
    let mut consider = |t: f32, axis: GizmoAxis| {
        if best.is_none_or(|(best_t, _)| t < best_t) {
            best = Some((t, axis));
        }
    };

    match mode {
        GizmoMode::Translate | GizmoMode::Scale => {
            for axis in AXES {
                let Some(dir) = axis.direction() else { continue };
                let end = frame.point(dir * AXIS_LENGTH);
                let (d_sq, t) = ray.distance_sq_to_segment(frame.origin, end);
                if d_sq < pick_sq {
                    consider(t, axis);
                }
            }
            if mode == GizmoMode::Translate {
                for plane in PLANES {
                    if let Some(t) = hit_plane_handle(frame, ray, plane) {
                        consider(t, plane);
                    }
                }
            }
        }
        GizmoMode::Rotate => {
            for axis in AXES {
                let ring = ring_points(frame, axis);
                for pair in ring.windows(2) {
                    let (d_sq, t) = ray.distance_sq_to_segment(pair[0], pair[1]);
                    if d_sq < pick_sq {
                        consider(t, axis);
                    }
                }
            }
        }
    }
    best.map(|(_, axis)| axis)
}

fn hit_plane_handle(frame: &HandleFrame, ray: &Ray, plane: GizmoAxis) -> Option<f32> {
    let normal = frame.axis(plane.plane_normal()?);
    let hit = ray.intersect_plane(normal, frame.origin)?;
    let local = frame.orientation.inverse() * (hit - frame.origin) / frame.scale;
    let inside = |v: f32| (PLANE_MIN..=PLANE_MAX).contains(&v);
    let mask = plane.mask();
    let in_square = [local.x, local.y, local.z]
        .iter()
        .zip(mask.to_array())
        .all(|(&v, m)| m == 0.0 || inside(v));
    in_square.then(|| hit.distance(ray.origin))
}

/// Closed polyline of a rotation ring, first point repeated at the end.
fn ring_points(frame: &HandleFrame, axis: GizmoAxis) -> Vec<Vec3> {
    (0..=RING_SEGMENTS)
        .map(|i| {
            let a = i as f32 / RING_SEGMENTS as f32 * TAU;
            let (s, c) = a.sin_cos();
            let local = match axis {
                GizmoAxis::X => Vec3::new(0.0, c, s),
                GizmoAxis::Y => Vec3::new(c, 0.0, s),
                _ => Vec3::new(c, s, 0.0),
            };
            frame.point(local * RING_RADIUS)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Line list for the handles of `mode`, with `highlight` drawn in yellow.
#[must_use]
pub fn lines(
    mode: GizmoMode,
    frame: &HandleFrame,
    highlight: Option<GizmoAxis>,
) -> Vec<LineVertex> {
    let color = |axis: GizmoAxis| {
        if highlight == Some(axis) {
            HIGHLIGHT
        } else {
            axis_color(axis)
        }
    };
    let mut out = Vec::with_capacity(256);
    let mut segment = |a: Vec3, b: Vec3, c: [f32; 4]| {
        out.push(LineVertex::new(frame.point(a), c));
        out.push(LineVertex::new(frame.point(b), c));
    };

    match mode {
        GizmoMode::Translate => {
            for axis in AXES {
                let Some(dir) = axis.direction() else { continue };
                let c = color(axis);
                let tip = dir * AXIS_LENGTH;
                segment(Vec3::ZERO, tip, c);
                let back = tip - dir * ARROW_SIZE;
                let (u, v) = dir.any_orthonormal_pair();
                for side in [u, -u, v, -v] {
                    segment(tip, back + side * ARROW_SIZE * 0.4, c);
                }
            }
            for plane in PLANES {
                let Some(normal) = plane.plane_normal() else { continue };
                let (u, v) = plane_basis(normal);
                let c = color(plane);
                let corners = [
                    u * PLANE_MIN + v * PLANE_MIN,
                    u * PLANE_MAX + v * PLANE_MIN,
                    u * PLANE_MAX + v * PLANE_MAX,
                    u * PLANE_MIN + v * PLANE_MAX,
                ];
                for (i, &corner) in corners.iter().enumerate() {
                    segment(corner, corners[(i + 1) % 4], c);
                }
            }
            box_lines(&mut segment, Vec3::ZERO, SCALE_BOX, color(GizmoAxis::XYZ));
        }
        GizmoMode::Scale => {
            for axis in AXES {
                let Some(dir) = axis.direction() else { continue };
                let c = color(axis);
                segment(Vec3::ZERO, dir * AXIS_LENGTH, c);
                box_lines(&mut segment, dir * AXIS_LENGTH, SCALE_BOX, c);
            }
            box_lines(&mut segment, Vec3::ZERO, CENTER_RADIUS, color(GizmoAxis::XYZ));
        }
        GizmoMode::Rotate => {
            for axis in AXES {
                let c = color(axis);
                let ring = ring_points(
                    &HandleFrame {
                        origin: Vec3::ZERO,
                        orientation: Quat::IDENTITY,
                        scale: 1.0,
                    },
                    axis,
                );
                for pair in ring.windows(2) {
                    segment(pair[0], pair[1], c);
                }
            }
        }
    }
    out
}

/// The two in-plane unit axes of a plane handle.
fn plane_basis(normal: Vec3) -> (Vec3, Vec3) {
    if normal == Vec3::X {
        (Vec3::Y, Vec3::Z)
    } else if normal == Vec3::Y {
        (Vec3::X, Vec3::Z)
    } else {
        (Vec3::X, Vec3::Y)
    }
}

fn box_lines(
    segment: &mut impl FnMut(Vec3, Vec3, [f32; 4]),
    center: Vec3,
    half: f32,
    color: [f32; 4],
) {
    let corner = |i: usize| {
        center
            + Vec3::new(
                if i & 1 == 0 { -half } else { half },
                if i & 2 == 0 { -half } else { half },
                if i & 4 == 0 { -half } else { half },
            )
    };
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                segment(corner(i), corner(i | bit), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> HandleFrame {
        HandleFrame {
            origin: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: 2.0,
        }
    }

    fn ray_to(target: Vec3) -> Ray {
        let origin = Vec3::new(0.0, 0.0, 20.0);
        Ray::new(origin, target - origin)
    }

    #[test]
    fn picks_translate_axis() {
        let hit = pick(GizmoMode::Translate, &frame(), &ray_to(Vec3::new(1.4, 0.0, 0.0)));
        assert_eq!(hit, Some(GizmoAxis::X));
        let hit = pick(GizmoMode::Translate, &frame(), &ray_to(Vec3::new(0.0, 1.6, 0.0)));
        assert_eq!(hit, Some(GizmoAxis::Y));
    }

    #[test]
    fn picks_plane_handle() {
        let hit = pick(GizmoMode::Translate, &frame(), &ray_to(Vec3::new(0.6, 0.6, 0.0)));
        assert_eq!(hit, Some(GizmoAxis::XY));
    }

    #[test]
    fn centre_wins() {
        let hit = pick(GizmoMode::Scale, &frame(), &ray_to(Vec3::new(0.1, 0.1, 0.0)));
        assert_eq!(hit, Some(GizmoAxis::XYZ));
    }

    #[test]
    fn picks_rotation_ring() {
        let d = 2.0 * std::f32::consts::FRAC_1_SQRT_2;
        let hit = pick(GizmoMode::Rotate, &frame(), &ray_to(Vec3::new(d, d, 0.0)));
        assert_eq!(hit, Some(GizmoAxis::Z));
    }

    #[test]
    fn empty_space_misses() {
        let target = Vec3::new(-3.0, -3.0, 0.0);
        for mode in [GizmoMode::Translate, GizmoMode::Rotate, GizmoMode::Scale] {
            assert_eq!(pick(mode, &frame(), &ray_to(target)), None);
        }
    }

    #[test]
    fn local_orientation_rotates_handles() {
        let frame = HandleFrame {
            orientation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            ..frame()
        };
        // Local X now points along world Y
        let hit = pick(GizmoMode::Translate, &frame, &ray_to(Vec3::new(0.0, 1.4, 0.0)));
        assert_eq!(hit, Some(GizmoAxis::X));
    }

    #[test]
    fn highlight_recolours_one_handle() {
        let plain = lines(GizmoMode::Translate, &frame(), None);
        let lit = lines(GizmoMode::Translate, &frame(), Some(GizmoAxis::Y));
        assert_eq!(plain.len(), lit.len());
        assert!(plain.len() % 2 == 0);
        assert!(!plain.iter().any(|v| v.color == HIGHLIGHT));
        assert!(lit.iter().any(|v| v.color == HIGHLIGHT));
    }

    #[test]
    fn ring_lines_lie_on_radius() {
        let f = frame();
        for v in lines(GizmoMode::Rotate, &f, None) {
            let r = Vec3::from(v.position).length();
            assert!((r - RING_RADIUS * f.scale).abs() < 1e-4);
        }
    }
}
