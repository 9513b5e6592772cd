//! Rays and the intersection tests picking and the gizmo are built on.

use glam::{Mat4, Vec3};

use crate::scene::Aabb;

/// Half-line from `origin` along unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

impl Ray {
    /// Ray from `origin` towards `direction` (normalized here).
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The ray carried through `m`, direction renormalized.
    #[must_use]
    pub fn transformed(&self, m: &Mat4) -> Self {
        let origin = m.transform_point3(self.origin);
        let ahead = m.transform_point3(self.origin + self.direction);
        Self::new(origin, ahead - origin)
    }

    /// Closest point on the ray to `p` (the origin if `p` is behind).
    #[must_use]
    pub fn closest_point_to_point(&self, p: Vec3) -> Vec3 {
        let t = (p - self.origin).dot(self.direction);
        if t < 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    /// Squared distance from `p` to the ray.
    #[must_use]
    pub fn distance_sq_to_point(&self, p: Vec3) -> f32 {
        self.closest_point_to_point(p).distance_squared(p)
    }

    /// Parameter where the ray enters `aabb`, 0 if the origin is inside.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        if aabb.is_empty() {
            return None;
        }
        let inv = self.direction.recip();
        let t1 = (aabb.min - self.origin) * inv;
        let t2 = (aabb.max - self.origin) * inv;
        // NaN from 0 * inf on a slab edge is dropped by min/max
        let t_min = t1.min(t2).max_element();
        let t_max = t1.max(t2).min_element();
        if t_max < 0.0 || t_min > t_max {
            return None;
        }
        Some(t_min.max(0.0))
    }

    /// Möller–Trumbore triangle test. With `cull_back_faces`, triangles
    /// wound clockwise as seen from the origin are missed.
    #[must_use]
    pub fn intersect_triangle(
        &self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        cull_back_faces: bool,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        let mut d_dot_n = self.direction.dot(normal);
        let sign = if d_dot_n > 0.0 {
            if cull_back_faces {
                return None;
            }
            1.0
        } else if d_dot_n < 0.0 {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let b1 = sign * self.direction.dot(diff.cross(edge2));
        if b1 < 0.0 {
            return None;
        }
        let b2 = sign * self.direction.dot(edge1.cross(diff));
        if b2 < 0.0 || b1 + b2 > d_dot_n {
            return None;
        }
        let q_dot_n = -sign * diff.dot(normal);
        if q_dot_n < 0.0 {
            return None;
        }
        Some(q_dot_n / d_dot_n)
    }

    /// Intersection with the plane through `point` with `normal`. Rays
    /// parallel to the plane or pointing away from it miss.
    #[must_use]
    pub fn intersect_plane(&self, normal: Vec3, point: Vec3) -> Option<Vec3> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-8 {
            return None;
        }
        let t = normal.dot(point - self.origin) / denom;
        (t >= 0.0).then(|| self.at(t))
    }

    /// Squared distance between the ray and segment `v0`-`v1`, with the ray
    /// parameter of the closest approach.
    #[must_use]
    pub fn distance_sq_to_segment(&self, v0: Vec3, v1: Vec3) -> (f32, f32) {
        let seg_dir = v1 - v0;
        let seg_len = seg_dir.length();
        if seg_len < 1e-8 {
            let t = (v0 - self.origin).dot(self.direction).max(0.0);
            return (self.at(t).distance_squared(v0), t);
        }
        let seg_dir = seg_dir / seg_len;
        let w0 = self.origin - v0;
        let b = self.direction.dot(seg_dir);
        let d = self.direction.dot(w0);
        let e = seg_dir.dot(w0);
        let denom = 1.0 - b * b;

        let s_seg = if denom.abs() < 1e-8 {
            e
        } else {
            (e - b * d) / denom
        };
        // Clamp to the segment, then take the ray point closest to it
        let p_seg = v0 + seg_dir * s_seg.clamp(0.0, seg_len);
        let t_ray = (p_seg - self.origin).dot(self.direction).max(0.0);
        (self.at(t_ray).distance_squared(p_seg), t_ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_hit_and_miss() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!((ray.intersect_aabb(&aabb).unwrap() - 4.0).abs() < 1e-6);

        let miss = Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(miss.intersect_aabb(&aabb).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(behind.intersect_aabb(&aabb).is_none());

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(inside.intersect_aabb(&aabb), Some(0.0));
    }

    #[test]
    fn triangle_front_and_back() {
        let (a, b, c) = (
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        // Counter-clockwise seen from +Z
        let front = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!((front.intersect_triangle(a, b, c, true).unwrap() - 3.0).abs() < 1e-6);

        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        assert!(back.intersect_triangle(a, b, c, true).is_none());
        assert!(back.intersect_triangle(a, b, c, false).is_some());

        let outside = Ray::new(Vec3::new(2.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!(outside.intersect_triangle(a, b, c, false).is_none());
    }

    #[test]
    fn point_distance() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!((ray.distance_sq_to_point(Vec3::new(5.0, 2.0, 0.0)) - 4.0).abs() < 1e-6);
        // Behind the origin measures to the origin
        assert!((ray.distance_sq_to_point(Vec3::new(-3.0, 0.0, 4.0)) - 25.0).abs() < 1e-5);
    }

    #[test]
    fn plane_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let hit = ray.intersect_plane(Vec3::Y, Vec3::ZERO).unwrap();
        assert!((hit - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        let away = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(away.intersect_plane(Vec3::Y, Vec3::ZERO).is_none());
    }

    #[test]
    fn segment_distance() {
        let ray = Ray::new(Vec3::new(0.5, 1.0, 5.0), Vec3::NEG_Z);
        let (d2, t) = ray.distance_sq_to_segment(Vec3::ZERO, Vec3::X);
        assert!((d2 - 1.0).abs() < 1e-5);
        assert!((t - 5.0).abs() < 1e-5);

        // Closest approach beyond the segment end clamps to the endpoint
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        let (d2, _) = ray.distance_sq_to_segment(Vec3::ZERO, Vec3::X);
        assert!((d2 - 4.0).abs() < 1e-5);
    }

    #[test]
    fn transformed_ray_is_unit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let m = Mat4::from_scale(Vec3::splat(3.0));
        let r = ray.transformed(&m);
        assert!((r.direction.length() - 1.0).abs() < 1e-6);
    }
}
