//! Indexed triangle geometry and the primitive builders scene JSON refers
//! to (box, plane, sphere).

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::bounds::Aabb;
use crate::util::id::generate_uuid;

/// Vertex positions with optional normals and triangle index.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Identifier shared by every object referencing this geometry.
    pub uuid: String,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, same length as `positions` when present.
    pub normals: Option<Vec<Vec3>>,
    /// Triangle list indices.
    pub index: Option<Vec<u32>>,
    bounding_box: Aabb,
}

impl Geometry {
    /// Geometry from raw attributes. Bounds are computed once here.
    #[must_use]
    pub fn new(
        positions: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        index: Option<Vec<u32>>,
    ) -> Self {
        let bounding_box = Aabb::from_points(positions.iter().copied());
        Self {
            uuid: generate_uuid(),
            positions,
            normals,
            index,
            bounding_box,
        }
    }

    /// Replace the generated uuid.
    #[must_use]
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Axis-aligned box `width × height × depth` centred on the origin.
    ///
    /// Each face is a grid of the given segment counts, so a default box has
    /// 24 vertices and 12 triangles.
    #[must_use]
    pub fn cuboid(
        width: f32,
        height: f32,
        depth: f32,
        width_segments: u32,
        height_segments: u32,
        depth_segments: u32,
    ) -> Self {
        let ws = width_segments.max(1);
        let hs = height_segments.max(1);
        let ds = depth_segments.max(1);
        let mut builder = GridBuilder::default();
        // (u, v, w) axes, u/v directions, plane extents, segments
        builder.face([2, 1, 0], -1.0, -1.0, [depth, height, width], ds, hs); // +x
        builder.face([2, 1, 0], 1.0, -1.0, [depth, height, -width], ds, hs); // -x
        builder.face([0, 2, 1], 1.0, 1.0, [width, depth, height], ws, ds); // +y
        builder.face([0, 2, 1], 1.0, -1.0, [width, depth, -height], ws, ds); // -y
        builder.face([0, 1, 2], 1.0, -1.0, [width, height, depth], ws, hs); // +z
        builder.face([0, 1, 2], -1.0, -1.0, [width, height, -depth], ws, hs); // -z
        builder.build()
    }

    /// Unit cube.
    #[must_use]
    pub fn unit_box() -> Self {
        Self::cuboid(1.0, 1.0, 1.0, 1, 1, 1)
    }

    /// Rectangle in the XY plane facing +Z.
    #[must_use]
    pub fn plane(
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    ) -> Self {
        let gx = width_segments.max(1);
        let gy = height_segments.max(1);
        let (seg_w, seg_h) = (width / gx as f32, height / gy as f32);
        let mut positions = Vec::with_capacity(((gx + 1) * (gy + 1)) as usize);
        for iy in 0..=gy {
            let y = iy as f32 * seg_h - height * 0.5;
            for ix in 0..=gx {
                let x = ix as f32 * seg_w - width * 0.5;
                positions.push(Vec3::new(x, -y, 0.0));
            }
        }
        let normals = vec![Vec3::Z; positions.len()];
        let index = grid_indices(0, gx, gy);
        Self::new(positions, Some(normals), Some(index))
    }

    /// UV sphere. Segment counts are clamped to at least 3 around and 2
    /// from pole to pole; the angle ranges select a partial sphere.
    #[must_use]
    pub fn sphere(
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        phi_start: f32,
        phi_length: f32,
        theta_start: f32,
        theta_length: f32,
    ) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let theta_end = (theta_start + theta_length).min(PI);

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let theta = theta_start + v * theta_length;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let phi = phi_start + u * phi_length;
                let p = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                positions.push(p);
                normals.push(p.normalize_or_zero());
            }
        }

        let row = ws + 1;
        let mut index = Vec::new();
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // Degenerate pole triangles are skipped
                if iy != 0 || theta_start > 0.0 {
                    index.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 || theta_end < PI {
                    index.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self::new(positions, Some(normals), Some(index))
    }

    /// Full sphere with the default segment counts (32 × 16).
    #[must_use]
    pub fn unit_sphere(radius: f32) -> Self {
        Self::sphere(radius, 32, 16, 0.0, TAU, 0.0, PI)
    }

    /// Number of vertices (position count).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles: index count / 3 when indexed, else vertex
    /// count / 3.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.index
            .as_ref()
            .map_or(self.positions.len(), Vec::len)
            / 3
    }

    /// Object-space bounds.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    /// Vertex indices of triangle `face`, or `None` if the face does not
    /// exist or refers past the position array.
    #[must_use]
    pub fn triangle(&self, face: usize) -> Option<[usize; 3]> {
        let corners = match &self.index {
            Some(index) => {
                let &[a, b, c] = index.get(face * 3..face * 3 + 3)? else {
                    return None;
                };
                [a as usize, b as usize, c as usize]
            }
            None => {
                let base = face * 3;
                [base, base + 1, base + 2]
            }
        };
        corners
            .iter()
            .all(|&i| i < self.positions.len())
            .then_some(corners)
    }

    /// Object-space corner positions of triangle `face`.
    #[must_use]
    pub fn triangle_positions(&self, face: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.triangle(face)?;
        Some([
            *self.positions.get(a)?,
            *self.positions.get(b)?,
            *self.positions.get(c)?,
        ])
    }

    /// Iterator over triangle corner positions, skipping faces whose
    /// indices are out of range.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).filter_map(move |f| self.triangle_positions(f))
    }

    /// Normal of vertex `i`, falling back to the face normal when the
    /// geometry has none.
    #[must_use]
    pub fn vertex_normal(&self, i: usize, face_normal: Vec3) -> Vec3 {
        self.normals
            .as_ref()
            .and_then(|n| n.get(i).copied())
            .unwrap_or(face_normal)
    }
}

/// Accumulates box faces the way each face is laid out: a grid in the
/// (u, v) plane pushed out along w.
#[derive(Default)]
struct GridBuilder {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    index: Vec<u32>,
}

impl GridBuilder {
    fn face(
        &mut self,
        axes: [usize; 3],
        udir: f32,
        vdir: f32,
        extent: [f32; 3],
        grid_x: u32,
        grid_y: u32,
    ) {
        let [u, v, w] = axes;
        let [width, height, depth] = extent;
        let (seg_w, seg_h) = (width / grid_x as f32, height / grid_y as f32);
        let base = self.positions.len() as u32;

        for iy in 0..=grid_y {
            let y = iy as f32 * seg_h - height * 0.5;
            for ix in 0..=grid_x {
                let x = ix as f32 * seg_w - width * 0.5;
                let mut p = Vec3::ZERO;
                p[u] = x * udir;
                p[v] = y * vdir;
                p[w] = depth * 0.5;
                let mut n = Vec3::ZERO;
                n[w] = if depth > 0.0 { 1.0 } else { -1.0 };
                self.positions.push(p);
                self.normals.push(n);
            }
        }
        self.index.extend(grid_indices(base, grid_x, grid_y));
    }

    fn build(self) -> Geometry {
        Geometry::new(self.positions, Some(self.normals), Some(self.index))
    }
}

/// Two triangles per cell of a `(gx + 1) × (gy + 1)` vertex grid.
fn grid_indices(base: u32, gx: u32, gy: u32) -> Vec<u32> {
    let row = gx + 1;
    let mut index = Vec::with_capacity((gx * gy * 6) as usize);
    for iy in 0..gy {
        for ix in 0..gx {
            let a = base + ix + row * iy;
            let b = base + ix + row * (iy + 1);
            let c = base + (ix + 1) + row * (iy + 1);
            let d = base + (ix + 1) + row * iy;
            index.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_box_counts() {
        let g = Geometry::unit_box();
        assert_eq!(g.vertex_count(), 24);
        assert_eq!(g.triangle_count(), 12);
        let bb = g.bounding_box();
        assert!((bb.min - Vec3::splat(-0.5)).length() < 1e-6);
        assert!((bb.max - Vec3::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn segmented_box_counts() {
        let g = Geometry::cuboid(2.0, 2.0, 2.0, 2, 3, 4);
        // Faces: +-x (d×h), +-y (w×d), +-z (w×h)
        let verts = 2 * (5 * 4) + 2 * (3 * 5) + 2 * (3 * 4);
        let tris = 2 * 2 * (4 * 3) + 2 * 2 * (2 * 4) + 2 * 2 * (2 * 3);
        assert_eq!(g.vertex_count(), verts);
        assert_eq!(g.triangle_count(), tris);
    }

    #[test]
    fn box_faces_wind_outward() {
        let g = Geometry::unit_box();
        for [a, b, c] in g.triangles() {
            let n = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn plane_faces_plus_z() {
        let g = Geometry::plane(2.0, 1.0, 1, 1);
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.triangle_count(), 2);
        for [a, b, c] in g.triangles() {
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }

    #[test]
    fn sphere_counts() {
        let g = Geometry::unit_sphere(1.0);
        assert_eq!(g.vertex_count(), 33 * 17);
        // Pole rows contribute one triangle per segment
        assert_eq!(g.triangle_count(), 32 * 16 * 2 - 2 * 32);
        for p in &g.positions {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn non_indexed_triangle_count() {
        let g = Geometry::new(vec![Vec3::ZERO; 9], None, None);
        assert_eq!(g.triangle_count(), 3);
        assert_eq!(g.triangle(2), Some([6, 7, 8]));
        assert_eq!(g.triangle(3), None);
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let g = Geometry::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            Some(vec![0, 1, 2, 0, 1, 5]),
        );
        assert_eq!(g.triangle_count(), 2);
        assert_eq!(g.triangle(0), Some([0, 1, 2]));
        assert_eq!(g.triangle(1), None);
        assert!(g.triangle_positions(1).is_none());
        assert_eq!(g.triangles().count(), 1);
    }
}
