//! Helper geometry drawn over the scene: ground grid and selection box.

use glam::Vec3;

use super::frame::LineVertex;
use crate::options::{GridOptions, Theme};
use crate::scene::Aabb;
use crate::util::color::Color;

/// Selection box colour.
const BOX_COLOR: Color = Color::rgb(1.0, 1.0, 0.0);

/// Two overlaid grids on the XZ plane centred on the origin: fine lines
/// every `size / divisions` and coarse lines every
/// `size / major_divisions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Whether the grid is drawn.
    pub visible: bool,
    size: f32,
    divisions: u32,
    major_divisions: u32,
    color: Color,
    major_color: Color,
}

impl Grid {
    /// Grid sized by `options`, coloured by `theme`.
    #[must_use]
    pub fn new(options: &GridOptions, theme: &Theme) -> Self {
        Self {
            visible: options.visible,
            size: options.size,
            divisions: options.divisions.max(1),
            major_divisions: options.major_divisions.max(1),
            color: theme.grid,
            major_color: theme.grid_major,
        }
    }

    /// Recolour after a theme change.
    pub fn set_theme(&mut self, theme: &Theme) {
        self.color = theme.grid;
        self.major_color = theme.grid_major;
    }

    /// Line list for both grids; empty when hidden.
    #[must_use]
    pub fn lines(&self) -> Vec<LineVertex> {
        if !self.visible {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(
            4 * (self.divisions + self.major_divisions + 2) as usize,
        );
        grid_lines(&mut out, self.size, self.divisions, self.color);
        grid_lines(&mut out, self.size, self.major_divisions, self.major_color);
        out
    }
}

fn grid_lines(out: &mut Vec<LineVertex>, size: f32, divisions: u32, color: Color) {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let rgba = color.to_rgba(1.0);
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        out.push(LineVertex::new(Vec3::new(-half, 0.0, k), rgba));
        out.push(LineVertex::new(Vec3::new(half, 0.0, k), rgba));
        out.push(LineVertex::new(Vec3::new(k, 0.0, -half), rgba));
        out.push(LineVertex::new(Vec3::new(k, 0.0, half), rgba));
    }
}

/// Wire box around the selected object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionBox {
    /// World bounds; empty hides the box.
    pub bounds: Aabb,
}

impl SelectionBox {
    /// Hide the box.
    pub fn clear(&mut self) {
        self.bounds = Aabb::EMPTY;
    }

    /// Line list for the box edges; empty when there are no bounds.
    #[must_use]
    pub fn lines(&self) -> Vec<LineVertex> {
        let mut out = Vec::with_capacity(24);
        box_edges(&mut out, &self.bounds, BOX_COLOR.to_rgba(1.0));
        out
    }
}

/// Push the twelve edges of `aabb`. Nothing for an empty box.
pub fn box_edges(out: &mut Vec<LineVertex>, aabb: &Aabb, color: [f32; 4]) {
    if aabb.is_empty() {
        return;
    }
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 == 0 { aabb.min.x } else { aabb.max.x },
            if i & 2 == 0 { aabb.min.y } else { aabb.max.y },
            if i & 4 == 0 { aabb.min.z } else { aabb.max.z },
        )
    };
    for i in 0..8 {
        for bit in [1, 2, 4] {
            if i & bit == 0 {
                out.push(LineVertex::new(corner(i), color));
                out.push(LineVertex::new(corner(i | bit), color));
            }
        }
    }
}
