//! Per-frame draw data handed from the viewport to the renderer.
//!
//! Everything here is plain CPU data in world space. The renderer uploads
//! it verbatim; no scene knowledge crosses into the GPU layer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::camera::core::CameraUniform;

/// Vertex of a lit or unlit triangle.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// World-space normal, facing the viewer for visible faces.
    pub normal: [f32; 3],
    /// Base colour (rgb) and opacity (a).
    pub color: [f32; 4],
    /// 1.0 for lit materials, 0.0 for unlit.
    pub lit: f32,
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
        3 => Float32,
    ];

    /// Vertex buffer layout matching `mesh.wgsl`.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Endpoint of a line segment.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Colour with alpha.
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    /// Vertex at `position` with `color`.
    #[must_use]
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    /// Vertex buffer layout matching `line.wgsl`.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// One point sprite, expanded to a screen-aligned quad on the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    /// World-space centre.
    pub position: [f32; 3],
    /// Size in pixels.
    pub size: f32,
    /// Colour with alpha.
    pub color: [f32; 4],
}

impl PointInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32,
        2 => Float32x4,
    ];

    /// Instance buffer layout matching `point.wgsl`.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Camera and key light.
    pub camera: CameraUniform,
    /// Clear colour (rgba, straight alpha).
    pub clear_color: [f32; 4],
    /// Scene triangles, opaque first then transparent.
    pub triangles: Vec<MeshVertex>,
    /// Scene points.
    pub points: Vec<PointInstance>,
    /// Depth-tested line segments: grid, selection box, wireframes.
    pub lines: Vec<LineVertex>,
    /// Line segments drawn over everything: the gizmo.
    pub overlay_lines: Vec<LineVertex>,
}

impl FrameData {
    /// Empty frame with the given camera and clear colour.
    #[must_use]
    pub fn new(camera: CameraUniform, clear_color: [f32; 4]) -> Self {
        Self {
            camera,
            clear_color,
            triangles: Vec::new(),
            points: Vec::new(),
            lines: Vec::new(),
            overlay_lines: Vec::new(),
        }
    }
}
