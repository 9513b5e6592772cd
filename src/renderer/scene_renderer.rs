use web_time::Instant;

use super::pipeline_util::{self, PipelineDesc};
use crate::camera::core::CameraUniform;
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::DepthTexture;
use crate::viewport::{FrameData, LineVertex, MeshVertex, PointInstance};

/// Draws a [`FrameData`] into the surface: scene triangles and points,
/// depth-tested lines, then lines over everything, all in one pass.
pub struct SceneRenderer {
    depth: DepthTexture,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    triangles: TypedBuffer<MeshVertex>,
    points: TypedBuffer<PointInstance>,
    lines: TypedBuffer<LineVertex>,
    overlay_lines: TypedBuffer<LineVertex>,
}

impl SceneRenderer {
    /// Pipelines and buffers for the context's surface format and size.
    #[must_use]
    pub fn new(context: &RenderContext) -> Self {
        let device = &context.device;
        let (width, height) = context.size();
        let (uniform_buffer, bind_group_layout, bind_group) = camera_binding(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Viewport Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/mesh.wgsl"
        ));
        let line_shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/line.wgsl"
        ));
        let point_shader = device.create_shader_module(wgpu::include_wgsl!(
            "../../assets/shaders/point.wgsl"
        ));

        let format = context.format();
        let pipeline = |label, shader, buffer, topology, depth| {
            pipeline_util::create_pipeline(
                device,
                format,
                &layout,
                PipelineDesc {
                    label,
                    shader,
                    buffer,
                    topology,
                    depth,
                },
            )
        };
        let triangle_list = wgpu::PrimitiveTopology::TriangleList;
        let line_list = wgpu::PrimitiveTopology::LineList;
        let opaque = pipeline_util::depth_stencil_state(true, wgpu::CompareFunction::Less);
        let tested = pipeline_util::depth_stencil_state(false, wgpu::CompareFunction::LessEqual);
        let on_top = pipeline_util::depth_stencil_state(false, wgpu::CompareFunction::Always);

        let vertex = wgpu::BufferUsages::VERTEX;
        Self {
            depth: DepthTexture::new(device, width, height),
            uniform_buffer,
            bind_group,
            mesh_pipeline: pipeline(
                "Mesh Pipeline",
                &mesh_shader,
                MeshVertex::layout(),
                triangle_list,
                opaque.clone(),
            ),
            line_pipeline: pipeline(
                "Line Pipeline",
                &line_shader,
                LineVertex::layout(),
                line_list,
                tested,
            ),
            overlay_pipeline: pipeline(
                "Overlay Line Pipeline",
                &line_shader,
                LineVertex::layout(),
                line_list,
                on_top,
            ),
            point_pipeline: pipeline(
                "Point Pipeline",
                &point_shader,
                PointInstance::layout(),
                triangle_list,
                opaque,
            ),
            triangles: TypedBuffer::with_capacity(device, "Mesh Vertices", 4096, vertex),
            points: TypedBuffer::with_capacity(device, "Point Instances", 256, vertex),
            lines: TypedBuffer::with_capacity(device, "Line Vertices", 1024, vertex),
            overlay_lines: TypedBuffer::with_capacity(
                device,
                "Overlay Line Vertices",
                1024,
                vertex,
            ),
        }
    }

    /// Upload `frame` and draw it to the next surface texture. Returns the
    /// CPU time spent in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if no surface texture could be
    /// acquired; the host should reconfigure on `Lost`/`Outdated`.
    pub fn render(
        &mut self,
        context: &RenderContext,
        frame: &FrameData,
    ) -> Result<f64, wgpu::SurfaceError> {
        let start = Instant::now();
        let device = &context.device;
        let queue = &context.queue;

        let (width, height) = context.size();
        let _ = self.depth.ensure_size(device, width, height);

        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&frame.camera));
        let _ = self.triangles.write(device, queue, &frame.triangles);
        let _ = self.points.write(device, queue, &frame.points);
        let _ = self.lines.write(device, queue, &frame.lines);
        let _ = self.overlay_lines.write(device, queue, &frame.overlay_lines);

        let output = context.acquire_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = context.create_encoder();
        {
            let [r, g, b, a] = frame.clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Premultiplied, matching the blend state
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r * a,
                            g: g * a,
                            b: b * a,
                            a,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(
                    wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    },
                ),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.bind_group, &[]);

            if let Some(slice) = self.triangles.slice() {
                pass.set_pipeline(&self.mesh_pipeline);
                pass.set_vertex_buffer(0, slice);
                pass.draw(self.triangles.range(), 0..1);
            }
            // One quad of two triangles per instance
            if let Some(slice) = self.points.slice() {
                pass.set_pipeline(&self.point_pipeline);
                pass.set_vertex_buffer(0, slice);
                pass.draw(0..6, self.points.range());
            }
            for (pipeline, buffer) in [
                (&self.line_pipeline, &self.lines),
                (&self.overlay_pipeline, &self.overlay_lines),
            ] {
                if let Some(slice) = buffer.slice() {
                    pass.set_pipeline(pipeline);
                    pass.set_vertex_buffer(0, slice);
                    pass.draw(buffer.range(), 0..1);
                }
            }
        }
        context.submit(encoder);
        output.present();

        Ok(start.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Camera uniform buffer with its layout and bind group (group 0,
/// binding 0, visible to both stages).
fn camera_binding(
    device: &wgpu::Device,
) -> (wgpu::Buffer, wgpu::BindGroupLayout, wgpu::BindGroup) {
    let size = size_of::<CameraUniform>() as u64;
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Camera Uniform"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Camera Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        }],
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Camera Bind Group"),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, layout, bind_group)
}
