//! wgpu drawing of a [`FrameData`](crate::viewport::FrameData).

pub(crate) mod pipeline_util;
mod scene_renderer;

pub use scene_renderer::SceneRenderer;
