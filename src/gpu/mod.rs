//! GPU resource management: device and surface setup, growable vertex
//! buffers and the depth attachment.

/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// Depth attachment and format.
pub mod texture;
