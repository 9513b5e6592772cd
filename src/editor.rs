//! Editor host: a winit window (or a canvas on the web) running a
//! [`Viewport`] through the wgpu renderer.
//!
//! ```no_run
//! # use stageview::Editor;
//! Editor::builder()
//!     .with_scene_path("scenes/project.json")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;
use serde_json::Value;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes, WindowId},
};

use crate::error::ViewportError;
use crate::gpu::render_context::{RenderContext, RenderContextError};
use crate::input::{InputEvent, MouseButton};
use crate::options::Options;
use crate::renderer::SceneRenderer;
use crate::util::frame_timing::FrameTiming;
use crate::viewport::{Viewport, ViewportEvent};

/// Wheel pixels per winit line step, matching a DOM `deltaY` notch.
const PIXELS_PER_LINE: f32 = 100.0;

// ── Builder ──────────────────────────────────────────────────────────────

enum SceneSource {
    Path(PathBuf),
    Json(Value),
}

/// Fluent builder for [`Editor`].
pub struct EditorBuilder {
    scene: Option<SceneSource>,
    options: Option<Options>,
    title: String,
    canvas_id: Option<String>,
    scaffold: bool,
    spin: bool,
    target_fps: u32,
}

impl EditorBuilder {
    fn new() -> Self {
        Self {
            scene: None,
            options: None,
            title: "Stageview".into(),
            canvas_id: None,
            scaffold: false,
            spin: false,
            target_fps: 0,
        }
    }

    /// Load an editor project from a JSON file.
    #[must_use]
    pub fn with_scene_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene = Some(SceneSource::Path(path.into()));
        self
    }

    /// Load an editor project from parsed JSON.
    #[must_use]
    pub fn with_scene_json(mut self, json: Value) -> Self {
        self.scene = Some(SceneSource::Json(json));
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render into the canvas element with this id (web only). Without
    /// one a canvas is appended to the document body.
    #[must_use]
    pub fn with_canvas_id(mut self, id: impl Into<String>) -> Self {
        self.canvas_id = Some(id.into());
        self
    }

    /// Start from the unit-cube scaffold when no scene is given.
    #[must_use]
    pub fn with_scaffold(mut self, scaffold: bool) -> Self {
        self.scaffold = scaffold;
        self
    }

    /// Spin the scaffold cube.
    #[must_use]
    pub fn with_spin(mut self, spin: bool) -> Self {
        self.spin = spin;
        self
    }

    /// Cap the frame rate (0 = display refresh).
    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Consume the builder and produce an [`Editor`].
    #[must_use]
    pub fn build(self) -> Editor {
        Editor {
            scene: self.scene,
            options: self.options.unwrap_or_default(),
            title: self.title,
            canvas_id: self.canvas_id,
            scaffold: self.scaffold,
            spin: self.spin,
            target_fps: self.target_fps,
        }
    }
}

// ── Editor ───────────────────────────────────────────────────────────────

/// A window showing an editable scene.
///
/// Construct via [`Editor::builder`], then call [`run`](Self::run).
pub struct Editor {
    scene: Option<SceneSource>,
    options: Options,
    title: String,
    canvas_id: Option<String>,
    scaffold: bool,
    spin: bool,
    target_fps: u32,
}

impl Editor {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> EditorBuilder {
        EditorBuilder::new()
    }

    /// Build the viewport, open the window and run the event loop. Natively
    /// this blocks until the window is closed; on the web it returns once
    /// the loop is handed to the browser.
    ///
    /// # Errors
    ///
    /// Returns [`ViewportError`] if the scene cannot be read or parsed, or
    /// if the event loop cannot be created.
    pub fn run(self) -> Result<(), ViewportError> {
        let viewport = self.viewport()?;

        let event_loop = EventLoop::<EditorEvent>::with_user_event()
            .build()
            .map_err(|e| ViewportError::Editor(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let app = EditorApp {
            window: None,
            gpu: None,
            viewport,
            title: self.title,
            canvas_id: self.canvas_id,
            proxy: event_loop.create_proxy(),
            pointer: Vec2::ZERO,
            timing: FrameTiming::new(self.target_fps),
        };
        #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
        {
            let mut app = app;
            event_loop
                .run_app(&mut app)
                .map_err(|e| ViewportError::Editor(e.to_string()))
        }
        #[cfg(all(target_arch = "wasm32", feature = "web"))]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
            Ok(())
        }
    }

    fn viewport(&self) -> Result<Viewport, ViewportError> {
        let mut viewport = Viewport::new(self.options.clone());
        match &self.scene {
            Some(SceneSource::Path(path)) => {
                let text = std::fs::read_to_string(path)?;
                let json: Value = serde_json::from_str(&text)?;
                viewport.load_json(&json)?;
                log::info!("loaded {}", path.display());
            }
            Some(SceneSource::Json(json)) => viewport.load_json(json)?,
            None if self.spin => {
                let _ = viewport.spin_scaffold();
            }
            None if self.scaffold => {
                let _ = viewport.scaffold();
            }
            None => {}
        }
        Ok(viewport)
    }
}

// ── GPU state ────────────────────────────────────────────────────────────

struct Gpu {
    context: RenderContext,
    renderer: SceneRenderer,
}

impl Gpu {
    async fn new(
        window: Arc<Window>,
        size: (u32, u32),
    ) -> Result<Self, RenderContextError> {
        let context = RenderContext::new(window, size).await?;
        let renderer = SceneRenderer::new(&context);
        Ok(Self { context, renderer })
    }
}

/// Delivered through the event loop proxy once async GPU setup finishes.
enum EditorEvent {
    GpuReady(Result<Gpu, RenderContextError>),
}

// ── Winit app ────────────────────────────────────────────────────────────

struct EditorApp {
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    viewport: Viewport,
    title: String,
    canvas_id: Option<String>,
    proxy: EventLoopProxy<EditorEvent>,
    pointer: Vec2,
    timing: FrameTiming,
}

impl EditorApp {
    fn window_attributes(&self, event_loop: &ActiveEventLoop) -> WindowAttributes {
        let attrs = Window::default_attributes().with_title(&self.title);
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = match &monitor {
            Some(mon) if !cfg!(target_arch = "wasm32") => {
                let size = mon.size();
                let scale = mon.scale_factor();
                let logical_w = (f64::from(size.width) / scale * 0.75) as u32;
                let logical_h = (f64::from(size.height) / scale * 0.75) as u32;
                attrs.with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
            }
            _ => attrs,
        };
        with_canvas(attrs, self.canvas_id.as_deref())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = &mut self.gpu {
            let _ = gpu.context.resize(width, height);
        }
        self.viewport.resize(width.max(1), height.max(1));
    }

    fn redraw(&mut self) {
        if !self.timing.should_render() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            return;
        }
        let timestamp = self.timing.timestamp();
        if self.viewport.tick(timestamp) {
            if let Some(gpu) = &mut self.gpu {
                let frame = self.viewport.frame();
                match gpu.renderer.render(&gpu.context, &frame) {
                    Ok(frametime) => {
                        self.viewport.frame_rendered(frametime);
                        self.timing.end_frame();
                    }
                    Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                        gpu.context.recover();
                    }
                    Err(e) => log::error!("render error: {e:?}"),
                }
            }
        }
        self.log_events();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn log_events(&mut self) {
        for event in self.viewport.drain_events() {
            match event {
                ViewportEvent::Rendered { .. } => {
                    log::trace!("{event:?} at {:.0} fps", self.timing.fps());
                }
                ViewportEvent::StatsChanged(_) => log::trace!("{event:?}"),
                _ => log::debug!("{event:?}"),
            }
        }
    }

    fn pointer_button(&mut self, button: MouseButton, pressed: bool) {
        let Vec2 { x, y } = self.pointer;
        let event = if pressed {
            InputEvent::PointerDown {
                x,
                y,
                button,
                on_canvas: true,
            }
        } else {
            InputEvent::PointerUp { x, y, button }
        };
        self.viewport.handle_input(event);
    }
}

impl ApplicationHandler<EditorEvent> for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(self.window_attributes(event_loop)) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        let inner = window.inner_size();
        let size = (inner.width.max(1), inner.height.max(1));
        self.viewport.resize(size.0, size.1);

        #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
        {
            let ready = pollster::block_on(Gpu::new(Arc::clone(&window), size));
            let _ = self.proxy.send_event(EditorEvent::GpuReady(ready));
        }
        #[cfg(all(target_arch = "wasm32", feature = "web"))]
        {
            let proxy = self.proxy.clone();
            let target = Arc::clone(&window);
            wasm_bindgen_futures::spawn_local(async move {
                let ready = Gpu::new(target, size).await;
                let _ = proxy.send_event(EditorEvent::GpuReady(ready));
            });
        }
        self.window = Some(window);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: EditorEvent) {
        match event {
            EditorEvent::GpuReady(Ok(gpu)) => {
                let (width, height) = gpu.context.size();
                self.gpu = Some(gpu);
                self.resize(width, height);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            EditorEvent::GpuReady(Err(e)) => {
                log::error!("failed to initialize GPU: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::MouseInput { button, state, .. } => {
                self.pointer_button(
                    MouseButton::from(button),
                    state == ElementState::Pressed,
                );
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = Vec2::new(position.x as f32, position.y as f32);
                self.viewport.handle_input(InputEvent::PointerMove {
                    x: self.pointer.x,
                    y: self.pointer.y,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit scrolls up positive; the viewport takes DOM deltaY
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                if delta_y != 0.0 {
                    self.viewport.handle_input(InputEvent::Wheel { delta_y });
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let _ = self.viewport.handle_key(&format!("{code:?}"));
            }
            _ => (),
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn with_canvas(attrs: WindowAttributes, canvas_id: Option<&str>) -> WindowAttributes {
    use wasm_bindgen::JsCast;
    use winit::platform::web::WindowAttributesExtWebSys;

    let canvas = canvas_id
        .and_then(|id| web_sys::window()?.document()?.get_element_by_id(id))
        .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok());
    match canvas {
        Some(canvas) => attrs.with_canvas(Some(canvas)),
        None => {
            if let Some(id) = canvas_id {
                log::warn!("canvas #{id} not found, appending one");
            }
            attrs.with_append(true)
        }
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn with_canvas(attrs: WindowAttributes, _canvas_id: Option<&str>) -> WindowAttributes {
    attrs
}
