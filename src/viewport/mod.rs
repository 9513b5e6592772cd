//! The editor viewport: scene, camera and the interaction layers on top.
//!
//! [`Viewport`] is GPU-independent. Hosts feed it [`InputEvent`]s and key
//! strings, call [`Viewport::tick`] and [`Viewport::frame`] once per redraw,
//! hand the resulting [`FrameData`] to a renderer and report the time spent
//! back through [`Viewport::frame_rendered`]. Everything the host may want
//! to react to is queued as a [`ViewportEvent`] and collected with
//! [`Viewport::drain_events`].
//!
//! Pointer presses go to the gizmo first, then the click selector, then the
//! orbit controls. A press the gizmo claims reaches neither of the others,
//! and the controls stay disabled for as long as a gizmo drag lasts.

mod command;
mod draw;
mod event;
pub mod frame;
pub mod overlay;

use std::sync::Arc;

pub use command::ViewportCommand;
pub use event::ViewportEvent;
pub use frame::{FrameData, LineVertex, MeshVertex, PointInstance};
use glam::{Quat, Vec2, Vec3};
use overlay::{Grid, SelectionBox};
use rustc_hash::FxHashMap;
use serde_json::Value;
use web_time::Instant;

use crate::camera::controls::{ControlsEvent, ViewportControls};
use crate::camera::core::Camera;
use crate::error::ViewportError;
use crate::gizmo::{GizmoEvent, TransformControls};
use crate::input::InputEvent;
use crate::options::{ColorScheme, Options, Theme};
use crate::picking::{Ray, Raycaster, SelectorEvent, ViewportSelector};
use crate::scene::loader::{ObjectLoader, ScriptMap};
use crate::scene::{
    Geometry, Light, LightKind, Material, MaterialKind, NodeId, Object3D,
    ObjectKind, ObjectTree, Scene, ViewportStatistics,
};
use crate::util::color::Color;
use crate::util::throttle::Throttle;

/// Minimum interval between two `Rendered` notifications.
const RENDERED_INTERVAL_MS: u64 = 100;

/// Per-frame callback receiving the frame timestamp in milliseconds.
pub type Animation = Box<dyn FnMut(f64, &mut Scene)>;

/// Where a registered camera lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraSlot {
    /// The viewport's own camera.
    Viewport,
    /// A camera node in the scene graph.
    Node(NodeId),
}

/// Scene plus camera, controls, picking, gizmo and overlays.
pub struct Viewport {
    /// The edited scene.
    pub scene: Scene,
    /// The camera the viewport renders through.
    pub camera: Camera,
    /// Orbit controls driving [`Viewport::camera`].
    pub controls: ViewportControls,
    /// Transform gizmo attached to the selection.
    pub gizmo: TransformControls,
    options: Options,
    scheme: ColorScheme,
    theme: Theme,
    grid: Grid,
    selection_box: SelectionBox,
    selector: ViewportSelector,
    raycaster: Raycaster,
    selected: Option<NodeId>,
    stats: ViewportStatistics,
    animations: Vec<Animation>,
    cameras: FxHashMap<String, CameraSlot>,
    geometries: FxHashMap<String, Arc<Geometry>>,
    materials: FxHashMap<String, Arc<Material>>,
    scripts: ScriptMap,
    canvas: Vec2,
    rendered: Throttle,
    events: Vec<ViewportEvent>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Viewport {
    /// Empty viewport configured from `options`.
    #[must_use]
    pub fn new(options: Options) -> Self {
        let scheme = options.theme.color_scheme.resolve();
        let theme = Theme::for_scheme(scheme);
        log::info!("viewport: color scheme {scheme}");

        let camera = Camera::from_options(&options.camera);
        let mut cameras = FxHashMap::default();
        let _ = cameras.insert(camera.uuid.clone(), CameraSlot::Viewport);

        // Gizmo before controls: it sees pointer presses first
        let gizmo = TransformControls::new(&options.gizmo);
        let mut controls = ViewportControls::new(&options.controls);
        controls.center = Vec3::from(options.camera.target);

        Self {
            scene: Scene::new(),
            camera,
            controls,
            gizmo,
            grid: Grid::new(&options.grid, &theme),
            options,
            scheme,
            theme,
            selection_box: SelectionBox::default(),
            selector: ViewportSelector::new(),
            raycaster: Raycaster::default(),
            selected: None,
            stats: ViewportStatistics::default(),
            animations: Vec::new(),
            cameras,
            geometries: FxHashMap::default(),
            materials: FxHashMap::default(),
            scripts: ScriptMap::default(),
            canvas: Vec2::ONE,
            rendered: Throttle::from_millis(RENDERED_INTERVAL_MS),
            events: Vec::new(),
        }
    }

    // -- Accessors --

    /// Options the viewport was built with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolved colour scheme.
    #[must_use]
    pub fn color_scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// Colours of the resolved scheme.
    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Currently selected object.
    #[must_use]
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Statistics as of the last scene change and frame.
    #[must_use]
    pub fn stats(&self) -> ViewportStatistics {
        self.stats
    }

    /// Scripts of the loaded project, keyed by object uuid.
    #[must_use]
    pub fn scripts(&self) -> &ScriptMap {
        &self.scripts
    }

    /// Geometry registered under `uuid` by an added object.
    #[must_use]
    pub fn geometry(&self, uuid: &str) -> Option<&Arc<Geometry>> {
        self.geometries.get(uuid)
    }

    /// Material registered under `uuid` by an added object.
    #[must_use]
    pub fn material(&self, uuid: &str) -> Option<&Arc<Material>> {
        self.materials.get(uuid)
    }

    /// Camera registered under `uuid`: the viewport camera or a camera
    /// placed in the scene, with its current world transform.
    #[must_use]
    pub fn find_camera(&self, uuid: &str) -> Option<Camera> {
        match *self.cameras.get(uuid)? {
            CameraSlot::Viewport => Some(self.camera.clone()),
            CameraSlot::Node(id) => {
                let world = self.scene.world_matrix(id)?;
                Camera::from_object(self.scene.get(id)?, &world)
            }
        }
    }

    /// Canvas size in physical pixels.
    #[must_use]
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<ViewportEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Host plumbing --

    /// Follow a canvas resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas = Vec2::new(width as f32, height as f32).max(Vec2::ONE);
        self.camera.set_aspect(self.aspect());
    }

    /// Switch colour scheme. Grid colours follow.
    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.scheme = scheme.resolve();
        self.theme = Theme::for_scheme(self.scheme);
        self.grid.set_theme(&self.theme);
        log::info!("viewport: color scheme {}", self.scheme);
    }

    /// Show or hide the ground grid.
    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid.visible = visible;
    }

    /// Run the command bound to `key` (a physical key name such as
    /// `"KeyW"`). Returns whether a binding existed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        let Some(command) = self.options.keybindings.lookup(key) else {
            return false;
        };
        log::debug!("viewport: key {key} -> {command:?}");
        self.execute(command);
        true
    }

    /// Route pointer input through gizmo, selector and controls.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                on_canvas,
            } => {
                let ray = self.ray_at(x, y);
                let claimed = on_canvas
                    && self
                        .gizmo
                        .pointer_down(&self.scene, &self.camera, &ray, button);
                self.pump_gizmo_events();
                if !claimed {
                    self.selector.pointer_down(x, y, on_canvas, self.canvas);
                    if on_canvas {
                        self.controls.pointer_down(x, y, button);
                    }
                }
            }
            InputEvent::PointerMove { x, y } => {
                let ray = self.ray_at(x, y);
                let _ = self
                    .gizmo
                    .pointer_move(&mut self.scene, &self.camera, &ray);
                self.pump_gizmo_events();
                self.controls.pointer_move(&mut self.camera, x, y);
                self.pump_controls_events();
            }
            InputEvent::PointerUp { x, y, button } => {
                let _ = self.gizmo.pointer_up(button);
                self.pump_gizmo_events();
                let change = self.selector.pointer_up(
                    x,
                    y,
                    self.canvas,
                    &self.scene,
                    &self.camera,
                );
                if let Some(SelectorEvent::Change { selected }) = change {
                    self.select(selected);
                }
                self.controls.pointer_up();
            }
            InputEvent::Wheel { delta_y } => {
                self.controls.wheel(&mut self.camera, delta_y);
                self.pump_controls_events();
            }
        }
    }

    fn aspect(&self) -> f32 {
        self.canvas.x / self.canvas.y
    }

    fn ray_at(&mut self, x: f32, y: f32) -> Ray {
        let uv = Vec2::new(x, y) / self.canvas;
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, -(uv.y * 2.0) + 1.0);
        self.raycaster.set_from_camera(ndc, &self.camera);
        self.raycaster.ray
    }

    fn pump_gizmo_events(&mut self) {
        for event in self.gizmo.drain_events() {
            match event {
                GizmoEvent::MouseDown { .. } => self.controls.enabled = false,
                GizmoEvent::MouseUp { .. } => self.controls.enabled = true,
                GizmoEvent::ObjectChange { node } => {
                    self.events.push(ViewportEvent::ObjectChanged { node });
                }
                GizmoEvent::Change => {}
            }
        }
    }

    fn pump_controls_events(&mut self) {
        let changed = self
            .controls
            .drain_events()
            .iter()
            .any(|e| *e == ControlsEvent::Change);
        if changed {
            self.events.push(ViewportEvent::CameraChanged);
        }
    }

    // -- Selection and commands --

    /// Select `node` (or nothing) and move the gizmo to it. Unknown nodes
    /// select nothing. `ObjectSelected` is emitted on every call, including
    /// one that repeats the current selection.
    pub fn select(&mut self, node: Option<NodeId>) {
        let node = node.filter(|&id| self.scene.contains(id));
        if node != self.selected {
            self.selected = node;
            self.gizmo.detach();
            if let Some(id) = node {
                self.gizmo.attach(id);
            }
            self.pump_gizmo_events();
        }
        self.events.push(ViewportEvent::ObjectSelected { selected: node });
    }

    /// Run an editor command.
    pub fn execute(&mut self, command: ViewportCommand) {
        match command {
            ViewportCommand::SetMode(mode) => {
                if self.gizmo.mode() == mode {
                    return;
                }
                self.gizmo.set_mode(mode);
                if self.gizmo.mode() == mode {
                    self.events.push(ViewportEvent::TransformModeChanged(mode));
                }
            }
            ViewportCommand::ToggleSpace => {
                let space = self.gizmo.space().toggled();
                self.gizmo.set_space(space);
                if self.gizmo.space() == space {
                    self.events.push(ViewportEvent::SpaceChanged(space));
                }
            }
            ViewportCommand::FocusSelected => {
                if let Some(node) = self.selected {
                    self.focus(node);
                }
            }
            ViewportCommand::DeleteSelected => {
                if let Some(node) = self.selected {
                    let _ = self.remove_object(node);
                }
            }
            ViewportCommand::ClearSelection => self.select(None),
            ViewportCommand::ResetCamera => self.reset_camera(),
        }
        self.pump_gizmo_events();
    }

    /// Frame `node` with the camera.
    pub fn focus(&mut self, node: NodeId) {
        let Some(fallback) = self.scene.world_position(node) else {
            return;
        };
        let bounds = self.scene.world_bounds(node);
        self.controls.focus(&mut self.camera, &bounds, fallback);
        self.pump_controls_events();
        self.events.push(ViewportEvent::ObjectFocused { node });
    }

    /// Restore the configured camera, keeping the viewport camera's uuid.
    pub fn reset_camera(&mut self) {
        let uuid = std::mem::take(&mut self.camera.uuid);
        self.camera = Camera::from_options(&self.options.camera);
        self.camera.uuid = uuid;
        self.camera.set_aspect(self.aspect());
        self.controls.center = Vec3::from(self.options.camera.target);
        self.events.push(ViewportEvent::CameraReset);
    }

    /// Set the gizmo snap steps. Rotation is in degrees; `None` or a
    /// non-positive step disables snapping.
    pub fn set_snap(
        &mut self,
        translation: Option<f32>,
        rotation_degrees: Option<f32>,
        scale: Option<f32>,
    ) {
        self.gizmo.set_translation_snap(translation);
        self.gizmo.set_rotation_snap(rotation_degrees.map(f32::to_radians));
        self.gizmo.set_scale_snap(scale);
        self.events.push(ViewportEvent::SnapChanged);
    }

    // -- Scene editing --

    /// Insert `tree` under `parent` (or at the root) at `index` and register
    /// its geometries, materials and cameras. Returns `None` if `parent` is
    /// not in the scene.
    pub fn add_object(
        &mut self,
        tree: impl Into<ObjectTree>,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Option<NodeId> {
        let node = self.insert_tree(tree.into(), parent, index)?;
        self.events.push(ViewportEvent::ObjectAdded { node });
        self.update_stats();
        Some(node)
    }

    /// Remove `node` and its descendants. A selection inside the removed
    /// subtree is cleared first.
    pub fn remove_object(&mut self, node: NodeId) -> Option<ObjectTree> {
        if self.selected.is_some_and(|s| self.is_within(s, node)) {
            self.select(None);
        }
        let removed = self.scene.remove(node)?;
        let scene = &self.scene;
        self.cameras.retain(|_, slot| match *slot {
            CameraSlot::Viewport => true,
            CameraSlot::Node(id) => scene.contains(id),
        });
        self.events.push(ViewportEvent::ObjectRemoved {
            node,
            uuid: removed.object.uuid.clone(),
        });
        self.update_stats();
        Some(removed)
    }

    /// Swap the geometry of a mesh or point cloud. Returns `false` for
    /// other objects.
    pub fn set_geometry(&mut self, node: NodeId, geometry: Arc<Geometry>) -> bool {
        let Some(object) = self.scene.get_mut(node) else {
            return false;
        };
        match &mut object.kind {
            ObjectKind::Mesh { geometry: g, .. }
            | ObjectKind::Points { geometry: g, .. } => {
                *g = Arc::clone(&geometry);
            }
            _ => return false,
        }
        let _ = self
            .geometries
            .insert(geometry.uuid.clone(), geometry);
        self.events.push(ViewportEvent::GeometryChanged);
        self.update_stats();
        true
    }

    /// Empty the scene and every registry. The viewport camera is kept.
    pub fn clear(&mut self) {
        if self.selected.is_some() {
            self.select(None);
        }
        self.scene.clear();
        self.scene.background = None;
        self.scene.fog = None;
        self.geometries.clear();
        self.materials.clear();
        self.scripts.clear();
        self.cameras.retain(|_, slot| *slot == CameraSlot::Viewport);
        self.animations.clear();
        self.update_stats();
    }

    /// Replace the scene with an editor project (`{ camera, scene,
    /// scripts }`). The project camera becomes the viewport camera, keeping
    /// the canvas aspect. Nothing changes if the project fails to parse.
    pub fn load_json(&mut self, json: &Value) -> Result<(), ViewportError> {
        let project = ObjectLoader::new().parse_project(json)?;
        self.clear();

        let world = project.camera.object.transform.matrix();
        if let Some(camera) = Camera::from_object(&project.camera.object, &world) {
            let _ = self.cameras.remove(&self.camera.uuid);
            self.camera = camera;
            self.camera.set_aspect(self.aspect());
            let _ = self
                .cameras
                .insert(self.camera.uuid.clone(), CameraSlot::Viewport);
        }
        self.events.push(ViewportEvent::CameraReset);

        self.scripts = project.scripts;
        let settings = project.scene;
        self.scene.uuid = settings.uuid;
        self.scene.name = settings.name;
        self.scene.background = settings.background;
        self.scene.fog = settings.fog;
        self.scene.background_blurriness = settings.background_blurriness;
        self.scene.background_intensity = settings.background_intensity;
        self.scene.user_data = settings.user_data;

        let count = project.children.len();
        for child in project.children {
            let _ = self.add_object(child, None, None);
        }
        log::info!(
            "viewport: loaded scene \"{}\" with {count} top-level objects",
            self.scene.name
        );
        self.events.push(ViewportEvent::SceneGraphChanged);
        Ok(())
    }

    /// Replace the scene with a lit unit cube. Returns the cube.
    pub fn scaffold(&mut self) -> NodeId {
        self.clear();
        let cube = Object3D::mesh(
            Arc::new(Geometry::unit_box()),
            Arc::new(Material::new(MaterialKind::Phong, Color::WHITE)),
        )
        .with_name("Box")
        .with_position(Vec3::new(0.0, 0.5, 0.0));
        let mut light = Light::new(LightKind::Directional);
        light.color = Color::WHITE;
        let light = Object3D::light(light)
            .with_name("DirectionalLight")
            .with_position(Vec3::new(-10.0, 15.0, 50.0));

        let cube = self.scene.add(cube);
        let light = self.scene.add(light);
        self.register(cube);
        self.register(light);
        self.events.push(ViewportEvent::ObjectAdded { node: cube });
        self.update_stats();
        cube
    }

    /// [`Viewport::scaffold`] with the cube spinning about Y.
    pub fn spin_scaffold(&mut self) -> NodeId {
        let cube = self.scaffold();
        self.add_animation(Box::new(move |t, scene| {
            if let Some(object) = scene.get_mut(cube) {
                object.transform.rotation = Quat::from_rotation_y((t / 1800.0) as f32);
            }
        }));
        cube
    }

    /// Register a per-frame callback.
    pub fn add_animation(&mut self, animation: Animation) {
        self.animations.push(animation);
    }

    fn insert_tree(
        &mut self,
        tree: ObjectTree,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Option<NodeId> {
        let node = self.scene.insert(tree, parent, index)?;
        self.register(node);
        Some(node)
    }

    fn register(&mut self, root: NodeId) {
        self.scene.traverse(root, &mut |id, object| {
            if let Some(geometry) = object.geometry() {
                let _ = self
                    .geometries
                    .insert(geometry.uuid.clone(), Arc::clone(geometry));
            }
            if let Some(material) = object.material() {
                let _ = self
                    .materials
                    .insert(material.uuid.clone(), Arc::clone(material));
            }
            if matches!(object.kind, ObjectKind::Camera(_)) {
                let _ = self
                    .cameras
                    .insert(object.uuid.clone(), CameraSlot::Node(id));
            }
        });
    }

    fn is_within(&self, mut node: NodeId, ancestor: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.scene.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn update_stats(&mut self) {
        let frametime = self.stats.frametime;
        self.stats = ViewportStatistics::compute(&self.scene).with_frametime(frametime);
    }

    // -- Frame loop --

    /// Advance to `timestamp` (milliseconds): run animations, then refit
    /// the selection box and the gizmo. Returns whether a frame should be
    /// drawn.
    pub fn tick(&mut self, timestamp: f64) -> bool {
        for animation in &mut self.animations {
            animation(timestamp, &mut self.scene);
        }
        match self.selected {
            Some(node) => self.selection_box.bounds = self.scene.world_bounds(node),
            None => self.selection_box.clear(),
        }
        self.gizmo.update(&self.scene, &self.camera);
        true
    }

    /// Draw lists for the current state.
    #[must_use]
    pub fn frame(&self) -> FrameData {
        let light = draw::key_light(&self.scene, &self.camera);
        let clear_color = self.scene.background.map_or_else(
            || self.theme.background.to_rgba(self.theme.background_alpha),
            |c| c.to_rgba(1.0),
        );
        let camera = self.camera.uniform(&light, self.canvas.x, self.canvas.y);
        let mut frame = FrameData::new(camera, clear_color);
        draw::push_scene(&self.scene, &self.camera, &mut frame);
        frame.lines.extend(self.grid.lines());
        frame.lines.extend(self.selection_box.lines());
        frame.overlay_lines = self.gizmo.lines(&self.camera);
        frame
    }

    /// Record that a frame took `frametime` milliseconds to submit.
    pub fn frame_rendered(&mut self, frametime: f64) {
        self.frame_rendered_at(frametime, Instant::now());
    }

    fn frame_rendered_at(&mut self, frametime: f64, now: Instant) {
        self.scene.mark_rendered();
        self.stats.frametime = frametime;
        if self.rendered.ready_at(now) {
            self.events.push(ViewportEvent::Rendered { frametime });
            self.events.push(ViewportEvent::StatsChanged(self.stats));
        }
    }
}
