//! Gizmo state machine: attach, hover, drag.

use glam::{Quat, Vec3};

use super::frame::GizmoFrame;
use super::handles::{self, HandleFrame};
use super::{GizmoAxis, GizmoMode, TransformSpace};
use crate::camera::core::Camera;
use crate::input::MouseButton;
use crate::options::GizmoOptions;
use crate::picking::Ray;
use crate::scene::{NodeId, Scene, Transform};
use crate::viewport::frame::LineVertex;

const MIN_SCALE: f32 = 1e-5;

/// Notifications for the owning viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoEvent {
    /// Anything visible about the gizmo changed.
    Change,
    /// A drag started.
    MouseDown {
        /// Mode of the drag.
        mode: GizmoMode,
    },
    /// A drag ended.
    MouseUp {
        /// Mode of the drag.
        mode: GizmoMode,
    },
    /// A drag wrote a new transform to the attached node.
    ObjectChange {
        /// The node that moved.
        node: NodeId,
    },
}

/// Snapshot taken when a drag starts.
#[derive(Debug, Clone, Copy)]
struct Drag {
    axis: GizmoAxis,
    plane_normal: Vec3,
    /// Grab point relative to `world_position_start`.
    point_start: Vec3,
    position_start: Vec3,
    quaternion_start: Quat,
    scale_start: Vec3,
    world_position_start: Vec3,
    world_quaternion_start: Quat,
}

/// Translate / rotate / scale gizmo bound to at most one scene node.
#[derive(Debug, Clone)]
pub struct TransformControls {
    /// When false, hover and drag input is ignored.
    pub enabled: bool,
    mode: GizmoMode,
    space: TransformSpace,
    size: f32,
    translation_snap: Option<f32>,
    rotation_snap: Option<f32>,
    scale_snap: Option<f32>,
    object: Option<NodeId>,
    visible: bool,
    axis: Option<GizmoAxis>,
    drag: Option<Drag>,
    frame: GizmoFrame,
    events: Vec<GizmoEvent>,
}

impl TransformControls {
    /// Detached gizmo configured from options. Rotation snap is given in
    /// degrees there and kept in radians here.
    #[must_use]
    pub fn new(options: &GizmoOptions) -> Self {
        Self {
            enabled: true,
            mode: options.mode,
            space: options.space,
            size: options.size,
            translation_snap: options.translation_snap,
            rotation_snap: options.rotation_snap.map(f32::to_radians),
            scale_snap: options.scale_snap,
            object: None,
            visible: false,
            axis: None,
            drag: None,
            frame: GizmoFrame::default(),
            events: Vec::new(),
        }
    }

    // -- Configuration --

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Switch mode. Ignored mid-drag.
    pub fn set_mode(&mut self, mode: GizmoMode) {
        if self.mode != mode && self.drag.is_none() {
            self.mode = mode;
            self.events.push(GizmoEvent::Change);
        }
    }

    /// Configured space. Scale always operates in local space regardless.
    #[must_use]
    pub fn space(&self) -> TransformSpace {
        self.space
    }

    /// Switch space. Ignored mid-drag.
    pub fn set_space(&mut self, space: TransformSpace) {
        if self.space != space && self.drag.is_none() {
            self.space = space;
            self.events.push(GizmoEvent::Change);
        }
    }

    /// Handle size multiplier.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Set the handle size multiplier.
    pub fn set_size(&mut self, size: f32) {
        if self.size != size {
            self.size = size;
            self.events.push(GizmoEvent::Change);
        }
    }

    /// Translation snap step in world units.
    #[must_use]
    pub fn translation_snap(&self) -> Option<f32> {
        self.translation_snap
    }

    /// Set or clear the translation snap step.
    pub fn set_translation_snap(&mut self, snap: Option<f32>) {
        self.translation_snap = snap.filter(|s| *s > 0.0);
    }

    /// Rotation snap step in radians.
    #[must_use]
    pub fn rotation_snap(&self) -> Option<f32> {
        self.rotation_snap
    }

    /// Set or clear the rotation snap step, in radians.
    pub fn set_rotation_snap(&mut self, snap: Option<f32>) {
        self.rotation_snap = snap.filter(|s| *s > 0.0);
    }

    /// Scale snap step.
    #[must_use]
    pub fn scale_snap(&self) -> Option<f32> {
        self.scale_snap
    }

    /// Set or clear the scale snap step.
    pub fn set_scale_snap(&mut self, snap: Option<f32>) {
        self.scale_snap = snap.filter(|s| *s > 0.0);
    }

    // -- State --

    /// Attached node.
    #[must_use]
    pub fn object(&self) -> Option<NodeId> {
        self.object
    }

    /// Whether the gizmo is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hovered or dragged handle.
    #[must_use]
    pub fn axis(&self) -> Option<GizmoAxis> {
        self.axis
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Last decomposition of the attached node and camera.
    #[must_use]
    pub fn frame(&self) -> &GizmoFrame {
        &self.frame
    }

    /// Take all pending events.
    pub fn drain_events(&mut self) -> Vec<GizmoEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Attachment --

    /// Bind to `node`.
    pub fn attach(&mut self, node: NodeId) {
        self.set_object(Some(node));
    }

    /// Unbind. Clears the hovered handle and any drag.
    pub fn detach(&mut self) {
        self.set_object(None);
    }

    /// Follow a selection change. Re-selecting the attached node is a
    /// no-op; a visibility flip emits [`GizmoEvent::Change`].
    pub fn set_object(&mut self, selected: Option<NodeId>) {
        if selected == self.object {
            return;
        }
        self.object = selected;
        if selected.is_none() {
            self.axis = None;
            self.drag = None;
        }
        let visible = selected.is_some();
        if visible != self.visible {
            self.visible = visible;
            self.events.push(GizmoEvent::Change);
        }
    }

    /// Refresh the cached decomposition.
    pub fn update(&mut self, scene: &Scene, camera: &Camera) {
        self.frame.update(scene, self.object, camera);
    }

    fn effective_space(&self) -> TransformSpace {
        if self.mode == GizmoMode::Scale {
            TransformSpace::Local
        } else {
            self.space
        }
    }

    /// World placement of the handles for `camera`.
    #[must_use]
    pub fn handle_frame(&self, camera: &Camera) -> HandleFrame {
        let orientation = match self.effective_space() {
            TransformSpace::Local => self.frame.world_quaternion,
            TransformSpace::World => Quat::IDENTITY,
        };
        HandleFrame {
            origin: self.frame.world_position,
            orientation,
            scale: self.frame.handle_scale(camera, self.size),
        }
    }

    // -- Pointer input --

    /// Update the hovered handle. Does nothing while dragging.
    pub fn pointer_hover(&mut self, scene: &Scene, camera: &Camera, ray: &Ray) {
        if !self.enabled || self.object.is_none() || self.drag.is_some() {
            return;
        }
        self.update(scene, camera);
        let axis = handles::pick(self.mode, &self.handle_frame(camera), ray);
        if axis != self.axis {
            self.axis = axis;
            self.events.push(GizmoEvent::Change);
        }
    }

    /// Start a drag if the primary button went down on a handle. Returns
    /// whether a drag started, which is when the gizmo claims the press.
    pub fn pointer_down(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        ray: &Ray,
        button: MouseButton,
    ) -> bool {
        if !self.enabled || button != MouseButton::Primary || self.drag.is_some() {
            return false;
        }
        self.pointer_hover(scene, camera, ray);
        let (Some(axis), Some(node)) = (self.axis, self.object) else {
            return false;
        };
        let Some(object) = scene.get(node) else {
            return false;
        };

        let hf = self.handle_frame(camera);
        let plane_normal = self.drag_plane(axis, &hf);
        // A ray parallel to the drag plane starts nothing
        let Some(hit) = ray.intersect_plane(plane_normal, self.frame.world_position) else {
            return false;
        };
        let t = object.transform;
        self.drag = Some(Drag {
            axis,
            plane_normal,
            point_start: hit - self.frame.world_position,
            position_start: t.position,
            quaternion_start: t.rotation,
            scale_start: t.scale,
            world_position_start: self.frame.world_position,
            world_quaternion_start: self.frame.world_quaternion,
        });
        self.events.push(GizmoEvent::MouseDown { mode: self.mode });
        true
    }

    /// Continue a drag, writing the new transform to the attached node.
    /// Hovers instead when not dragging. Returns whether a drag consumed
    /// the move.
    pub fn pointer_move(&mut self, scene: &mut Scene, camera: &Camera, ray: &Ray) -> bool {
        let (Some(drag), Some(node)) = (self.drag, self.object) else {
            self.pointer_hover(scene, camera, ray);
            return false;
        };
        self.update(scene, camera);
        let Some(hit) = ray.intersect_plane(drag.plane_normal, drag.world_position_start)
        else {
            return true;
        };
        let point_end = hit - drag.world_position_start;
        let Some(current) = scene.get(node).map(|o| o.transform) else {
            return true;
        };

        let transform = match self.mode {
            GizmoMode::Translate => Transform {
                position: self.translated(&drag, point_end),
                ..current
            },
            GizmoMode::Rotate => match self.rotated(&drag, point_end) {
                Some(rotation) => Transform {
                    rotation,
                    ..current
                },
                None => return true,
            },
            GizmoMode::Scale => Transform {
                scale: self.scaled(&drag, point_end),
                ..current
            },
        };
        if let Some(object) = scene.get_mut(node) {
            object.transform = transform;
        }
        self.events.push(GizmoEvent::ObjectChange { node });
        self.events.push(GizmoEvent::Change);
        true
    }

    /// End a drag. Returns whether one was in progress.
    pub fn pointer_up(&mut self, button: MouseButton) -> bool {
        if button != MouseButton::Primary {
            return false;
        }
        let was_dragging = self.drag.take().is_some();
        if was_dragging {
            self.events.push(GizmoEvent::MouseUp { mode: self.mode });
        }
        if self.axis.take().is_some() {
            self.events.push(GizmoEvent::Change);
        }
        was_dragging
    }

    /// Handle lines for drawing; empty while hidden.
    #[must_use]
    pub fn lines(&self, camera: &Camera) -> Vec<LineVertex> {
        if !self.visible {
            return Vec::new();
        }
        let highlight = self.drag.map(|d| d.axis).or(self.axis);
        handles::lines(self.mode, &self.handle_frame(camera), highlight)
    }

    // -- Drag maths --

    fn drag_plane(&self, axis: GizmoAxis, hf: &HandleFrame) -> Vec3 {
        let eye = self.frame.eye;
        if let Some(normal) = axis.plane_normal() {
            return hf.axis(normal);
        }
        let Some(dir) = axis.direction() else {
            return eye;
        };
        let world_axis = hf.axis(dir);
        if self.mode == GizmoMode::Rotate {
            return world_axis;
        }
        // Plane containing the axis, turned towards the viewer
        let facing = eye.reject_from_normalized(world_axis);
        if facing.length_squared() < 1e-8 {
            world_axis.any_orthonormal_vector()
        } else {
            facing.normalize()
        }
    }

    fn translated(&self, drag: &Drag, point_end: Vec3) -> Vec3 {
        let f = &self.frame;
        let mask = drag.axis.mask();
        let mut offset = point_end - drag.point_start;
        offset = match self.space {
            TransformSpace::Local if drag.axis != GizmoAxis::XYZ => {
                let q = drag.world_quaternion_start;
                q * ((q.inverse() * offset) * mask)
            }
            _ => offset * mask,
        };
        offset = f.parent_quaternion_inv * offset / f.parent_scale;
        let mut position = drag.position_start + offset;

        if let Some(snap) = self.translation_snap {
            let round = |v: Vec3| {
                Vec3::select(mask.cmpgt(Vec3::ZERO), (v / snap).round() * snap, v)
            };
            position = match self.space {
                TransformSpace::Local => {
                    let q = drag.quaternion_start;
                    q * round(q.inverse() * position)
                }
                TransformSpace::World => {
                    let world = f.parent_position
                        + f.parent_quaternion * (position * f.parent_scale);
                    let world = round(world);
                    f.parent_quaternion_inv * (world - f.parent_position) / f.parent_scale
                }
            };
        }
        position
    }

    fn rotated(&self, drag: &Drag, point_end: Vec3) -> Option<Quat> {
        let f = &self.frame;
        let local_axis = drag.axis.direction()?;
        let world_axis = match self.space {
            TransformSpace::Local => drag.world_quaternion_start * local_axis,
            TransformSpace::World => local_axis,
        };
        let start = drag.point_start.reject_from_normalized(world_axis);
        let end = point_end.reject_from_normalized(world_axis);
        if start.length_squared() < 1e-12 || end.length_squared() < 1e-12 {
            return None;
        }
        let mut angle = start.cross(end).dot(world_axis).atan2(start.dot(end));
        if let Some(snap) = self.rotation_snap {
            angle = (angle / snap).round() * snap;
        }
        let rotation = match self.space {
            TransformSpace::Local => {
                drag.quaternion_start * Quat::from_axis_angle(local_axis, angle)
            }
            TransformSpace::World => {
                f.parent_quaternion_inv
                    * Quat::from_axis_angle(world_axis, angle)
                    * f.parent_quaternion
                    * drag.quaternion_start
            }
        };
        Some(rotation.normalize())
    }

    fn scaled(&self, drag: &Drag, point_end: Vec3) -> Vec3 {
        let mask = drag.axis.mask();
        let ratio = if drag.axis == GizmoAxis::XYZ {
            let start = drag.point_start.length();
            let mut d = if start > 0.0 {
                point_end.length() / start
            } else {
                1.0
            };
            if point_end.dot(drag.point_start) < 0.0 {
                d = -d;
            }
            Vec3::splat(d)
        } else {
            let inv = self.frame.world_quaternion_inv;
            let start = inv * drag.point_start;
            let end = inv * point_end;
            Vec3::from_array(std::array::from_fn(|i| {
                if mask[i] == 0.0 || start[i].abs() < 1e-6 {
                    1.0
                } else {
                    end[i] / start[i]
                }
            }))
        };
        let mut scale = drag.scale_start * ratio;
        if let Some(snap) = self.scale_snap {
            for i in 0..3 {
                if mask[i] != 0.0 {
                    let snapped = (scale[i] / snap).round() * snap;
                    scale[i] = if snapped == 0.0 { snap } else { snapped };
                }
            }
        }
        scale.map(|c| {
            if c.abs() < MIN_SCALE {
                MIN_SCALE.copysign(c)
            } else {
                c
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

    use super::*;
    use crate::camera::core::Projection;
    use crate::scene::{Object3D, ObjectTree};

    fn camera() -> Camera {
        let mut camera = Camera::new(Projection::default());
        camera.position = Vec3::new(0.0, 0.0, 10.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    fn ray_to(camera: &Camera, target: Vec3) -> Ray {
        Ray::new(camera.position, target - camera.position)
    }

    fn setup(object: Object3D, options: &GizmoOptions) -> (Scene, NodeId, TransformControls, f32) {
        let mut scene = Scene::new();
        let id = scene.add(object);
        let mut gizmo = TransformControls::new(options);
        gizmo.attach(id);
        gizmo.update(&scene, &camera());
        let s = gizmo.handle_frame(&camera()).scale;
        (scene, id, gizmo, s)
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    fn drag(
        scene: &mut Scene,
        gizmo: &mut TransformControls,
        from: Vec3,
        to: Vec3,
    ) {
        let cam = camera();
        assert!(gizmo.pointer_down(scene, &cam, &ray_to(&cam, from), MouseButton::Primary));
        assert!(gizmo.is_dragging());
        assert!(gizmo.pointer_move(scene, &cam, &ray_to(&cam, to)));
        assert!(gizmo.pointer_up(MouseButton::Primary));
    }

    #[test]
    fn attach_detach_visibility() {
        let mut gizmo = TransformControls::new(&GizmoOptions::default());
        let mut scene = Scene::new();
        let a = scene.add(Object3D::group());
        let b = scene.add(Object3D::group());

        gizmo.attach(a);
        assert!(gizmo.is_visible());
        assert_eq!(gizmo.drain_events(), [GizmoEvent::Change]);

        gizmo.attach(a);
        assert!(gizmo.drain_events().is_empty());

        gizmo.attach(b);
        assert_eq!(gizmo.object(), Some(b));
        assert!(gizmo.drain_events().is_empty());

        gizmo.detach();
        assert!(!gizmo.is_visible());
        assert_eq!(gizmo.axis(), None);
        assert_eq!(gizmo.drain_events(), [GizmoEvent::Change]);
        assert!(gizmo.lines(&camera()).is_empty());
    }

    #[test]
    fn translate_along_world_x() {
        let (mut scene, id, mut gizmo, s) =
            setup(Object3D::group(), &GizmoOptions::default());
        let _ = gizmo.drain_events();
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.7 * s, 0.0, 0.0),
            Vec3::new(0.7 * s + 1.0, 0.5, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.position, Vec3::new(1.0, 0.0, 0.0)));

        let events = gizmo.drain_events();
        assert!(events.contains(&GizmoEvent::MouseDown { mode: GizmoMode::Translate }));
        assert!(events.contains(&GizmoEvent::ObjectChange { node: id }));
        assert!(events.contains(&GizmoEvent::MouseUp { mode: GizmoMode::Translate }));
        assert!(!gizmo.is_dragging());
        assert_eq!(gizmo.axis(), None);
    }

    #[test]
    fn translate_snaps() {
        let options = GizmoOptions {
            translation_snap: Some(0.75),
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(Object3D::group(), &options);
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.7 * s, 0.0, 0.0),
            Vec3::new(0.7 * s + 1.0, 0.0, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.position, Vec3::new(0.75, 0.0, 0.0)));
    }

    #[test]
    fn translate_in_local_space() {
        let mut object = Object3D::group();
        object.transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
        let options = GizmoOptions {
            space: TransformSpace::Local,
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(object, &options);
        // Local X points along world Y
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.0, 0.7 * s, 0.0),
            Vec3::new(0.5, 0.7 * s + 1.0, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.position, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn translate_converts_to_parent_space() {
        let mut parent = Object3D::group();
        parent.transform.scale = Vec3::splat(2.0);
        let mut scene = Scene::new();
        let root = scene.add(ObjectTree::leaf(parent).with_child(Object3D::group().into()));
        let child = scene.children(root)[0];
        let mut gizmo = TransformControls::new(&GizmoOptions::default());
        gizmo.attach(child);
        gizmo.update(&scene, &camera());
        let s = gizmo.handle_frame(&camera()).scale;
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.7 * s, 0.0, 0.0),
            Vec3::new(0.7 * s + 1.0, 0.0, 0.0),
        );
        let t = scene.get(child).unwrap().transform;
        assert!(approx(t.position, Vec3::new(0.5, 0.0, 0.0)));
    }

    #[test]
    fn rotate_about_world_z() {
        let options = GizmoOptions {
            mode: GizmoMode::Rotate,
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(Object3D::group(), &options);
        let d = s * FRAC_1_SQRT_2;
        drag(&mut scene, &mut gizmo, Vec3::new(d, d, 0.0), Vec3::new(-d, d, 0.0));
        let q = scene.get(id).unwrap().transform.rotation;
        assert!(q.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), 1e-4));
    }

    #[test]
    fn rotate_snaps_to_step() {
        let options = GizmoOptions {
            mode: GizmoMode::Rotate,
            rotation_snap: Some(15.0),
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(Object3D::group(), &options);
        let at = |deg: f32| {
            let (sin, cos) = deg.to_radians().sin_cos();
            Vec3::new(s * cos, s * sin, 0.0)
        };
        drag(&mut scene, &mut gizmo, at(45.0), at(95.0));
        let q = scene.get(id).unwrap().transform.rotation;
        assert!(q.abs_diff_eq(Quat::from_rotation_z(45f32.to_radians()), 1e-4));
    }

    #[test]
    fn uniform_scale_from_centre() {
        let options = GizmoOptions {
            mode: GizmoMode::Scale,
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(Object3D::group(), &options);
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.1 * s, 0.1 * s, 0.0),
            Vec3::new(0.2 * s, 0.2 * s, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.scale, Vec3::splat(2.0)));
    }

    #[test]
    fn axis_scale_only_touches_axis() {
        let options = GizmoOptions {
            mode: GizmoMode::Scale,
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(Object3D::group(), &options);
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.8 * s, 0.0, 0.0),
            Vec3::new(1.2 * s, 0.3, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.scale, Vec3::new(1.5, 1.0, 1.0)));
    }

    #[test]
    fn secondary_button_and_disabled_are_ignored() {
        let (scene, _, mut gizmo, s) = setup(Object3D::group(), &GizmoOptions::default());
        let cam = camera();
        let ray = ray_to(&cam, Vec3::new(0.7 * s, 0.0, 0.0));
        assert!(!gizmo.pointer_down(&scene, &cam, &ray, MouseButton::Secondary));
        gizmo.enabled = false;
        assert!(!gizmo.pointer_down(&scene, &cam, &ray, MouseButton::Primary));
        assert!(!gizmo.is_dragging());
    }

    #[test]
    fn mode_change_ignored_while_dragging() {
        let (scene, _, mut gizmo, s) = setup(Object3D::group(), &GizmoOptions::default());
        let cam = camera();
        let ray = ray_to(&cam, Vec3::new(0.7 * s, 0.0, 0.0));
        assert!(gizmo.pointer_down(&scene, &cam, &ray, MouseButton::Primary));
        gizmo.set_mode(GizmoMode::Scale);
        assert_eq!(gizmo.mode(), GizmoMode::Translate);
        let _ = gizmo.pointer_up(MouseButton::Primary);
        gizmo.set_mode(GizmoMode::Scale);
        assert_eq!(gizmo.mode(), GizmoMode::Scale);
    }

    /// Child of a group moved to (1, 0, 0), turned about Z and doubled in
    /// size.
    fn setup_child(
        child: Object3D,
        options: &GizmoOptions,
    ) -> (Scene, NodeId, TransformControls, f32) {
        let mut parent = Object3D::group().with_position(Vec3::X);
        parent.transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
        parent.transform.scale = Vec3::splat(2.0);
        let mut scene = Scene::new();
        let root = scene.add(ObjectTree::leaf(parent).with_child(child.into()));
        let node = scene.children(root)[0];
        let mut gizmo = TransformControls::new(options);
        gizmo.attach(node);
        gizmo.update(&scene, &camera());
        let s = gizmo.handle_frame(&camera()).scale;
        (scene, node, gizmo, s)
    }

    #[test]
    fn rotate_local_axis_under_transformed_parent() {
        let mut child = Object3D::group();
        child.transform.rotation = Quat::from_rotation_x(FRAC_PI_2);
        let options = GizmoOptions {
            mode: GizmoMode::Rotate,
            space: TransformSpace::Local,
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup_child(child, &options);
        let start = scene.get(id).unwrap().transform.rotation;
        let world_start = scene.world_matrix(id).unwrap().to_scale_rotation_translation().1;

        // Local Y ends up along world Z, so its ring faces the camera
        let d = s * FRAC_1_SQRT_2;
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(1.0 + d, d, 0.0),
            Vec3::new(1.0 - d, d, 0.0),
        );
        let q = scene.get(id).unwrap().transform.rotation;
        assert!(q.abs_diff_eq(start * Quat::from_rotation_y(FRAC_PI_2), 1e-4));
        let world = scene.world_matrix(id).unwrap().to_scale_rotation_translation().1;
        assert!(world.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2) * world_start, 1e-4));
    }

    #[test]
    fn scale_snaps_to_step() {
        let options = GizmoOptions {
            mode: GizmoMode::Scale,
            scale_snap: Some(0.5),
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup(Object3D::group(), &options);
        // 1.625 rounds down to 1.5
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.8 * s, 0.0, 0.0),
            Vec3::new(1.3 * s, 0.0, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.scale, Vec3::new(1.5, 1.0, 1.0)));

        // Rounding to zero keeps one step instead
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::new(0.8 * s, 0.0, 0.0),
            Vec3::new(0.1 * s, 0.0, 0.0),
        );
        let t = scene.get(id).unwrap().transform;
        assert!(approx(t.scale, Vec3::new(0.5, 1.0, 1.0)));
    }

    #[test]
    fn axis_scale_follows_rotated_child() {
        let mut child = Object3D::group();
        child.transform.rotation = Quat::from_rotation_z(-FRAC_PI_4);
        let options = GizmoOptions {
            mode: GizmoMode::Scale,
            scale_snap: Some(0.25),
            ..GizmoOptions::default()
        };
        let (mut scene, id, mut gizmo, s) = setup_child(child, &options);
        // World rotation is an eighth turn: local X runs along the XY diagonal
        let diagonal = Vec3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0);
        drag(
            &mut scene,
            &mut gizmo,
            Vec3::X + diagonal * 0.8 * s,
            Vec3::X + diagonal * 1.25 * s,
        );
        let t = scene.get(id).unwrap().transform;
        // 1.5625 snaps to 1.5
        assert!(approx(t.scale, Vec3::new(1.5, 1.0, 1.0)));
        assert!(t.rotation.abs_diff_eq(Quat::from_rotation_z(-FRAC_PI_4), 1e-6));
    }

    #[test]
    fn ray_parallel_to_drag_plane_starts_nothing() {
        let options = GizmoOptions {
            mode: GizmoMode::Rotate,
            ..GizmoOptions::default()
        };
        let (scene, _, mut gizmo, s) = setup(Object3D::group(), &options);
        let _ = gizmo.drain_events();
        let cam = camera();
        // The X ring's plane contains this ray
        let ray = ray_to(&cam, Vec3::new(0.0, s, 0.0));
        assert!(!gizmo.pointer_down(&scene, &cam, &ray, MouseButton::Primary));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::X));
        assert!(!gizmo.is_dragging());
        assert!(!gizmo
            .drain_events()
            .iter()
            .any(|e| matches!(e, GizmoEvent::MouseDown { .. })));
    }
}
