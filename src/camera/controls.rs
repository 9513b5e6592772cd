//! Orbit, zoom and pan of the viewport camera from pointer and wheel input.
//!
//! Primary-button drags orbit around [`ViewportControls::center`],
//! secondary-button drags pan the camera and the centre together, and the
//! wheel dollies towards the centre. Movement is scaled by the distance to
//! the centre so the feel is the same at any zoom level.

use glam::{Vec2, Vec3};

use super::core::Camera;
use super::spherical::Spherical;
use crate::input::MouseButton;
use crate::options::ControlsOptions;
use crate::scene::Aabb;

/// What a pointer drag currently does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Orbit around the centre.
    Rotate,
    /// Dolly towards/away from the centre.
    Zoom,
    /// Translate camera and centre.
    #[default]
    Pan,
}

/// Notifications emitted by [`ViewportControls`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlsEvent {
    /// Orbit applied with the given (pre-speed) delta.
    Rotate {
        /// Pixel delta (x = azimuth, y = polar).
        delta: Vec3,
    },
    /// Dolly applied; `delta` is the world-space camera offset.
    Zoom {
        /// World-space offset.
        delta: Vec3,
    },
    /// Pan applied; `delta` is the world-space offset.
    Pan {
        /// World-space offset.
        delta: Vec3,
    },
    /// The camera moved.
    Change,
}

/// Camera controller state.
#[derive(Debug, Clone)]
pub struct ViewportControls {
    /// Orbit centre.
    pub center: Vec3,
    /// Pan distance per pixel, relative to the orbit distance.
    pub pan_speed: f32,
    /// Dolly distance per wheel step, relative to the orbit distance.
    pub zoom_speed: f32,
    /// Radians per pixel of orbit drag.
    pub rotation_speed: f32,
    /// Disabled controls ignore pointer presses.
    pub enabled: bool,
    /// Middle-button drags zoom instead of being ignored.
    pub middle_button_zoom: bool,
    movement_mode: MovementMode,
    pointer_old: Vec2,
    captured: bool,
    events: Vec<ControlsEvent>,
}

impl Default for ViewportControls {
    fn default() -> Self {
        Self::new(&ControlsOptions::default())
    }
}

impl ViewportControls {
    /// Controls with the configured speeds, centred on the origin.
    #[must_use]
    pub fn new(options: &ControlsOptions) -> Self {
        Self {
            center: Vec3::ZERO,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
            rotation_speed: options.rotation_speed,
            enabled: true,
            middle_button_zoom: options.middle_button_zoom,
            movement_mode: MovementMode::default(),
            pointer_old: Vec2::ZERO,
            captured: false,
            events: Vec::new(),
        }
    }

    /// Current drag mode.
    #[must_use]
    pub fn movement_mode(&self) -> MovementMode {
        self.movement_mode
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ControlsEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Pointer input --

    /// Start a drag. Ignored while disabled and for unmapped buttons.
    pub fn pointer_down(&mut self, x: f32, y: f32, button: MouseButton) {
        if !self.enabled {
            return;
        }
        self.movement_mode = match button {
            MouseButton::Primary => MovementMode::Rotate,
            MouseButton::Secondary => MovementMode::Pan,
            MouseButton::Middle if self.middle_button_zoom => {
                MovementMode::Zoom
            }
            MouseButton::Middle => return,
        };
        self.captured = true;
        self.pointer_old = Vec2::new(x, y);
    }

    /// Apply the movement since the last pointer position.
    pub fn pointer_move(&mut self, camera: &mut Camera, x: f32, y: f32) {
        if !self.captured {
            return;
        }
        let pointer = Vec2::new(x, y);
        let movement = pointer - self.pointer_old;
        match self.movement_mode {
            MovementMode::Rotate => {
                self.rotate(camera, Vec3::new(-movement.x, -movement.y, 0.0));
            }
            MovementMode::Zoom => {
                let _ = self.zoom(camera, Vec3::new(0.0, 0.0, movement.y));
            }
            MovementMode::Pan => {
                self.pan(camera, Vec3::new(-movement.x, movement.y, 0.0));
            }
        }
        self.pointer_old = pointer;
    }

    /// End the drag.
    pub fn pointer_up(&mut self) {
        self.captured = false;
    }

    /// One wheel notch towards (negative `delta_y`) or away from the centre.
    pub fn wheel(&mut self, camera: &mut Camera, delta_y: f32) {
        let step = if delta_y > 0.0 { 1.0 } else { -1.0 };
        let _ = self.zoom(camera, Vec3::new(0.0, 0.0, step));
    }

    // -- Movements --

    /// Orbit the camera around the centre by `delta` pixels.
    pub fn rotate(&mut self, camera: &mut Camera, delta: Vec3) {
        let offset = camera.position - self.center;
        let mut spherical = Spherical::from_vec3(offset);
        spherical.theta += delta.x * self.rotation_speed;
        spherical.phi += delta.y * self.rotation_speed;
        let offset = spherical.make_safe().to_vec3();

        camera.position = self.center + offset;
        camera.look_at(self.center);

        self.events.push(ControlsEvent::Rotate { delta });
        self.events.push(ControlsEvent::Change);
    }

    /// Dolly along the camera's local axes. Rejected (returns `false`, no
    /// events) when the step would overshoot the centre.
    pub fn zoom(&mut self, camera: &mut Camera, delta: Vec3) -> bool {
        let distance = camera.position.distance(self.center);
        let delta = delta * distance * self.zoom_speed;
        if delta.length() > distance {
            return false;
        }
        let delta = camera.normal_matrix() * delta;
        camera.position += delta;

        self.events.push(ControlsEvent::Zoom { delta });
        self.events.push(ControlsEvent::Change);
        true
    }

    /// Translate camera and centre in the camera plane.
    pub fn pan(&mut self, camera: &mut Camera, delta: Vec3) {
        let distance = camera.position.distance(self.center);
        let delta = camera.normal_matrix() * (delta * distance * self.pan_speed);
        camera.position += delta;
        self.center += delta;

        self.events.push(ControlsEvent::Pan { delta });
        self.events.push(ControlsEvent::Change);
    }

    /// Centre on `bounds` and back the camera off along its current view
    /// axis to four bounding-sphere radii. An empty box centres on
    /// `fallback` at distance 0.1.
    pub fn focus(&mut self, camera: &mut Camera, bounds: &Aabb, fallback: Vec3) {
        let (center, distance) = if bounds.is_empty() {
            (fallback, 0.1)
        } else {
            (bounds.center(), bounds.bounding_sphere_radius())
        };
        self.center = center;
        camera.position = center + camera.rotation * Vec3::Z * (distance * 4.0);
        self.events.push(ControlsEvent::Change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ViewportControls, Camera) {
        (ViewportControls::default(), Camera::default())
    }

    #[test]
    fn defaults() {
        let (controls, _) = setup();
        assert_eq!(controls.pan_speed, 0.001);
        assert_eq!(controls.zoom_speed, 0.1);
        assert_eq!(controls.rotation_speed, 0.005);
        assert!(controls.enabled);
        assert_eq!(controls.movement_mode(), MovementMode::Pan);
    }

    #[test]
    fn rotate_keeps_distance_and_faces_centre() {
        let (mut controls, mut camera) = setup();
        let before = camera.position.length();
        controls.rotate(&mut camera, Vec3::new(-40.0, 10.0, 0.0));
        assert!((camera.position.length() - before).abs() < 1e-4);
        let to_centre = (controls.center - camera.position).normalize();
        assert!((camera.world_direction() - to_centre).length() < 1e-4);
        assert_eq!(
            controls.drain_events(),
            vec![
                ControlsEvent::Rotate {
                    delta: Vec3::new(-40.0, 10.0, 0.0)
                },
                ControlsEvent::Change
            ]
        );
    }

    #[test]
    fn rotate_theta_by_speed() {
        let (mut controls, mut camera) = setup();
        let theta0 = Spherical::from_vec3(camera.position).theta;
        controls.rotate(&mut camera, Vec3::new(100.0, 0.0, 0.0));
        let theta1 = Spherical::from_vec3(camera.position).theta;
        assert!((theta1 - theta0 - 0.5).abs() < 1e-4);
    }

    #[test]
    fn zoom_moves_towards_centre() {
        let (mut controls, mut camera) = setup();
        let d0 = camera.position.length();
        assert!(controls.zoom(&mut camera, Vec3::new(0.0, 0.0, -1.0)));
        let d1 = camera.position.length();
        assert!((d1 - d0 * 0.9).abs() < 1e-3);
        let events = controls.drain_events();
        assert!(matches!(events[0], ControlsEvent::Zoom { .. }));
        assert_eq!(events[1], ControlsEvent::Change);
    }

    #[test]
    fn zoom_rejected_when_overshooting() {
        let (mut controls, mut camera) = setup();
        let before = camera.position;
        // 11 * 0.1 * d > d
        assert!(!controls.zoom(&mut camera, Vec3::new(0.0, 0.0, -11.0)));
        assert_eq!(camera.position, before);
        assert!(controls.drain_events().is_empty());
    }

    #[test]
    fn wheel_sign() {
        let (mut controls, mut camera) = setup();
        let d0 = camera.position.length();
        controls.wheel(&mut camera, 120.0);
        assert!(camera.position.length() > d0);
        let d1 = camera.position.length();
        controls.wheel(&mut camera, -3.0);
        assert!(camera.position.length() < d1);
    }

    #[test]
    fn pan_moves_centre_with_camera() {
        let (mut controls, mut camera) = setup();
        let offset_before = camera.position - controls.center;
        controls.pan(&mut camera, Vec3::new(-50.0, 20.0, 0.0));
        let offset_after = camera.position - controls.center;
        assert!((offset_after - offset_before).length() < 1e-5);
        assert!(controls.center.length() > 0.0);
        // Pan stays in the view plane
        assert!(controls.center.dot(camera.world_direction()).abs() < 1e-4);
    }

    #[test]
    fn buttons_select_mode() {
        let (mut controls, mut camera) = setup();
        controls.pointer_down(0.0, 0.0, MouseButton::Primary);
        assert_eq!(controls.movement_mode(), MovementMode::Rotate);
        assert!(controls.is_captured());
        controls.pointer_up();

        controls.pointer_down(0.0, 0.0, MouseButton::Secondary);
        assert_eq!(controls.movement_mode(), MovementMode::Pan);
        controls.pointer_up();

        controls.pointer_down(0.0, 0.0, MouseButton::Middle);
        assert!(!controls.is_captured());
        let before = camera.position;
        controls.pointer_move(&mut camera, 10.0, 10.0);
        assert_eq!(camera.position, before);

        controls.middle_button_zoom = true;
        controls.pointer_down(0.0, 0.0, MouseButton::Middle);
        assert_eq!(controls.movement_mode(), MovementMode::Zoom);
    }

    #[test]
    fn disabled_ignores_press() {
        let (mut controls, mut camera) = setup();
        controls.enabled = false;
        controls.pointer_down(0.0, 0.0, MouseButton::Primary);
        let before = camera.position;
        controls.pointer_move(&mut camera, 30.0, 0.0);
        assert_eq!(camera.position, before);
        assert!(controls.drain_events().is_empty());
    }

    #[test]
    fn drag_uses_incremental_movement() {
        let (mut controls, mut camera) = setup();
        controls.pointer_down(100.0, 100.0, MouseButton::Primary);
        controls.pointer_move(&mut camera, 110.0, 100.0);
        controls.pointer_move(&mut camera, 120.0, 100.0);
        let rotates: Vec<_> = controls
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                ControlsEvent::Rotate { delta } => Some(delta),
                _ => None,
            })
            .collect();
        assert_eq!(rotates, vec![Vec3::new(-10.0, 0.0, 0.0); 2]);
    }

    #[test]
    fn focus_frames_box() {
        let (mut controls, mut camera) = setup();
        let bounds = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 2.0));
        let dir = camera.world_direction();
        controls.focus(&mut camera, &bounds, Vec3::ZERO);
        assert_eq!(controls.center, Vec3::new(2.0, 1.0, 1.0));
        let expected = 4.0 * bounds.bounding_sphere_radius();
        assert!((camera.position.distance(controls.center) - expected).abs() < 1e-4);
        // View direction unchanged
        assert!((camera.world_direction() - dir).length() < 1e-6);
    }

    #[test]
    fn focus_empty_box_uses_fallback() {
        let (mut controls, mut camera) = setup();
        controls.focus(&mut camera, &Aabb::EMPTY, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(controls.center, Vec3::new(0.0, 1.0, 0.0));
        assert!((camera.position.distance(controls.center) - 0.4).abs() < 1e-5);
    }
}
