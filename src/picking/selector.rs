//! Click-to-select: a press and release at the same spot picks the nearest
//! visible object under the pointer. Any movement in between is a drag
//! and selects nothing.

use glam::Vec2;

use super::raycaster::{Intersection, Raycaster};
use crate::camera::core::Camera;
use crate::scene::{NodeId, Scene};

/// Emitted when a click resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    /// The clicked object, or `None` for a click on empty space.
    Change {
        /// New selection.
        selected: Option<NodeId>,
    },
}

/// Pointer-down/up tracker that turns clicks into selection changes.
#[derive(Debug, Clone, Default)]
pub struct ViewportSelector {
    raycaster: Raycaster,
    down: Option<Vec2>,
}

impl ViewportSelector {
    /// Selector with a default raycaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Presses not aimed at the canvas are ignored.
    pub fn pointer_down(&mut self, x: f32, y: f32, on_canvas: bool, canvas: Vec2) {
        if !on_canvas {
            return;
        }
        self.down = Some(normalized(x, y, canvas));
    }

    /// Whether a press is waiting for its release.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.down.is_some()
    }

    /// Resolve a release. Returns a selection change only if the release is
    /// at exactly the press position. The pending press is always cleared.
    pub fn pointer_up(
        &mut self,
        x: f32,
        y: f32,
        canvas: Vec2,
        scene: &Scene,
        camera: &Camera,
    ) -> Option<SelectorEvent> {
        let down = self.down.take()?;
        let up = normalized(x, y, canvas);
        if down.distance(up) != 0.0 {
            return None;
        }
        let ndc = Vec2::new(up.x * 2.0 - 1.0, -(up.y * 2.0) + 1.0);
        let selected = self.pick(ndc, scene, camera).first().map(|hit| hit.node);
        log::debug!("selector: click at {ndc:?} -> {selected:?}");
        Some(SelectorEvent::Change { selected })
    }

    /// Every visible object under `ndc`, nearest first.
    #[must_use]
    pub fn pick(
        &mut self,
        ndc: Vec2,
        scene: &Scene,
        camera: &Camera,
    ) -> Vec<Intersection> {
        self.raycaster.set_from_camera(ndc, camera);
        let objects = scene.visible_objects();
        self.raycaster.intersect_objects(scene, &objects, false)
    }
}

fn normalized(x: f32, y: f32, canvas: Vec2) -> Vec2 {
    Vec2::new(x, y) / canvas.max(Vec2::ONE)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::scene::{Geometry, Material, Object3D};

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    fn scene_with_cube() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let id = scene.add(Object3D::mesh(
            Arc::new(Geometry::unit_box()),
            Arc::new(Material::default()),
        ));
        (scene, id)
    }

    #[test]
    fn click_on_object_selects_it() {
        let (scene, id) = scene_with_cube();
        let camera = Camera::default();
        let mut selector = ViewportSelector::new();
        selector.pointer_down(400.0, 300.0, true, CANVAS);
        let event = selector.pointer_up(400.0, 300.0, CANVAS, &scene, &camera);
        assert_eq!(event, Some(SelectorEvent::Change { selected: Some(id) }));
        assert!(!selector.is_pending());
    }

    #[test]
    fn click_on_empty_space_clears() {
        let (scene, _) = scene_with_cube();
        let camera = Camera::default();
        let mut selector = ViewportSelector::new();
        selector.pointer_down(5.0, 5.0, true, CANVAS);
        let event = selector.pointer_up(5.0, 5.0, CANVAS, &scene, &camera);
        assert_eq!(event, Some(SelectorEvent::Change { selected: None }));
    }

    #[test]
    fn drag_selects_nothing() {
        let (scene, _) = scene_with_cube();
        let camera = Camera::default();
        let mut selector = ViewportSelector::new();
        selector.pointer_down(400.0, 300.0, true, CANVAS);
        assert!(selector
            .pointer_up(401.0, 300.0, CANVAS, &scene, &camera)
            .is_none());
        assert!(!selector.is_pending());
    }

    #[test]
    fn press_off_canvas_ignored() {
        let (scene, _) = scene_with_cube();
        let camera = Camera::default();
        let mut selector = ViewportSelector::new();
        selector.pointer_down(400.0, 300.0, false, CANVAS);
        assert!(!selector.is_pending());
        assert!(selector
            .pointer_up(400.0, 300.0, CANVAS, &scene, &camera)
            .is_none());
    }

    #[test]
    fn hidden_objects_are_not_picked() {
        let (mut scene, id) = scene_with_cube();
        scene.get_mut(id).unwrap().visible = false;
        let mut selector = ViewportSelector::new();
        let hits = selector.pick(Vec2::ZERO, &scene, &Camera::default());
        assert!(hits.is_empty());
    }

    #[test]
    fn nearest_of_stacked_objects_wins() {
        let (mut scene, _) = scene_with_cube();
        // A second cube between the camera and the first one
        let camera = Camera::default();
        let toward_camera = camera.position.normalize() * 3.0;
        let front = scene.add(
            Object3D::mesh(
                Arc::new(Geometry::unit_box()),
                Arc::new(Material::default()),
            )
            .with_position(toward_camera),
        );
        let mut selector = ViewportSelector::new();
        let hits = selector.pick(Vec2::ZERO, &scene, &camera);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, front);
        assert!(hits[0].distance < hits[1].distance);
    }
}
