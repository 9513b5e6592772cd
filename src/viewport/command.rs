use crate::gizmo::GizmoMode;

/// Discrete editor actions, usually bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportCommand {
    /// Switch the gizmo to translate, rotate or scale.
    SetMode(GizmoMode),
    /// Flip the gizmo between world and local space.
    ToggleSpace,
    /// Move the camera to frame the selected object.
    FocusSelected,
    /// Remove the selected object from the scene.
    DeleteSelected,
    /// Drop the selection.
    ClearSelection,
    /// Restore the configured default camera.
    ResetCamera,
}
