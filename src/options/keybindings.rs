use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gizmo::GizmoMode;
use crate::viewport::ViewportCommand;

/// Maps physical key strings to [`ViewportCommand`] variants.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format:
/// `"KeyW"`, `"Delete"`, `"Escape"`, etc. In TOML:
///
/// ```toml
/// [keybindings.bindings]
/// KeyW = "translate_mode"
/// KeyF = "focus_selected"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Forward map: key string → command tag.
    pub bindings: HashMap<String, KeyCommandTag>,
}

/// Serializable tag for the key-bindable subset of [`ViewportCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommandTag {
    /// Gizmo translate mode.
    TranslateMode,
    /// Gizmo rotate mode.
    RotateMode,
    /// Gizmo scale mode.
    ScaleMode,
    /// Toggle world/local gizmo space.
    ToggleSpace,
    /// Frame the selected object.
    FocusSelected,
    /// Remove the selected object from the scene.
    DeleteSelected,
    /// Drop the selection.
    ClearSelection,
    /// Restore the default camera.
    ResetCamera,
}

impl KeyCommandTag {
    fn to_command(self) -> ViewportCommand {
        match self {
            Self::TranslateMode => ViewportCommand::SetMode(GizmoMode::Translate),
            Self::RotateMode => ViewportCommand::SetMode(GizmoMode::Rotate),
            Self::ScaleMode => ViewportCommand::SetMode(GizmoMode::Scale),
            Self::ToggleSpace => ViewportCommand::ToggleSpace,
            Self::FocusSelected => ViewportCommand::FocusSelected,
            Self::DeleteSelected => ViewportCommand::DeleteSelected,
            Self::ClearSelection => ViewportCommand::ClearSelection,
            Self::ResetCamera => ViewportCommand::ResetCamera,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyW".into(), KeyCommandTag::TranslateMode),
            ("KeyE".into(), KeyCommandTag::RotateMode),
            ("KeyR".into(), KeyCommandTag::ScaleMode),
            ("KeyQ".into(), KeyCommandTag::ToggleSpace),
            ("KeyF".into(), KeyCommandTag::FocusSelected),
            ("Delete".into(), KeyCommandTag::DeleteSelected),
            ("Escape".into(), KeyCommandTag::ClearSelection),
            ("Home".into(), KeyCommandTag::ResetCamera),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the command for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<ViewportCommand> {
        self.bindings.get(key).copied().map(KeyCommandTag::to_command)
    }
}
