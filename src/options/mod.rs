//! Viewport options with TOML file support.
//!
//! Theme, camera, control speeds, gizmo, grid and keybindings are
//! consolidated here. Every section uses `#[serde(default)]` so a partial
//! TOML file (e.g. only `[controls]`) fills the rest with defaults.

mod camera;
mod controls;
mod gizmo;
mod grid;
mod keybindings;
mod theme;

use std::path::Path;

pub use camera::CameraOptions;
pub use controls::ControlsOptions;
pub use gizmo::GizmoOptions;
pub use grid::GridOptions;
pub use keybindings::{KeyBindings, KeyCommandTag};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use theme::{ColorScheme, Theme, ThemeOptions};

use crate::error::ViewportError;

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Colour scheme selection.
    pub theme: ThemeOptions,
    /// Default viewport camera.
    pub camera: CameraOptions,
    /// Orbit/zoom/pan control speeds.
    pub controls: ControlsOptions,
    /// Transform gizmo defaults.
    pub gizmo: GizmoOptions,
    /// Ground grid overlay.
    pub grid: GridOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeyBindings,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, ViewportError> {
        toml::from_str(content)
            .map_err(|e| ViewportError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewportError> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml(&content)?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ViewportError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ViewportError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::TransformSpace;
    use crate::viewport::ViewportCommand;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[controls]
rotation_speed = 0.01
middle_button_zoom = true
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert_eq!(opts.controls.rotation_speed, 0.01);
        assert!(opts.controls.middle_button_zoom);
        // Everything else should be default
        assert_eq!(opts.controls.zoom_speed, 0.1);
        assert_eq!(opts.camera.fov, 50.0);
        assert_eq!(opts.theme.color_scheme, ColorScheme::Auto);
        assert_eq!(opts.gizmo.space, TransformSpace::World);
    }

    #[test]
    fn invalid_toml_is_an_options_error() {
        let err = Options::from_toml("[controls]\nrotation_speed = \"fast\"")
            .unwrap_err();
        assert!(matches!(err, ViewportError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("KeyF"),
            Some(ViewportCommand::FocusSelected)
        );
        assert_eq!(
            opts.keybindings.lookup("Escape"),
            Some(ViewportCommand::ClearSelection)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn keybindings_override_from_toml() {
        let toml_str = r#"
[keybindings.bindings]
KeyG = "translate_mode"
"#;
        let opts = Options::from_toml(toml_str).unwrap();
        assert!(opts.keybindings.lookup("KeyG").is_some());
        // Custom table replaces the defaults
        assert_eq!(opts.keybindings.lookup("KeyW"), None);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("stageview-options-{}", std::process::id()));
        let path = dir.join("options.toml");
        let mut opts = Options::default();
        opts.grid.divisions = 12;
        opts.theme.color_scheme = ColorScheme::Dark;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("theme"));
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("controls"));
        assert!(props.contains_key("gizmo"));
        assert!(props.contains_key("grid"));
        assert!(!props.contains_key("keybindings"));

        let camera = &props["camera"]["properties"];
        assert!(camera.get("fov").is_some());
        assert!(camera.get("near").is_none());
    }
}
