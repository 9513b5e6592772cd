use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
/// Orbit, zoom and pan sensitivity.
pub struct ControlsOptions {
    /// Radians of orbit per pixel of drag.
    #[schemars(title = "Rotate Speed", range(min = 0.001, max = 0.02), extend("step" = 0.001))]
    pub rotation_speed: f32,
    /// Fraction of the orbit distance moved per wheel step.
    #[schemars(title = "Zoom Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_speed: f32,
    /// Fraction of the orbit distance moved per pixel of pan drag.
    #[schemars(title = "Pan Speed", range(min = 0.0001, max = 0.01), extend("step" = 0.0001))]
    pub pan_speed: f32,
    /// Middle-button drag zooms instead of being ignored.
    #[schemars(title = "Middle Button Zoom")]
    pub middle_button_zoom: bool,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            rotation_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.001,
            middle_button_zoom: false,
        }
    }
}
