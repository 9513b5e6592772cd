use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::gizmo::{GizmoMode, TransformSpace};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Gizmo", inline)]
#[serde(default)]
/// Transform gizmo defaults.
pub struct GizmoOptions {
    /// Handle size multiplier.
    #[schemars(title = "Size", range(min = 0.25, max = 4.0), extend("step" = 0.05))]
    pub size: f32,
    /// Initial transform mode.
    #[schemars(title = "Mode")]
    pub mode: GizmoMode,
    /// Initial coordinate space for translate and rotate.
    #[schemars(title = "Space")]
    pub space: TransformSpace,
    /// Translation snap step in world units.
    #[schemars(title = "Translation Snap")]
    pub translation_snap: Option<f32>,
    /// Rotation snap step in degrees.
    #[schemars(title = "Rotation Snap")]
    pub rotation_snap: Option<f32>,
    /// Scale snap step.
    #[schemars(title = "Scale Snap")]
    pub scale_snap: Option<f32>,
}

impl Default for GizmoOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            mode: GizmoMode::Translate,
            space: TransformSpace::World,
            translation_snap: None,
            rotation_snap: None,
            scale_snap: None,
        }
    }
}
