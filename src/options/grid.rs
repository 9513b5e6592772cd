use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Grid", inline)]
#[serde(default)]
/// Ground grid overlay on the XZ plane.
pub struct GridOptions {
    /// Show the grid.
    #[schemars(title = "Visible")]
    pub visible: bool,
    /// Edge length of the grid.
    #[schemars(title = "Size", range(min = 1.0, max = 1000.0), extend("step" = 1.0))]
    pub size: f32,
    /// Fine divisions across the grid.
    #[schemars(title = "Divisions", range(min = 1, max = 500))]
    pub divisions: u32,
    /// Coarse divisions drawn on top of the fine grid.
    #[schemars(title = "Major Divisions", range(min = 1, max = 100))]
    pub major_divisions: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            visible: true,
            size: 30.0,
            divisions: 30,
            major_divisions: 6,
        }
    }
}
