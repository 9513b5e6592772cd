//! Browser entry point: mounts an editor viewport onto a canvas element.

use serde_json::Value;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsValue;

use crate::editor::Editor;

/// Mount the editor on the canvas with id `canvas_id`.
///
/// `scene_json` is an editor project as produced by the JavaScript editor's
/// `toJSON()`. Without one the viewport shows the spinning cube scaffold.
///
/// # Errors
///
/// Rejects with a message if the project JSON cannot be parsed or the
/// event loop cannot start.
#[wasm_bindgen]
pub fn mount(canvas_id: &str, scene_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("logger already initialized");
    }

    let builder = Editor::builder().with_canvas_id(canvas_id);
    let builder = match scene_json {
        Some(text) => {
            let json: Value = serde_json::from_str(&text)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            builder.with_scene_json(json)
        }
        None => builder.with_spin(true),
    };
    builder
        .build()
        .run()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
