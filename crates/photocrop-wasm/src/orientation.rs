//! Orientation compensation bindings.

use photocrop_core::orientation;
use wasm_bindgen::prelude::*;

/// Compensation descriptor for an EXIF orientation code.
///
/// Returns `{ swap_axes, invert_x, invert_y, draw_transform }`. Unknown
/// codes yield the identity descriptor.
#[wasm_bindgen]
pub fn compensate(code: u32) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&orientation::compensate(code))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whether an orientation code displays the image with width and height swapped.
#[wasm_bindgen]
pub fn swaps_axes(code: u32) -> bool {
    orientation::compensate(code).swap_axes
}
