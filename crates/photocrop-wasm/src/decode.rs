//! Image loading WASM bindings.
//!
//! # Functions
//!
//! - [`load_image`] - Decode picked bytes without applying EXIF orientation
//! - [`read_orientation`] - Read the EXIF orientation code (1-8)
//! - [`upright`] - Apply an orientation's draw transform to a raster
//!
//! # Example
//!
//! ```typescript
//! import { load_image, read_orientation, upright } from '@photocrop/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const stored = load_image(bytes);
//! const shown = upright(stored, read_orientation(bytes));
//! ```

use crate::types::JsDecodedImage;
use photocrop_core::decode;
use photocrop_core::orientation::compensate;
use wasm_bindgen::prelude::*;

/// Decode JPEG or PNG bytes into an RGB raster in stored orientation.
///
/// # Errors
///
/// Returns an error if the bytes are not an image or are corrupted.
#[wasm_bindgen]
pub fn load_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::load_image(bytes)
        .map(|source| JsDecodedImage::from_decoded(source.image))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read the EXIF orientation code. Returns 1 when absent or unreadable.
#[wasm_bindgen]
pub fn read_orientation(bytes: &[u8]) -> u8 {
    decode::get_orientation(bytes).code()
}

/// Turn a stored raster upright for the given orientation code.
///
/// Unknown codes are treated as 1.
#[wasm_bindgen]
pub fn upright(image: &JsDecodedImage, orientation: u32) -> JsDecodedImage {
    let transform = compensate(orientation).draw_transform;
    JsDecodedImage::from_decoded(transform.apply(&image.to_decoded()))
}
