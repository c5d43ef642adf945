//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_png`] / [`encode_jpeg`] - Encode raw RGB pixel data
//! - [`encode_png_from_image`] / [`encode_jpeg_from_image`] - Encode a JsDecodedImage
//!
//! # Example
//!
//! ```typescript
//! import { encode_jpeg_from_image } from '@photocrop/wasm';
//!
//! const jpegBytes = encode_jpeg_from_image(session.export(), 90);
//! ```

use crate::types::JsDecodedImage;
use photocrop_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data to PNG bytes.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGB pixel data to JPEG bytes.
///
/// `quality` ranges from 1 to 100; values outside are clamped.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a JsDecodedImage to PNG bytes.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    encode_png(&image.pixels(), image.width(), image.height())
}

/// Encode a JsDecodedImage to JPEG bytes.
#[wasm_bindgen]
pub fn encode_jpeg_from_image(image: &JsDecodedImage, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode_jpeg(&image.pixels(), image.width(), image.height(), quality)
}
