//! Photocrop WASM - WebAssembly bindings for Photocrop
//!
//! This crate provides WASM bindings to expose the photocrop-core viewport
//! engine to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `session` - The crop session: load, touch gestures, redraw, export
//! - `orientation` - EXIF orientation compensation descriptors
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image loading bindings (JPEG/PNG, EXIF orientation)
//! - `encode` - Image encoding bindings (PNG and JPEG export)
//!
//! # Usage
//!
//! ```typescript
//! import init, { CropSession } from '@photocrop/wasm';
//!
//! await init();
//!
//! const session = new CropSession({ outputWidth: 1080, outputHeight: 1080 });
//! session.read(new Uint8Array(await file.arrayBuffer()), 320, 320);
//! const png = session.export_png();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod orientation;
mod session;
mod types;

// Re-export public types
pub use decode::{load_image, read_orientation, upright};
pub use encode::{encode_jpeg, encode_jpeg_from_image, encode_png, encode_png_from_image};
pub use orientation::{compensate, swaps_axes};
pub use session::JsCropSession;
pub use types::{JsDecodedImage, JsEncodedImage};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
