//! Crop session bindings.
//!
//! Touch contacts cross the boundary as flat `Float64Array`s of
//! `[id, x, y, id, x, y, ...]` triples, listing every contact currently
//! on the crop target.
//!
//! Listeners are called after the session has finished the call that
//! raised their events, so they may call back into the session.
//!
//! # Example
//!
//! ```typescript
//! import { CropSession } from '@photocrop/wasm';
//!
//! const session = new CropSession({ outputWidth: 800, outputHeight: 600 });
//! session.add_listener('error.size', () => alert('Image too small'));
//! session.add_listener('image.loaded', () => draw(session.render()));
//! session.read(bytes, box.clientWidth, box.clientHeight);
//!
//! box.addEventListener('touchmove', (e) => session.touch_move(flatten(e.touches)));
//! requestAnimationFrame(function tick() {
//!   if (session.take_redraw()) draw(session.render());
//!   requestAnimationFrame(tick);
//! });
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{gesture_state_name, JsDecodedImage, JsEncodedImage};
use photocrop_core::decode::SourceImage;
use photocrop_core::encode::ExportFormat;
use photocrop_core::gesture::TouchPoint;
use photocrop_core::orientation::Orientation;
use photocrop_core::session::{CropError, CropEvent, CropSession, ListenerId};
use photocrop_core::viewport::DisplayBox;
use photocrop_core::CropConfig;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

fn to_js(e: CropError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Split a flat `[id, x, y, ...]` buffer into touch points.
pub(crate) fn parse_contacts(flat: &[f64]) -> Result<Vec<TouchPoint>, String> {
    if flat.len() % 3 != 0 {
        return Err(format!(
            "Contact buffer length {} is not a multiple of 3",
            flat.len()
        ));
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| TouchPoint::new(c[0] as i64, c[1], c[2]))
        .collect())
}

/// Options of `export_blob`, named after `HTMLCanvasElement.toBlob`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct BlobOptions {
    #[serde(rename = "type")]
    mime_type: String,
    /// JPEG quality in 0.0-1.0
    quality: f64,
}

impl Default for BlobOptions {
    fn default() -> Self {
        Self {
            mime_type: "image/png".to_string(),
            quality: 0.92,
        }
    }
}

impl BlobOptions {
    /// Unsupported types fall back to PNG, as a canvas does.
    pub(crate) fn format(&self) -> ExportFormat {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => ExportFormat::Jpeg {
                quality: (self.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8,
            },
            _ => ExportFormat::Png,
        }
    }
}

type EventQueue = Rc<RefCell<Vec<(js_sys::Function, CropEvent)>>>;

/// A crop target with its loaded image and gesture state.
#[wasm_bindgen(js_name = CropSession)]
pub struct JsCropSession {
    inner: RefCell<CropSession>,
    queued: EventQueue,
}

#[wasm_bindgen(js_class = CropSession)]
impl JsCropSession {
    /// Create a session from an options object (or `undefined` for defaults).
    ///
    /// Recognized keys: `zoomSpeed`, `scrollSpeed`, `zoomDelay`,
    /// `useRequestAnimationFrame`, `outputWidth`, `outputHeight`,
    /// `zoomAnchor` (`"topLeft"` or `"center"`) and `exportFilter`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsCropSession, JsValue> {
        let config: CropConfig = if options.is_undefined() || options.is_null() {
            CropConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?
        };
        Self::with_config(config).map_err(to_js)
    }

    /// Decode picked bytes and show them in a box of the given size.
    pub fn read(&self, bytes: &[u8], box_width: u32, box_height: u32) -> Result<(), JsValue> {
        self.update(|s| s.read(bytes, DisplayBox::new(box_width, box_height)))
            .map_err(to_js)
    }

    /// Show an already decoded raster with an EXIF orientation code.
    pub fn show(
        &self,
        image: &JsDecodedImage,
        orientation: u32,
        box_width: u32,
        box_height: u32,
    ) -> Result<(), JsValue> {
        let source = SourceImage::new(image.to_decoded(), Orientation::from(orientation));
        self.update(|s| s.show(source, DisplayBox::new(box_width, box_height)))
            .map_err(to_js)
    }

    pub fn reset(&self) {
        self.update(CropSession::reset);
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.borrow().viewport().is_some()
    }

    /// Current scale, or NaN without an image.
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.borrow().viewport().map_or(f64::NAN, |v| v.scale())
    }

    /// Handle `touchstart`. Returns the gesture state name.
    pub fn touch_start(&self, contacts: &[f64]) -> Result<String, JsValue> {
        let active = parse_contacts(contacts).map_err(|e| JsValue::from_str(&e))?;
        let state = self.update(|s| s.touch_start(&active));
        Ok(gesture_state_name(state).to_string())
    }

    /// Handle `touchend` / `touchcancel`. Returns the gesture state name.
    pub fn touch_end(&self, contacts: &[f64]) -> Result<String, JsValue> {
        let active = parse_contacts(contacts).map_err(|e| JsValue::from_str(&e))?;
        let state = self.update(|s| s.touch_end(&active));
        Ok(gesture_state_name(state).to_string())
    }

    /// Handle `touchmove`. Returns whether the viewport changed.
    pub fn touch_move(&self, contacts: &[f64]) -> Result<bool, JsValue> {
        let active = parse_contacts(contacts).map_err(|e| JsValue::from_str(&e))?;
        Ok(self.update(|s| s.touch_move(&active)))
    }

    /// Consume the pending redraw flag.
    pub fn take_redraw(&self) -> bool {
        self.inner.borrow_mut().take_redraw()
    }

    /// `{ x, y, w, h }` in stored-image pixels, or `undefined` without an image.
    pub fn visible_window(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.borrow().visible_window())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Orientation descriptor of the loaded image, or `undefined`.
    pub fn orientation(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.borrow().orientation())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Draw transform name (`"Rotate90CW"`, ...) of the loaded image, or `undefined`.
    pub fn draw_transform(&self) -> Result<JsValue, JsValue> {
        let transform = self.inner.borrow().orientation().map(|d| d.draw_transform);
        serde_wasm_bindgen::to_value(&transform).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Rasterize the current view at box size.
    pub fn render(&self) -> Result<JsDecodedImage, JsValue> {
        self.inner
            .borrow()
            .render()
            .map(JsDecodedImage::from_decoded)
            .map_err(to_js)
    }

    /// Export the visible region at the output size.
    pub fn export(&self) -> Result<JsDecodedImage, JsValue> {
        self.inner
            .borrow()
            .export()
            .map(JsDecodedImage::from_decoded)
            .map_err(to_js)
    }

    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.export_format(ExportFormat::Png)
            .map(JsEncodedImage::into_bytes)
    }

    pub fn export_jpeg(&self, quality: u8) -> Result<Vec<u8>, JsValue> {
        self.export_format(ExportFormat::Jpeg { quality })
            .map(JsEncodedImage::into_bytes)
    }

    /// Export and encode for `new Blob([e.bytes()], { type: e.mime_type })`.
    ///
    /// `options` is `{ type, quality }` as for `canvas.toBlob`; omitted
    /// fields default to PNG and 0.92.
    pub fn export_blob(&self, options: JsValue) -> Result<JsEncodedImage, JsValue> {
        let options: BlobOptions = if options.is_undefined() || options.is_null() {
            BlobOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid export options: {}", e)))?
        };
        self.export_format(options.format())
    }

    /// Register `callback(eventName)` for one event name, or for every event
    /// when `event` is omitted. Returns an id for `remove_listener`.
    pub fn add_listener(
        &self,
        event: Option<String>,
        callback: js_sys::Function,
    ) -> Result<u32, JsValue> {
        let filter = match event.as_deref() {
            None => None,
            Some(name) => Some(
                CropEvent::from_name(name)
                    .ok_or_else(|| JsValue::from_str(&format!("Unknown event: {}", name)))?,
            ),
        };

        let queue = Rc::clone(&self.queued);
        let id = self.inner.borrow_mut().add_listener(filter, move |event| {
            queue.borrow_mut().push((callback.clone(), event));
        });
        Ok(id.get())
    }

    pub fn remove_listener(&self, id: u32) -> bool {
        self.inner.borrow_mut().remove_listener(ListenerId::from(id))
    }
}

impl JsCropSession {
    pub(crate) fn with_config(config: CropConfig) -> Result<Self, CropError> {
        CropSession::new(config).map(|inner| Self {
            inner: RefCell::new(inner),
            queued: Rc::default(),
        })
    }

    /// Run a mutation, then deliver the events it raised.
    fn update<T>(&self, f: impl FnOnce(&mut CropSession) -> T) -> T {
        let result = f(&mut self.inner.borrow_mut());
        self.dispatch();
        result
    }

    fn dispatch(&self) {
        let pending = std::mem::take(&mut *self.queued.borrow_mut());
        for (callback, event) in pending {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(event.name())) {
                web_sys::console::error_2(&JsValue::from_str("Crop listener failed:"), &e);
            }
        }
    }

    fn export_format(&self, format: ExportFormat) -> Result<JsEncodedImage, JsValue> {
        self.inner
            .borrow()
            .export_encoded(format)
            .map(|bytes| JsEncodedImage::new(bytes, format.mime_type()))
            .map_err(to_js)
    }
}
