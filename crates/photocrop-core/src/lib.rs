//! Photocrop Core - Viewport transform engine
//!
//! This crate provides the core functionality for touch-driven photo
//! cropping: EXIF orientation compensation, the zoom/pan viewport model,
//! touch gesture interpretation and export of the visible crop.
//!
//! # Layers
//!
//! - [`orientation`] maps EXIF orientation codes to draw transforms and
//!   gesture compensation.
//! - [`viewport`] holds scale and offset and enforces their bounds.
//! - [`gesture`] turns touch samples into pan and zoom calls.
//! - [`export`] renders the visible window at the output size.
//! - [`session`] ties the above to one loaded image and its listeners.

pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod gesture;
pub mod orientation;
pub mod session;
pub mod viewport;

pub use config::{ConfigError, CropConfig};
pub use decode::{load_image, DecodeError, DecodedImage, FilterType, SourceImage};
pub use encode::{EncodeError, ExportFormat};
pub use export::{export, export_encoded, ExportError};
pub use gesture::{GestureConfig, GestureInterpreter, GestureState, TouchId, TouchPoint};
pub use orientation::{compensate, DrawTransform, Orientation, OrientationDescriptor};
pub use session::{CropError, CropEvent, CropSession, ListenerId};
pub use viewport::{
    DisplayBox, ImageMetrics, OutputSize, Viewport, ViewportError, VisibleWindow, ZoomAnchor,
};
