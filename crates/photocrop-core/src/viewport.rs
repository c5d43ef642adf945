//! Viewport state: zoom level and pan offset of one image inside one box.
//!
//! The viewport works in stored-image pixels. `scale` converts image pixels
//! to display pixels, and the offset is the top-left of the visible window
//! in image pixels.
//!
//! # Invariants
//!
//! After construction and after every mutation:
//! - `min_scale <= scale <= max_scale`
//! - `0 <= offset_x <= image.width - box.width / scale` (same for y)
//!
//! `min_scale` is the smallest scale at which the image still covers the
//! box; `max_scale` is the largest scale at which the exported crop is not
//! upsampled beyond native resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orientation::OrientationDescriptor;

/// Errors raised while setting up a viewport.
#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    /// The image cannot cover the box at a scale that also satisfies the
    /// output-size ceiling.
    #[error("Image too small for requested output: min scale {min_scale} exceeds max scale {max_scale}")]
    ImageTooSmall { min_scale: f64, max_scale: f64 },

    /// The image, box or output size has a zero (or non-finite) dimension.
    #[error("Viewport geometry must have positive dimensions")]
    EmptyGeometry,
}

/// Native pixel dimensions of the decoded source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub width: f64,
    pub height: f64,
}

impl ImageMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }
}

/// The fixed on-screen viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayBox {
    pub width: f64,
    pub height: f64,
}

impl DisplayBox {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    /// The box expressed in stored-image axes.
    pub fn oriented(self, descriptor: &OrientationDescriptor) -> Self {
        if descriptor.swap_axes {
            Self {
                width: self.height,
                height: self.width,
            }
        } else {
            self
        }
    }
}

/// Pixel size of the exported raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The output size expressed in stored-image axes.
    pub fn oriented(self, descriptor: &OrientationDescriptor) -> Self {
        let (width, height) = descriptor.to_image_size(self.width, self.height);
        Self { width, height }
    }
}

/// Zoom anchoring policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomAnchor {
    /// Keep the top-left corner of the visible window; re-clamp only.
    #[default]
    TopLeft,
    /// Keep the centre of the visible window fixed, then re-clamp.
    Center,
}

/// Visible region of the source, in native image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleWindow {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Zoom and pan state for one image against one display box.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    image: ImageMetrics,
    display: DisplayBox,
    scale: f64,
    min_scale: f64,
    max_scale: f64,
    offset_x: f64,
    offset_y: f64,
    anchor: ZoomAnchor,
}

#[inline]
fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl Viewport {
    /// Set up a viewport at minimum zoom with the window at the image origin.
    ///
    /// # Errors
    ///
    /// Returns `ViewportError::ImageTooSmall` when the image cannot cover the
    /// box without exceeding the output-size ceiling, and
    /// `ViewportError::EmptyGeometry` for zero-sized inputs.
    pub fn initialize(
        image: ImageMetrics,
        display: DisplayBox,
        output: OutputSize,
    ) -> Result<Self, ViewportError> {
        let (out_w, out_h) = (output.width as f64, output.height as f64);
        if ![image.width, image.height, display.width, display.height, out_w, out_h]
            .into_iter()
            .all(is_positive)
        {
            return Err(ViewportError::EmptyGeometry);
        }

        let min_scale = (display.width / image.width).max(display.height / image.height);
        let max_scale = (display.width / out_w).min(display.height / out_h);

        if min_scale > max_scale {
            return Err(ViewportError::ImageTooSmall {
                min_scale,
                max_scale,
            });
        }

        Ok(Self {
            image,
            display,
            scale: min_scale,
            min_scale,
            max_scale,
            offset_x: 0.0,
            offset_y: 0.0,
            anchor: ZoomAnchor::TopLeft,
        })
    }

    /// Use a different zoom anchoring policy.
    pub fn with_anchor(mut self, anchor: ZoomAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn image(&self) -> ImageMetrics {
        self.image
    }

    pub fn display_box(&self) -> DisplayBox {
        self.display
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    pub fn anchor(&self) -> ZoomAnchor {
        self.anchor
    }

    /// Top-left of the visible window in image pixels.
    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Largest valid offsets at the current scale.
    pub fn max_offset(&self) -> (f64, f64) {
        (
            (self.image.width - self.display.width / self.scale).max(0.0),
            (self.image.height - self.display.height / self.scale).max(0.0),
        )
    }

    /// Pan by a screen-space delta.
    ///
    /// The delta is mapped into image axes through the orientation
    /// descriptor, divided by the scale and clamped. Returns whether either
    /// offset changed.
    pub fn pan(&mut self, dx: f64, dy: f64, compensation: &OrientationDescriptor) -> bool {
        let (dx, dy) = compensation.to_image_delta(dx, dy);
        let (max_x, max_y) = self.max_offset();

        let new_x = (self.offset_x + dx / self.scale).clamp(0.0, max_x);
        let new_y = (self.offset_y + dy / self.scale).clamp(0.0, max_y);

        let changed = new_x != self.offset_x || new_y != self.offset_y;
        self.offset_x = new_x;
        self.offset_y = new_y;
        changed
    }

    /// Zoom by subtracting `delta` from the scale.
    ///
    /// Positive deltas zoom out, negative deltas zoom in. Offsets are
    /// re-clamped against the new window size. Returns whether the scale
    /// changed; there is no tolerance on the comparison.
    pub fn zoom(&mut self, delta: f64) -> bool {
        let old = self.scale;
        let new = (old - delta).max(self.min_scale).min(self.max_scale);
        if new == old {
            return false;
        }

        if self.anchor == ZoomAnchor::Center {
            // Window size shrinks as scale grows; shift by half the change
            self.offset_x += (self.display.width / old - self.display.width / new) / 2.0;
            self.offset_y += (self.display.height / old - self.display.height / new) / 2.0;
        }

        self.scale = new;
        let (max_x, max_y) = self.max_offset();
        self.offset_x = self.offset_x.clamp(0.0, max_x);
        self.offset_y = self.offset_y.clamp(0.0, max_y);
        true
    }

    /// The visible window in native image pixels.
    pub fn visible_window(&self) -> VisibleWindow {
        VisibleWindow {
            x: self.offset_x,
            y: self.offset_y,
            w: self.display.width / self.scale,
            h: self.display.height / self.scale,
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
