//! EXIF orientation compensation.
//!
//! Photos are stored the way the sensor read them and carry an EXIF tag that
//! says how to turn them upright. The crop viewport never bakes that rotation
//! into the pixels. Instead the renderer applies a [`DrawTransform`] at draw
//! time, and touch deltas are reconciled with stored-image axes through the
//! flags of an [`OrientationDescriptor`].
//!
//! # Coordinate System
//!
//! - Screen space: DisplayBox-local, origin top-left, x right, y down
//! - Image space: stored (unrotated) pixels, origin top-left
//!
//! Rotating or mirroring the drawn image rotates or mirrors the perceived
//! drag direction, while the touch coordinate system stays put.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (mirror across the main diagonal).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (mirror across the anti-diagonal).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }

    /// The raw EXIF tag value.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Raster operation that turns a stored image upright before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawTransform {
    #[default]
    Identity,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Rotate 90° clockwise, then mirror horizontally.
    Transpose,
    Rotate90CW,
    /// Rotate 90° counter-clockwise, then mirror horizontally.
    Transverse,
    Rotate90CCW,
}

impl DrawTransform {
    /// The transform that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            DrawTransform::Rotate90CW => DrawTransform::Rotate90CCW,
            DrawTransform::Rotate90CCW => DrawTransform::Rotate90CW,
            // Flips, the half turn and both diagonal mirrors are involutions
            other => other,
        }
    }

    /// Whether the transform exchanges the width and height of the raster.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            DrawTransform::Transpose
                | DrawTransform::Rotate90CW
                | DrawTransform::Transverse
                | DrawTransform::Rotate90CCW
        )
    }

    /// Dimensions of a `width x height` raster after the transform.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Map a source pixel coordinate to its destination coordinate.
    #[inline]
    fn map_pixel(self, x: u32, y: u32, width: u32, height: u32) -> (u32, u32) {
        match self {
            DrawTransform::Identity => (x, y),
            DrawTransform::FlipHorizontal => (width - 1 - x, y),
            DrawTransform::Rotate180 => (width - 1 - x, height - 1 - y),
            DrawTransform::FlipVertical => (x, height - 1 - y),
            DrawTransform::Transpose => (y, x),
            DrawTransform::Rotate90CW => (height - 1 - y, x),
            DrawTransform::Transverse => (height - 1 - y, width - 1 - x),
            DrawTransform::Rotate90CCW => (y, width - 1 - x),
        }
    }

    /// Apply the transform to a raster, producing a new image.
    ///
    /// Empty images are returned unchanged.
    pub fn apply(self, image: &DecodedImage) -> DecodedImage {
        if self == DrawTransform::Identity || image.is_empty() {
            return image.clone();
        }

        let (src_w, src_h) = (image.width, image.height);
        let (dst_w, dst_h) = self.output_dimensions(src_w, src_h);
        let mut output = vec![0u8; image.pixels.len()];

        for y in 0..src_h {
            let src_row_start = (y * src_w * 3) as usize;
            for x in 0..src_w {
                let (dx, dy) = self.map_pixel(x, y, src_w, src_h);
                let src_idx = src_row_start + (x * 3) as usize;
                let dst_idx = ((dy * dst_w + dx) * 3) as usize;
                output[dst_idx..dst_idx + 3].copy_from_slice(&image.pixels[src_idx..src_idx + 3]);
            }
        }

        DecodedImage {
            width: dst_w,
            height: dst_h,
            pixels: output,
        }
    }
}

/// How screen-space gestures and drawing relate to stored-image axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrientationDescriptor {
    /// Screen x moves along image y and vice versa.
    pub swap_axes: bool,
    /// Negate the horizontal screen delta before any swap.
    pub invert_x: bool,
    /// Negate the vertical screen delta before any swap.
    pub invert_y: bool,
    /// Transform the renderer applies before copying pixels.
    pub draw_transform: DrawTransform,
}

impl OrientationDescriptor {
    /// Convert a screen-space delta into an image-space delta.
    ///
    /// Inversion is applied first, then the axis swap.
    pub fn to_image_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        let dx = if self.invert_x { -dx } else { dx };
        let dy = if self.invert_y { -dy } else { dy };
        if self.swap_axes {
            (dy, dx)
        } else {
            (dx, dy)
        }
    }

    /// Express a screen-space size in stored-image axes.
    pub fn to_image_size(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swap_axes {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Derive the orientation descriptor for an EXIF orientation code.
///
/// Unknown codes (including 0 and anything above 8) behave as code 1.
pub fn compensate(code: u32) -> OrientationDescriptor {
    Orientation::from(code).into()
}

impl From<Orientation> for OrientationDescriptor {
    fn from(orientation: Orientation) -> Self {
        let (swap_axes, invert_x, invert_y, draw_transform) = match orientation {
            Orientation::Normal => (false, false, false, DrawTransform::Identity),
            Orientation::FlipHorizontal => (false, true, false, DrawTransform::FlipHorizontal),
            Orientation::Rotate180 => (false, true, true, DrawTransform::Rotate180),
            Orientation::FlipVertical => (false, false, true, DrawTransform::FlipVertical),
            Orientation::Transpose => (true, false, false, DrawTransform::Transpose),
            Orientation::Rotate90CW => (true, true, false, DrawTransform::Rotate90CW),
            Orientation::Transverse => (true, true, true, DrawTransform::Transverse),
            Orientation::Rotate270CW => (true, false, true, DrawTransform::Rotate90CCW),
        };
        Self {
            swap_axes,
            invert_x,
            invert_y,
            draw_transform,
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
