//! Encoding of exported crops.
//!
//! This module provides functionality for:
//! - Encoding RGB rasters to PNG (the default export container)
//! - Encoding RGB rasters to JPEG with configurable quality
//!
//! All operations are synchronous and single-threaded.

mod jpeg;
mod png;
mod types;

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use types::{EncodeError, ExportFormat};

use crate::decode::DecodedImage;

/// Encode a raster in the requested container.
pub fn encode(image: &DecodedImage, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(&image.pixels, image.width, image.height),
        ExportFormat::Jpeg { quality } => {
            encode_jpeg(&image.pixels, image.width, image.height, quality)
        }
    }
}
