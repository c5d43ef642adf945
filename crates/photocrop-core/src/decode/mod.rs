//! Source image loading for the crop viewport.
//!
//! This module provides functionality for:
//! - Sniffing the format of picked bytes (rejecting anything that is not an image)
//! - Decoding JPEG and PNG into RGB pixel data
//! - Reading the EXIF orientation tag without applying it
//!
//! # Architecture
//!
//! Decoding is synchronous and single-threaded. The crop session calls
//! [`load_image`] once per picked file.

mod source;
mod types;

pub use source::{get_orientation, load_image};
pub use types::{DecodeError, DecodedImage, FilterType, SourceImage};
pub use crate::orientation::Orientation;
