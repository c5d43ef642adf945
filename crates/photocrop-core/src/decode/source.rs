//! Loading a picked photo: format sniffing, decoding and EXIF orientation.
//!
//! Pixels are kept exactly as stored. The orientation tag travels alongside
//! them so the viewport can compensate at draw time instead of rotating a
//! multi-megapixel buffer up front.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{ImageError, ImageReader};

use super::{DecodeError, DecodedImage, SourceImage};
use crate::orientation::Orientation;

/// Decode picked image bytes into a [`SourceImage`].
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a recognized
/// image format, and `DecodeError::CorruptedFile` if decoding fails.
pub fn load_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    // Recognized containers without a compiled-in decoder count as unsupported
    if !reader.format().is_some_and(|f| f.reading_enabled()) {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        e => DecodeError::CorruptedFile(e.to_string()),
    })?;

    let orientation = get_orientation(bytes);
    let image = DecodedImage::from_rgb_image(img.into_rgb8());

    tracing::debug!(
        width = image.width,
        height = image.height,
        orientation = orientation.code(),
        "Decoded source image"
    );

    Ok(SourceImage::new(image, orientation))
}

/// Extract the EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
