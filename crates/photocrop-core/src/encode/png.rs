//! PNG encoding for exported crops.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::types::validate_rgb;
use super::EncodeError;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Encode RGB pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate_rgb(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    let bytes = buffer.into_inner();
    debug_assert!(bytes.starts_with(&PNG_SIGNATURE));
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&[1, 2, 3, 4, 5, 6], 1, 2).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_lossless() {
        let pixels: Vec<u8> = (0..(7 * 5 * 3)).map(|i| (i * 7 % 256) as u8).collect();
        let png = encode_png(&pixels, 7, 5).unwrap();

        let source = crate::decode::load_image(&png).unwrap();
        assert_eq!(source.image.pixels, pixels);
    }

    #[test]
    fn test_encode_png_rejects_bad_buffer() {
        assert!(matches!(
            encode_png(&[0u8; 5], 1, 2),
            Err(EncodeError::InvalidPixelData { expected: 6, actual: 5 })
        ));
        assert!(matches!(
            encode_png(&[], 3, 0),
            Err(EncodeError::InvalidDimensions { width: 3, height: 0 })
        ));
    }
}
