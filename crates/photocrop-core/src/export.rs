//! Export of the visible crop.
//!
//! The exporter reads the viewport's visible window, cuts that region out
//! of the stored source, resamples it to the requested size and finally
//! applies the same draw transform the renderer uses, so the exported
//! raster matches what was on screen.

use image::imageops;
use thiserror::Error;

use crate::decode::{DecodedImage, FilterType};
use crate::encode::{self, EncodeError, ExportFormat};
use crate::orientation::DrawTransform;
use crate::viewport::{OutputSize, Viewport};

/// Errors that can occur while exporting a crop.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The source raster is empty or its buffer does not match its size.
    #[error("Invalid source image: {0}")]
    InvalidSource(String),

    /// The requested output has a zero dimension.
    #[error("Invalid output size: {width}x{height}")]
    InvalidOutputSize { width: u32, height: u32 },

    /// Encoding the exported raster failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Integer pixel rectangle inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

/// Round the viewport's fractional window onto the source pixel grid.
fn source_rect(viewport: &Viewport, image: &DecodedImage) -> PixelRect {
    let win = viewport.visible_window();

    let left = (win.x.round().max(0.0) as u32).min(image.width - 1);
    let top = (win.y.round().max(0.0) as u32).min(image.height - 1);
    let width = (win.w.round().max(1.0) as u32).min(image.width - left);
    let height = (win.h.round().max(1.0) as u32).min(image.height - top);

    PixelRect {
        left,
        top,
        width,
        height,
    }
}

/// Produce the cropped raster for the current viewport.
///
/// # Arguments
///
/// * `viewport` - Viewport whose visible window is exported (read only)
/// * `image` - Source raster in stored orientation
/// * `output` - Final raster size, in upright (screen) axes
/// * `transform` - Draw transform of the source's orientation
/// * `filter` - Resampling filter
///
/// # Returns
///
/// A `DecodedImage` of exactly `output.width x output.height` pixels.
pub fn export(
    viewport: &Viewport,
    image: &DecodedImage,
    output: OutputSize,
    transform: DrawTransform,
    filter: FilterType,
) -> Result<DecodedImage, ExportError> {
    if output.width == 0 || output.height == 0 {
        return Err(ExportError::InvalidOutputSize {
            width: output.width,
            height: output.height,
        });
    }
    if image.is_empty() {
        return Err(ExportError::InvalidSource("empty image".to_string()));
    }

    let rgb = image.to_rgb_image().ok_or_else(|| {
        ExportError::InvalidSource(format!(
            "pixel buffer of {} bytes does not match {}x{}",
            image.pixels.len(),
            image.width,
            image.height
        ))
    })?;

    // Resample in stored axes, then turn upright
    let (target_w, target_h) = transform.output_dimensions(output.width, output.height);
    let rect = source_rect(viewport, image);
    let region = imageops::crop_imm(&rgb, rect.left, rect.top, rect.width, rect.height).to_image();

    let scaled = if (rect.width, rect.height) == (target_w, target_h) {
        region
    } else {
        imageops::resize(&region, target_w, target_h, filter.to_image_filter())
    };

    tracing::debug!(
        x = rect.left,
        y = rect.top,
        w = rect.width,
        h = rect.height,
        out_w = output.width,
        out_h = output.height,
        "Exported crop"
    );

    Ok(transform.apply(&DecodedImage::from_rgb_image(scaled)))
}

/// Export the current crop and encode it.
pub fn export_encoded(
    viewport: &Viewport,
    image: &DecodedImage,
    output: OutputSize,
    transform: DrawTransform,
    filter: FilterType,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let raster = export(viewport, image, output, transform, filter)?;
    Ok(encode::encode(&raster, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::compensate;
    use crate::viewport::{DisplayBox, ImageMetrics};

    /// Create a test image where each pixel encodes its own position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(x as u8);
                pixels.push(y as u8);
                pixels.push(77);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn pixel(image: &DecodedImage, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * image.width + x) * 3) as usize;
        [image.pixels[idx], image.pixels[idx + 1], image.pixels[idx + 2]]
    }

    fn viewport_for(image: &DecodedImage, display: (u32, u32), output: (u32, u32)) -> Viewport {
        Viewport::initialize(
            ImageMetrics::new(image.width, image.height),
            DisplayBox::new(display.0, display.1),
            OutputSize::new(output.0, output.1),
        )
        .unwrap()
    }

    #[test]
    fn test_export_full_window_downscales() {
        let img = test_image(8, 6);
        let vp = viewport_for(&img, (4, 3), (4, 3));

        let out = export(&vp, &img, OutputSize::new(4, 3), DrawTransform::Identity, FilterType::Nearest).unwrap();
        assert_eq!((out.width, out.height), (4, 3));
        assert_eq!(out.pixels.len(), 4 * 3 * 3);
    }

    #[test]
    fn test_export_exact_crop_at_native_scale() {
        let img = test_image(8, 6);
        let mut vp = viewport_for(&img, (4, 3), (4, 3));
        assert!(vp.zoom(-1.0)); // max scale 1.0
        vp.pan(2.0, 1.0, &compensate(1));

        let out = export(&vp, &img, OutputSize::new(4, 3), DrawTransform::Identity, FilterType::Bilinear).unwrap();
        assert_eq!(pixel(&out, 0, 0), pixel(&img, 2, 1));
        assert_eq!(pixel(&out, 3, 2), pixel(&img, 5, 3));
    }

    #[test]
    fn test_export_applies_draw_transform() {
        // Stored landscape, shown portrait (code 6)
        let img = test_image(4, 3);
        let d = compensate(6);
        let display = DisplayBox::new(3, 4).oriented(&d);
        let output = OutputSize::new(3, 4);
        let vp = Viewport::initialize(img.metrics(), display, output.oriented(&d)).unwrap();

        let out = export(&vp, &img, output, d.draw_transform, FilterType::Nearest).unwrap();
        let upright = DrawTransform::Rotate90CW.apply(&img);

        assert_eq!((out.width, out.height), (3, 4));
        assert_eq!(out.pixels, upright.pixels);
    }

    #[test]
    fn test_export_does_not_mutate_viewport() {
        let img = test_image(8, 6);
        let vp = viewport_for(&img, (4, 3), (4, 3));
        let before = vp.clone();

        export(&vp, &img, OutputSize::new(4, 3), DrawTransform::Identity, FilterType::Bilinear).unwrap();
        assert_eq!(vp, before);
    }

    #[test]
    fn test_export_zero_output() {
        let img = test_image(8, 6);
        let vp = viewport_for(&img, (4, 3), (4, 3));
        let result = export(&vp, &img, OutputSize::new(0, 3), DrawTransform::Identity, FilterType::Bilinear);
        assert!(matches!(result, Err(ExportError::InvalidOutputSize { .. })));
    }

    #[test]
    fn test_export_mismatched_buffer() {
        let img = test_image(8, 6);
        let vp = viewport_for(&img, (4, 3), (4, 3));
        let broken = DecodedImage {
            width: 8,
            height: 6,
            pixels: vec![0u8; 10],
        };
        let result = export(&vp, &broken, OutputSize::new(4, 3), DrawTransform::Identity, FilterType::Bilinear);
        assert!(matches!(result, Err(ExportError::InvalidSource(_))));
    }

    #[test]
    fn test_export_encoded_png() {
        let img = test_image(8, 6);
        let vp = viewport_for(&img, (4, 3), (4, 3));
        let bytes = export_encoded(
            &vp,
            &img,
            OutputSize::new(4, 3),
            DrawTransform::Identity,
            FilterType::Bilinear,
            ExportFormat::Png,
        )
        .unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_export_encoded_jpeg() {
        let img = test_image(8, 6);
        let vp = viewport_for(&img, (4, 3), (4, 3));
        let bytes = export_encoded(
            &vp,
            &img,
            OutputSize::new(4, 3),
            DrawTransform::Identity,
            FilterType::Bilinear,
            ExportFormat::Jpeg { quality: 80 },
        )
        .unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
