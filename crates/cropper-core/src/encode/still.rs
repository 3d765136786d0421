//! Still-image encoding for the static crop path.
//!
//! Mirrors what a canvas export does with a MIME hint: JPEG at the requested
//! quality, PNG and WebP losslessly, and PNG for anything else. JPEG has no
//! alpha channel, so transparent pixels are flattened onto black first.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{Blob, EncodeError};
use crate::decode::RgbaBuffer;

/// Output formats the static path can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillFormat {
    Jpeg,
    Png,
    WebP,
}

impl StillFormat {
    /// Pick the output format for a source MIME type. Unknown types get PNG.
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "image/jpeg" | "image/jpg" => StillFormat::Jpeg,
            "image/webp" => StillFormat::WebP,
            _ => StillFormat::Png,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            StillFormat::Jpeg => "image/jpeg",
            StillFormat::Png => "image/png",
            StillFormat::WebP => "image/webp",
        }
    }
}

/// Encode an RGBA buffer in the format matching `mime`.
///
/// # Arguments
///
/// * `buffer` - Cropped RGBA pixels
/// * `mime` - MIME type of the source image
/// * `quality` - JPEG quality (0-100, clamped to at least 1); ignored for
///   lossless formats
///
/// # Returns
///
/// The encoded bytes tagged with the MIME type actually produced.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for an empty buffer,
/// `EncodeError::InvalidPixelData` when the pixel length is wrong, and
/// `EncodeError::EncodingFailed` when the codec rejects the image.
pub fn encode_still(buffer: &RgbaBuffer, mime: &str, quality: u8) -> Result<Blob, EncodeError> {
    let (width, height) = (buffer.width, buffer.height);

    // Validate dimensions
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    // Validate pixel data length
    let expected = width as usize * height as usize * 4;
    if buffer.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: buffer.pixels.len(),
        });
    }

    let format = StillFormat::from_mime(mime);
    let mut out = Cursor::new(Vec::new());
    let result = match format {
        StillFormat::Jpeg => {
            let rgb = flatten_onto_black(&buffer.pixels);
            JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        StillFormat::Png => PngEncoder::new(&mut out).write_image(
            &buffer.pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        StillFormat::WebP => WebPEncoder::new_lossless(&mut out).write_image(
            &buffer.pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(Blob::new(out.into_inner(), format.mime()))
}

fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let a = u16::from(px[3]);
            let scale = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
            [scale(px[0]), scale(px[1]), scale(px[2])]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_still;
    use crate::test_helpers::gradient_buffer;

    #[test]
    fn test_encode_jpeg_basic() {
        let blob = encode_still(&gradient_buffer(40, 30), "image/jpeg", 90).unwrap();
        assert_eq!(blob.mime, "image/jpeg");

        // Check JPEG magic bytes (SOI marker) and EOI marker
        assert_eq!(&blob.bytes[0..2], &[0xFF, 0xD8]);
        let len = blob.len();
        assert_eq!(&blob.bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_zero_is_accepted() {
        let result = encode_still(&gradient_buffer(10, 10), "image/jpeg", 0);
        assert!(result.is_ok());
    }

    #[test]
    fn test_encode_png_round_trips() {
        let source = gradient_buffer(9, 5);
        let blob = encode_still(&source, "image/png", 100).unwrap();
        assert_eq!(blob.mime, "image/png");
        assert_eq!(decode_still(&blob.bytes).unwrap(), source);
    }

    #[test]
    fn test_encode_webp_is_lossless() {
        let source = gradient_buffer(8, 8);
        let blob = encode_still(&source, "image/webp", 10).unwrap();
        assert_eq!(blob.mime, "image/webp");
        assert_eq!(&blob.bytes[0..4], b"RIFF");
        assert_eq!(decode_still(&blob.bytes).unwrap(), source);
    }

    #[test]
    fn test_unknown_mime_falls_back_to_png() {
        let blob = encode_still(&gradient_buffer(4, 4), "image/bmp", 100).unwrap();
        assert_eq!(blob.mime, "image/png");
        assert_eq!(&blob.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_invalid_pixel_data() {
        let buffer = RgbaBuffer {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        let result = encode_still(&buffer, "image/png", 100);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidPixelData {
                expected: 64,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_zero_dimensions() {
        let buffer = RgbaBuffer {
            width: 0,
            height: 4,
            pixels: Vec::new(),
        };
        assert!(matches!(
            encode_still(&buffer, "image/jpeg", 90),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_flatten_onto_black() {
        let rgb = flatten_onto_black(&[200, 100, 50, 255, 200, 100, 50, 0, 255, 255, 255, 128]);
        assert_eq!(rgb, vec![200, 100, 50, 0, 0, 0, 128, 128, 128]);
    }
}
