//! Still-image decoding with EXIF orientation handling.
//!
//! Browsers draw a JPEG upright according to its EXIF orientation, so the
//! natural dimensions a cropping UI reports are the oriented ones. The static
//! path decodes to RGBA and applies the same orientation before any crop
//! geometry is applied.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Orientation, RgbaBuffer};

/// Decode a still image from bytes, applying EXIF orientation correction.
///
/// # Arguments
///
/// * `bytes` - Raw encoded image bytes (JPEG, PNG, WebP, BMP)
///
/// # Returns
///
/// An `RgbaBuffer` with the correct orientation applied.
///
/// # Errors
///
/// Returns `DecodeError::Image` if the format is not recognized or the data
/// is corrupted.
pub fn decode_still(bytes: &[u8]) -> Result<RgbaBuffer, DecodeError> {
    let orientation = get_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Image(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::Image(e.to_string()))?;

    let oriented = apply_orientation(img, orientation);
    Ok(RgbaBuffer::from_rgba_image(oriented.into_rgba8()))
}

/// Extract the EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
