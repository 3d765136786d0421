//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte stream does not start with a GIF87a/GIF89a signature.
    #[error("Invalid GIF signature")]
    InvalidSignature,

    /// The stream ended in the middle of a block.
    #[error("Truncated GIF stream: {0}")]
    Truncated(String),

    /// The stream is structurally invalid (bad block, bad LZW data, ...).
    #[error("Malformed GIF stream: {0}")]
    Malformed(String),

    /// The container holds no image blocks at all.
    #[error("GIF contains no frames")]
    NoFrames,

    /// A still image could not be decoded.
    #[error("Corrupted or unsupported still image: {0}")]
    Image(String),
}

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
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
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

/// How the display buffer is treated after a frame, before the next is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisposalMethod {
    /// No disposal specified; viewers treat this like `Keep`.
    #[default]
    Unspecified,
    /// Leave the frame in place.
    Keep,
    /// Clear the frame's rectangle to the background (transparent).
    Background,
    /// Restore the frame's rectangle to what it was before the frame.
    Previous,
}

impl From<gif::DisposalMethod> for DisposalMethod {
    fn from(value: gif::DisposalMethod) -> Self {
        match value {
            gif::DisposalMethod::Any => DisposalMethod::Unspecified,
            gif::DisposalMethod::Keep => DisposalMethod::Keep,
            gif::DisposalMethod::Background => DisposalMethod::Background,
            gif::DisposalMethod::Previous => DisposalMethod::Previous,
        }
    }
}

/// Largest raster, in pixels, any stage of a crop allocates.
pub const MAX_BUFFER_PIXELS: usize = 1 << 28;

/// An RGBA raster in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl RgbaBuffer {
    /// Create a new RgbaBuffer with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a buffer where every pixel has the given color.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create an RgbaBuffer from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Read the pixel at (x, y). Caller guarantees the coordinates are in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// One fully composited animation frame.
#[derive(Debug, Clone)]
pub struct ParsedFrame {
    /// Full logical-screen RGBA frame, already composited against prior frames.
    pub buffer: RgbaBuffer,
    /// Display time in milliseconds.
    pub delay_ms: u32,
    /// Disposal method declared for this frame in the source stream.
    pub disposal: DisposalMethod,
}

/// Every frame of a decoded GIF, plus the parallel delay list.
#[derive(Debug, Clone, Default)]
pub struct ParsedFrameInfo {
    /// Logical screen width.
    pub width: u32,
    /// Logical screen height.
    pub height: u32,
    /// Frames in stream order.
    pub frames: Vec<ParsedFrame>,
    /// `frames[i].delay_ms`, in the same order.
    pub delays: Vec<u32>,
}

impl ParsedFrameInfo {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frames were decoded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame delays in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.delays.iter().map(|&d| u64::from(d)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_disposal_from_gif_enum() {
        assert_eq!(
            DisposalMethod::from(gif::DisposalMethod::Any),
            DisposalMethod::Unspecified
        );
        assert_eq!(
            DisposalMethod::from(gif::DisposalMethod::Background),
            DisposalMethod::Background
        );
        assert_eq!(
            DisposalMethod::from(gif::DisposalMethod::Previous),
            DisposalMethod::Previous
        );
    }

    #[test]
    fn test_rgba_buffer_filled() {
        let buf = RgbaBuffer::filled(3, 2, [1, 2, 3, 4]);
        assert_eq!(buf.pixels.len(), 3 * 2 * 4);
        assert_eq!(buf.pixel(2, 1), [1, 2, 3, 4]);
        assert!(!buf.is_empty());
    }

    #[test]
    fn test_from_rgba_image() {
        let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        let buf = RgbaBuffer::from_rgba_image(img);
        assert_eq!(buf, RgbaBuffer::filled(4, 3, [10, 20, 30, 255]));
    }

    #[test]
    fn test_empty_buffer() {
        let buf = RgbaBuffer::new(0, 0, vec![]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_total_duration() {
        let info = ParsedFrameInfo {
            delays: vec![100, 50, 70],
            ..Default::default()
        };
        assert_eq!(info.total_duration_ms(), 220);
        assert!(info.is_empty());
    }

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            DecodeError::InvalidSignature.to_string(),
            "Invalid GIF signature"
        );
        assert_eq!(DecodeError::NoFrames.to_string(), "GIF contains no frames");
    }
}
