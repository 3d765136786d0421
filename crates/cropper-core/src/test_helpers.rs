//! Shared fixtures for unit tests: synthetic GIF and still-image byte streams.
//!
//! Everything is generated in memory so tests never depend on files on disk.

use std::borrow::Cow;
use std::io::Cursor;

use crate::decode::RgbaBuffer;

/// Palette index for pure red.
pub const RED: u8 = 1;
/// Palette index for pure green.
pub const GREEN: u8 = 2;
/// Palette index for pure blue.
pub const BLUE: u8 = 3;
/// Palette index for pure white.
pub const WHITE: u8 = 4;
/// Palette slot reserved for the transparent color.
pub const TRANSPARENT_INDEX: u8 = 5;

/// Global palette used by [`build_gif`].
pub const PALETTE: [u8; 24] = [
    0, 0, 0, // black
    255, 0, 0, // red
    0, 255, 0, // green
    0, 0, 255, // blue
    255, 255, 255, // white
    255, 0, 255, // transparent slot
    128, 128, 128, // gray
    255, 255, 0, // yellow
];

/// One indexed image block to write into a test GIF.
#[derive(Debug, Clone)]
pub struct GifFrameSpec {
    pub width: u16,
    pub height: u16,
    pub left: u16,
    pub top: u16,
    pub indices: Vec<u8>,
    /// Hundredths of a second.
    pub delay: u16,
    pub dispose: gif::DisposalMethod,
    pub transparent: Option<u8>,
}

/// A frame filled with one palette color.
pub fn solid_frame(width: u16, height: u16, color: u8, delay: u16) -> GifFrameSpec {
    GifFrameSpec {
        width,
        height,
        left: 0,
        top: 0,
        indices: vec![color; width as usize * height as usize],
        delay,
        dispose: gif::DisposalMethod::Keep,
        transparent: None,
    }
}

/// A full-screen frame whose left half is `left` and right half is `right`.
pub fn split_frame(width: u16, height: u16, left: u8, right: u8, delay: u16) -> GifFrameSpec {
    let mut indices = Vec::with_capacity(width as usize * height as usize);
    for _ in 0..height {
        for x in 0..width {
            indices.push(if x < width / 2 { left } else { right });
        }
    }
    GifFrameSpec {
        indices,
        ..solid_frame(width, height, left, delay)
    }
}

/// Encode frames into a GIF89a byte stream with the shared palette.
pub fn build_gif(width: u16, height: u16, frames: &[GifFrameSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &PALETTE).unwrap();
        encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        for spec in frames {
            let frame = gif::Frame {
                left: spec.left,
                top: spec.top,
                width: spec.width,
                height: spec.height,
                delay: spec.delay,
                dispose: spec.dispose,
                transparent: spec.transparent,
                buffer: Cow::Borrowed(&spec.indices),
                ..Default::default()
            };
            encoder.write_frame(&frame).unwrap();
        }
    }
    out
}

/// A buffer where each pixel's red/green channels encode its position.
pub fn gradient_buffer(width: u32, height: u32) -> RgbaBuffer {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x % 256) as u8);
            pixels.push((y % 256) as u8);
            pixels.push(((x + y) % 256) as u8);
            pixels.push(255);
        }
    }
    RgbaBuffer::new(width, height, pixels)
}

/// View a buffer as an `image` crate raster.
pub fn rgba_image(buffer: &RgbaBuffer) -> image::RgbaImage {
    image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.pixels.clone()).unwrap()
}

/// Encode a buffer as PNG bytes.
pub fn png_bytes(buffer: &RgbaBuffer) -> Vec<u8> {
    let img = rgba_image(buffer);
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
    cursor.into_inner()
}

/// Encode a buffer as JPEG bytes (alpha dropped).
pub fn jpeg_bytes(buffer: &RgbaBuffer) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(rgba_image(buffer)).into_rgb8();
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageFormat::Jpeg).unwrap();
    cursor.into_inner()
}
