//! Animated GIF decoding into fully composited RGBA frames.
//!
//! The `gif` crate handles the container (header, color tables, extensions)
//! and LZW decompression and hands back each image block as an RGBA patch
//! positioned somewhere on the logical screen. This module owns the part the
//! container leaves to the viewer: painting each patch onto a running canvas
//! and applying the previous frame's disposal method, so every emitted frame
//! is a standalone full-screen image.
//!
//! # Compositing rules
//!
//! - The canvas starts fully transparent; the stream's background color index
//!   is ignored, as browsers do.
//! - Pixels with alpha 0 (the frame's transparent index) leave the canvas
//!   pixel underneath untouched.
//! - After a frame is emitted its disposal method runs on the frame rectangle:
//!   `Keep`/`Unspecified` leave it, `Background` clears it to transparent,
//!   `Previous` restores what was there before the frame was drawn.

use std::io;

use log::debug;

use super::{
    DecodeError, DisposalMethod, ParsedFrame, ParsedFrameInfo, RgbaBuffer, MAX_BUFFER_PIXELS,
};

const GIF87A: &[u8] = b"GIF87a";
const GIF89A: &[u8] = b"GIF89a";

/// Check whether bytes start with a GIF signature.
pub fn is_gif(bytes: &[u8]) -> bool {
    bytes.len() >= 6 && (&bytes[..6] == GIF87A || &bytes[..6] == GIF89A)
}

/// Decode every image block of a GIF into composited RGBA frames.
///
/// # Returns
///
/// A `ParsedFrameInfo` with one frame per image block, in stream order. Each
/// frame buffer covers the whole logical screen. Delays are converted from
/// the stream's hundredths of a second to milliseconds.
///
/// # Errors
///
/// - `DecodeError::InvalidSignature` if the bytes are not a GIF
/// - `DecodeError::Truncated` if the stream ends mid-block
/// - `DecodeError::Malformed` for any other structural problem, or a logical
///   screen above `MAX_BUFFER_PIXELS`
/// - `DecodeError::NoFrames` if the container holds no image blocks
pub fn decompress_frames(bytes: &[u8]) -> Result<ParsedFrameInfo, DecodeError> {
    if !is_gif(bytes) {
        return Err(DecodeError::InvalidSignature);
    }

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(bytes).map_err(map_gif_error)?;

    let width = u32::from(decoder.width());
    let height = u32::from(decoder.height());
    if u64::from(width) * u64::from(height) > MAX_BUFFER_PIXELS as u64 {
        return Err(DecodeError::Malformed(format!(
            "Logical screen {}x{} is too large",
            width, height
        )));
    }
    let mut compositor = Compositor::new(width, height);
    let mut frames = Vec::new();
    let mut delays = Vec::new();

    while let Some(frame) = decoder.read_next_frame().map_err(map_gif_error)? {
        let patch = Patch {
            left: u32::from(frame.left),
            top: u32::from(frame.top),
            width: u32::from(frame.width),
            height: u32::from(frame.height),
            pixels: &frame.buffer,
        };
        let disposal = DisposalMethod::from(frame.dispose);
        let buffer = compositor.draw(&patch, disposal);
        let delay_ms = u32::from(frame.delay) * 10;

        delays.push(delay_ms);
        frames.push(ParsedFrame {
            buffer,
            delay_ms,
            disposal,
        });
    }

    if frames.is_empty() {
        return Err(DecodeError::NoFrames);
    }

    debug!(
        "Decoded GIF {}x{} with {} frames",
        width,
        height,
        frames.len()
    );

    Ok(ParsedFrameInfo {
        width,
        height,
        frames,
        delays,
    })
}

fn map_gif_error(err: gif::DecodingError) -> DecodeError {
    match err {
        gif::DecodingError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            DecodeError::Truncated(e.to_string())
        }
        gif::DecodingError::Io(e) => DecodeError::Malformed(e.to_string()),
        other => DecodeError::Malformed(other.to_string()),
    }
}

/// A decoded image block positioned on the logical screen.
struct Patch<'a> {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    /// RGBA, `width * height * 4` bytes.
    pixels: &'a [u8],
}

/// Screen rectangle clipped to the canvas.
#[derive(Debug, Clone, Copy)]
struct Rect {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

/// Disposal to run before the next frame is drawn.
struct PendingDisposal {
    method: DisposalMethod,
    rect: Rect,
    saved: Option<Vec<u8>>,
}

/// Running display buffer for one animation.
struct Compositor {
    canvas: RgbaBuffer,
    pending: Option<PendingDisposal>,
}

impl Compositor {
    fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaBuffer::filled(width, height, [0, 0, 0, 0]),
            pending: None,
        }
    }

    /// Paint a patch and return a snapshot of the whole canvas.
    fn draw(&mut self, patch: &Patch<'_>, disposal: DisposalMethod) -> RgbaBuffer {
        if let Some(pending) = self.pending.take() {
            self.dispose(pending);
        }

        let rect = self.clip(patch);
        let saved = match disposal {
            DisposalMethod::Previous => Some(self.save(rect)),
            _ => None,
        };

        let canvas_w = self.canvas.width as usize;
        let patch_w = patch.width as usize;
        for y in 0..rect.height as usize {
            let src_row = (y + (rect.top - patch.top) as usize) * patch_w;
            let dst_row = (y + rect.top as usize) * canvas_w;
            for x in 0..rect.width as usize {
                let src = (src_row + x + (rect.left - patch.left) as usize) * 4;
                let dst = (dst_row + x + rect.left as usize) * 4;
                let Some(px) = patch.pixels.get(src..src + 4) else {
                    continue;
                };
                if px[3] != 0 {
                    self.canvas.pixels[dst..dst + 4].copy_from_slice(px);
                }
            }
        }

        self.pending = Some(PendingDisposal {
            method: disposal,
            rect,
            saved,
        });

        self.canvas.clone()
    }

    /// Intersection of the patch rectangle with the canvas.
    fn clip(&self, patch: &Patch<'_>) -> Rect {
        let left = patch.left.min(self.canvas.width);
        let top = patch.top.min(self.canvas.height);
        let right = patch.left.saturating_add(patch.width).min(self.canvas.width);
        let bottom = patch.top.saturating_add(patch.height).min(self.canvas.height);
        Rect {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    fn save(&self, rect: Rect) -> Vec<u8> {
        let mut saved = Vec::with_capacity(rect.width as usize * rect.height as usize * 4);
        for y in rect.top..rect.top + rect.height {
            let start = (y as usize * self.canvas.width as usize + rect.left as usize) * 4;
            saved.extend_from_slice(&self.canvas.pixels[start..start + rect.width as usize * 4]);
        }
        saved
    }

    fn dispose(&mut self, pending: PendingDisposal) {
        let rect = pending.rect;
        let row_len = rect.width as usize * 4;
        match pending.method {
            DisposalMethod::Unspecified | DisposalMethod::Keep => {}
            DisposalMethod::Background => {
                for y in rect.top..rect.top + rect.height {
                    let start = (y as usize * self.canvas.width as usize + rect.left as usize) * 4;
                    self.canvas.pixels[start..start + row_len].fill(0);
                }
            }
            DisposalMethod::Previous => {
                let Some(saved) = pending.saved else {
                    return;
                };
                for (i, y) in (rect.top..rect.top + rect.height).enumerate() {
                    let start = (y as usize * self.canvas.width as usize + rect.left as usize) * 4;
                    self.canvas.pixels[start..start + row_len]
                        .copy_from_slice(&saved[i * row_len..(i + 1) * row_len]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        build_gif, solid_frame, BLUE, GREEN, RED, TRANSPARENT_INDEX,
    };

    #[test]
    fn test_is_gif() {
        assert!(is_gif(b"GIF89a......"));
        assert!(is_gif(b"GIF87a......"));
        assert!(!is_gif(b"GIF8"));
        assert!(!is_gif(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]));
    }

    #[test]
    fn test_rejects_non_gif() {
        let result = decompress_frames(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]);
        assert!(matches!(result, Err(DecodeError::InvalidSignature)));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            decompress_frames(&[]),
            Err(DecodeError::InvalidSignature)
        ));
    }

    #[test]
    fn test_frame_count_and_buffer_size() {
        let bytes = build_gif(
            20,
            10,
            &[
                solid_frame(20, 10, RED, 10),
                solid_frame(20, 10, GREEN, 20),
                solid_frame(20, 10, BLUE, 30),
            ],
        );
        let info = decompress_frames(&bytes).unwrap();

        assert_eq!(info.len(), 3);
        assert_eq!((info.width, info.height), (20, 10));
        for frame in &info.frames {
            assert_eq!(frame.buffer.pixels.len(), 20 * 10 * 4);
        }
    }

    #[test]
    fn test_delays_converted_to_milliseconds() {
        let bytes = build_gif(
            4,
            4,
            &[solid_frame(4, 4, RED, 10), solid_frame(4, 4, GREEN, 7)],
        );
        let info = decompress_frames(&bytes).unwrap();

        assert_eq!(info.delays, vec![100, 70]);
        assert_eq!(info.frames[1].delay_ms, 70);
        assert_eq!(info.total_duration_ms(), 170);
    }

    #[test]
    fn test_partial_frame_composited_over_previous() {
        // Full red frame, then a 2x2 green patch at (1, 1) with Keep disposal.
        let mut patch = solid_frame(2, 2, GREEN, 10);
        patch.left = 1;
        patch.top = 1;
        let bytes = build_gif(4, 4, &[solid_frame(4, 4, RED, 10), patch]);
        let info = decompress_frames(&bytes).unwrap();

        let second = &info.frames[1].buffer;
        assert_eq!(second.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(second.pixel(1, 1), [0, 255, 0, 255]);
        assert_eq!(second.pixel(2, 2), [0, 255, 0, 255]);
        assert_eq!(second.pixel(3, 3), [255, 0, 0, 255]);
    }

    #[test]
    fn test_transparent_pixels_show_previous_frame() {
        let mut second = solid_frame(4, 4, GREEN, 10);
        second.indices[0] = TRANSPARENT_INDEX;
        second.transparent = Some(TRANSPARENT_INDEX);
        let bytes = build_gif(4, 4, &[solid_frame(4, 4, RED, 10), second]);
        let info = decompress_frames(&bytes).unwrap();

        let frame = &info.frames[1].buffer;
        assert_eq!(frame.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(1, 0), [0, 255, 0, 255]);
    }

    #[test]
    fn test_background_disposal_clears_rect() {
        let mut first = solid_frame(2, 2, RED, 10);
        first.dispose = gif::DisposalMethod::Background;
        let mut second = solid_frame(1, 1, GREEN, 10);
        second.left = 3;
        second.top = 3;
        let bytes = build_gif(4, 4, &[first, second]);
        let info = decompress_frames(&bytes).unwrap();

        assert_eq!(info.frames[0].buffer.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(info.frames[0].disposal, DisposalMethod::Background);
        let frame = &info.frames[1].buffer;
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(3, 3), [0, 255, 0, 255]);
    }

    #[test]
    fn test_previous_disposal_restores_canvas() {
        let base = solid_frame(4, 4, RED, 10);
        let mut overlay = solid_frame(2, 2, GREEN, 10);
        overlay.dispose = gif::DisposalMethod::Previous;
        let mut corner = solid_frame(1, 1, BLUE, 10);
        corner.left = 3;
        corner.top = 3;
        let bytes = build_gif(4, 4, &[base, overlay, corner]);
        let info = decompress_frames(&bytes).unwrap();

        assert_eq!(info.frames[1].buffer.pixel(0, 0), [0, 255, 0, 255]);
        let third = &info.frames[2].buffer;
        assert_eq!(third.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(third.pixel(3, 3), [0, 0, 255, 255]);
    }

    #[test]
    fn test_frames_are_independent_snapshots() {
        let bytes = build_gif(
            3,
            3,
            &[solid_frame(3, 3, RED, 10), solid_frame(3, 3, GREEN, 10)],
        );
        let info = decompress_frames(&bytes).unwrap();
        assert_eq!(info.frames[0].buffer.pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(info.frames[1].buffer.pixel(1, 1), [0, 255, 0, 255]);
    }

    #[test]
    fn test_truncated_stream_fails() {
        let bytes = build_gif(
            16,
            16,
            &[solid_frame(16, 16, RED, 10), solid_frame(16, 16, GREEN, 10)],
        );
        let truncated = &bytes[..bytes.len() / 2];
        let result = decompress_frames(truncated);
        assert!(
            matches!(
                result,
                Err(DecodeError::Truncated(_)) | Err(DecodeError::Malformed(_))
            ),
            "got {:?}",
            result
        );
    }

    #[test]
    fn test_oversized_screen_rejected() {
        let bytes = build_gif(u16::MAX, u16::MAX, &[solid_frame(1, 1, RED, 10)]);
        let result = decompress_frames(&bytes);
        assert!(matches!(result, Err(DecodeError::Malformed(_))), "got {:?}", result);
    }

    #[test]
    fn test_header_only_is_truncated() {
        let bytes = build_gif(4, 4, &[solid_frame(4, 4, RED, 10)]);
        let result = decompress_frames(&bytes[..8]);
        assert!(result.is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
