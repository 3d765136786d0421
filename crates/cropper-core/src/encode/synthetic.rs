//! Animated GIF synthesis from cropped RGBA frames.
//!
//! Each frame is quantized to its own local palette:
//!
//! - Pixels less than half opaque, or matching the configured transparent
//!   key, map to a reserved transparent index
//! - Frames with at most 256 distinct colors get an exact palette
//! - Richer frames go through NeuQuant at the configured sampling factor
//!
//! Frames arrive fully composited, so a frame is disposed to background
//! whenever the frame shown after it has transparent pixels.
//!
//! Quantization runs on a worker pool sized by `workers` when the `parallel`
//! feature is on. Results are collected by frame index, so the container
//! always lists frames in input order.

use std::borrow::Cow;
use std::collections::HashMap;

use color_quant::NeuQuant;
use log::{debug, warn};

use super::{Blob, EncodeError};
use crate::decode::RgbaBuffer;
use crate::options::GifOptions;

/// Delay used for frames the delay list does not cover.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 100;

/// MIME type of the synthesized container.
pub const GIF_MIME: &str = "image/gif";

/// A frame reduced to palette indices.
#[derive(Debug, Clone, PartialEq)]
struct IndexedFrame {
    /// RGB triples.
    palette: Vec<u8>,
    indices: Vec<u8>,
    transparent: Option<u8>,
}

/// Builds a GIF89a stream from cropped frames and their delays.
#[derive(Debug, Clone)]
pub struct SyntheticGif {
    frames: Vec<RgbaBuffer>,
    delays: Vec<u32>,
    options: GifOptions,
}

impl SyntheticGif {
    /// Pair frames with delays in milliseconds.
    ///
    /// Frames beyond the end of `delays` get [`DEFAULT_FRAME_DELAY_MS`].
    pub fn new(frames: Vec<RgbaBuffer>, delays: &[u32], options: GifOptions) -> Self {
        if delays.len() < frames.len() {
            warn!(
                "{} delays for {} frames, defaulting the rest to {} ms",
                delays.len(),
                frames.len(),
                DEFAULT_FRAME_DELAY_MS
            );
        }
        let delays = (0..frames.len())
            .map(|i| delays.get(i).copied().unwrap_or(DEFAULT_FRAME_DELAY_MS))
            .collect();
        Self {
            frames,
            delays,
            options,
        }
    }

    /// Frame delays in milliseconds, one per frame.
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Encode the animation.
    ///
    /// # Errors
    ///
    /// - `EncodeError::NoFrames` for an empty frame list
    /// - `EncodeError::InvalidDimensions` when frames differ in size, exceed
    ///   the GIF limit of 65535, or disagree with `width`/`height` options
    /// - `EncodeError::InvalidPixelData` for a malformed frame buffer
    /// - `EncodeError::EncodingFailed` when the container cannot be written
    pub fn bootstrap(&self) -> Result<Blob, EncodeError> {
        let first = self.frames.first().ok_or(EncodeError::NoFrames)?;
        let (width, height) = (first.width, first.height);
        self.validate(width, height)?;

        let indexed = self.quantize_all()?;

        let mut out = Vec::new();
        {
            // Dimensions are checked against u16::MAX in validate()
            let (w, h) = (width as u16, height as u16);
            let global_palette = indexed.first().map(|f| f.palette.as_slice()).unwrap_or(&[]);
            let mut encoder = gif::Encoder::new(&mut out, w, h, global_palette)
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

            if let Some(repeat) = self.options.repeat_mode() {
                encoder
                    .set_repeat(repeat)
                    .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
            }

            for (i, (frame, delay_ms)) in indexed.iter().zip(&self.delays).enumerate() {
                let dispose = disposal_before(&indexed, i);
                let gif_frame = gif::Frame {
                    width: w,
                    height: h,
                    delay: delay_to_centis(*delay_ms),
                    dispose,
                    transparent: frame.transparent,
                    palette: Some(frame.palette.clone()),
                    buffer: Cow::Borrowed(&frame.indices),
                    ..Default::default()
                };
                encoder
                    .write_frame(&gif_frame)
                    .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

                if self.options.debug {
                    debug!(
                        "Frame {}: {} colors, delay {} ms",
                        i,
                        frame.palette.len() / 3,
                        delay_ms
                    );
                }
            }
        }

        debug!(
            "Encoded {} frames at {}x{} into {} bytes",
            self.frames.len(),
            width,
            height,
            out.len()
        );
        Ok(Blob::new(out, GIF_MIME))
    }

    fn validate(&self, width: u32, height: u32) -> Result<(), EncodeError> {
        let too_large = width > u32::from(u16::MAX) || height > u32::from(u16::MAX);
        if width == 0 || height == 0 || too_large {
            return Err(EncodeError::InvalidDimensions { width, height });
        }
        let expected_w = self.options.width.unwrap_or(width);
        let expected_h = self.options.height.unwrap_or(height);
        if (expected_w, expected_h) != (width, height) {
            return Err(EncodeError::InvalidDimensions {
                width: expected_w,
                height: expected_h,
            });
        }

        for frame in &self.frames {
            if (frame.width, frame.height) != (width, height) {
                return Err(EncodeError::InvalidDimensions {
                    width: frame.width,
                    height: frame.height,
                });
            }
            let expected = width as usize * height as usize * 4;
            if frame.pixels.len() != expected {
                return Err(EncodeError::InvalidPixelData {
                    expected,
                    actual: frame.pixels.len(),
                });
            }
        }
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn quantize_all(&self) -> Result<Vec<IndexedFrame>, EncodeError> {
        use rayon::prelude::*;

        let sample_factor = self.options.sample_factor();
        let key = self.options.transparent_key();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.worker_count())
            .build()
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

        Ok(pool.install(|| {
            self.frames
                .par_iter()
                .map(|frame| quantize(frame, sample_factor, key))
                .collect()
        }))
    }

    #[cfg(not(feature = "parallel"))]
    fn quantize_all(&self) -> Result<Vec<IndexedFrame>, EncodeError> {
        let sample_factor = self.options.sample_factor();
        let key = self.options.transparent_key();
        Ok(self
            .frames
            .iter()
            .map(|frame| quantize(frame, sample_factor, key))
            .collect())
    }
}

/// Disposal for frame `i`, which runs before the next frame is drawn.
///
/// Frames are fully composited, so the display must be cleared whenever the
/// following frame has transparent pixels. The last frame is followed by the
/// first one when the animation loops.
fn disposal_before(frames: &[IndexedFrame], i: usize) -> gif::DisposalMethod {
    let next = &frames[(i + 1) % frames.len()];
    if next.transparent.is_some() {
        gif::DisposalMethod::Background
    } else {
        gif::DisposalMethod::Keep
    }
}

/// Milliseconds to GIF hundredths of a second.
fn delay_to_centis(delay_ms: u32) -> u16 {
    ((f64::from(delay_ms) / 10.0).round() as u32).min(u32::from(u16::MAX)) as u16
}

#[inline]
fn is_transparent(px: &[u8], key: Option<[u8; 3]>) -> bool {
    px[3] < 128 || key.is_some_and(|k| px[..3] == k)
}

fn quantize(frame: &RgbaBuffer, sample_factor: i32, key: Option<[u8; 3]>) -> IndexedFrame {
    let mut has_transparency = false;
    let mut colors: HashMap<[u8; 3], u8> = HashMap::new();
    let mut exact = true;

    for px in frame.pixels.chunks_exact(4) {
        if is_transparent(px, key) {
            has_transparency = true;
            continue;
        }
        if exact && !colors.contains_key(&px[..3]) {
            if colors.len() == 256 {
                exact = false;
            } else {
                let next = colors.len() as u8;
                colors.insert([px[0], px[1], px[2]], next);
            }
        }
    }

    // The transparent slot takes one palette entry
    if exact && colors.len() + usize::from(has_transparency) <= 256 {
        exact_palette(frame, &colors, has_transparency, key)
    } else {
        neuquant_palette(frame, sample_factor, has_transparency, key)
    }
}

fn exact_palette(
    frame: &RgbaBuffer,
    colors: &HashMap<[u8; 3], u8>,
    has_transparency: bool,
    key: Option<[u8; 3]>,
) -> IndexedFrame {
    let mut palette = vec![0u8; colors.len() * 3];
    for (rgb, &idx) in colors {
        let at = idx as usize * 3;
        palette[at..at + 3].copy_from_slice(rgb);
    }

    let transparent = has_transparency.then(|| {
        palette.extend_from_slice(&[0, 0, 0]);
        colors.len() as u8
    });

    let indices = frame
        .pixels
        .chunks_exact(4)
        .map(|px| match transparent {
            Some(t) if is_transparent(px, key) => t,
            _ => colors.get(&px[..3]).copied().unwrap_or(0),
        })
        .collect();

    IndexedFrame {
        palette,
        indices,
        transparent,
    }
}

fn neuquant_palette(
    frame: &RgbaBuffer,
    sample_factor: i32,
    has_transparency: bool,
    key: Option<[u8; 3]>,
) -> IndexedFrame {
    let max_colors = if has_transparency { 255 } else { 256 };

    // Train on opaque pixels only, alpha forced to 255
    let opaque: Vec<u8> = frame
        .pixels
        .chunks_exact(4)
        .filter(|px| !is_transparent(px, key))
        .flat_map(|px| [px[0], px[1], px[2], 255])
        .collect();
    let nq = NeuQuant::new(sample_factor, max_colors, &opaque);

    let mut palette = nq.color_map_rgb();
    palette.resize(max_colors * 3, 0);

    let transparent = has_transparency.then(|| {
        palette.extend_from_slice(&[0, 0, 0]);
        max_colors as u8
    });

    let indices = frame
        .pixels
        .chunks_exact(4)
        .map(|px| match transparent {
            Some(t) if is_transparent(px, key) => t,
            _ => nq.index_of(&[px[0], px[1], px[2], 255]) as u8,
        })
        .collect();

    IndexedFrame {
        palette,
        indices,
        transparent,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
