//! Image decoding for the crop pipeline.
//!
//! This module provides functionality for:
//! - Decoding animated GIFs into fully composited, timed RGBA frames
//! - Decoding still images (JPEG, PNG, WebP, BMP) with EXIF orientation applied
//!
//! # Architecture
//!
//! Both paths produce [`RgbaBuffer`]s so the cropper never needs to know which
//! container a pixel came from. All operations are synchronous.
//!
//! # Examples
//!
//! ```ignore
//! use super_cropper_core::decode::decompress_frames;
//!
//! let bytes = std::fs::read("spinner.gif").unwrap();
//! let info = decompress_frames(&bytes).unwrap();
//! println!("{} frames, {} ms", info.len(), info.total_duration_ms());
//! ```

mod animated;
mod still;
mod types;

pub use animated::{decompress_frames, is_gif};
pub use still::{decode_still, get_orientation};
pub use types::{
    DecodeError, DisposalMethod, Orientation, ParsedFrame, ParsedFrameInfo, RgbaBuffer,
    MAX_BUFFER_PIXELS,
};
