//! Encoding of crop results.
//!
//! This module provides functionality for:
//! - Synthesizing an animated GIF from cropped frames and their delays
//! - Re-encoding a cropped still image in its source format
//! - Wrapping encoded bytes as a data URI, blob, or blob URL
//!
//! # Examples
//!
//! ```ignore
//! use super_cropper_core::encode::SyntheticGif;
//! use super_cropper_core::options::GifOptions;
//!
//! let blob = SyntheticGif::new(frames, &delays, GifOptions::default()).bootstrap()?;
//! println!("Encoded {} bytes", blob.len());
//! ```

mod output;
mod still;
mod synthetic;
mod types;

pub use output::{to_data_uri, BlobRegistry, CropOutput, BLOB_URL_PREFIX};
pub use still::{encode_still, StillFormat};
pub use synthetic::{SyntheticGif, DEFAULT_FRAME_DELAY_MS, GIF_MIME};
pub use types::{Blob, EncodeError};
