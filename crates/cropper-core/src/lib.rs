//! Super Image Cropper Core - crop still images and animated GIFs
//!
//! This crate crops a window out of a still image or out of every frame of
//! an animated GIF, applying the rotate/scale/position geometry of an
//! interactive cropping widget, and re-encodes the result.
//!
//! The pipeline is:
//! 1. [`load`] the source bytes and sniff their type
//! 2. [`decode`] into RGBA frames (GIFs fully composited, stills upright)
//! 3. [`cropper`] every frame with one shared [`geometry`]
//! 4. [`encode`] to a GIF or the source's still format, delivered as a data
//!    URI, blob, or blob URL
//!
//! [`SuperImageCropper`] drives the whole pipeline.

pub mod cropper;
pub mod decode;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod load;
pub mod options;
pub mod orchestrator;
pub mod transform;

#[cfg(test)]
mod test_helpers;

pub use cropper::FrameCropper;
pub use encode::{Blob, BlobRegistry, CropOutput};
pub use error::{ConfigError, CropError};
pub use geometry::{CropBox, CropGeometry, CropOptions, GeometryProvider, ImageDescriptor};
pub use load::{FsLoader, MemoryLoader, SourceLoader, SourceRequest};
pub use options::{CropperOptions, GifOptions, OutputType};
pub use orchestrator::SuperImageCropper;
