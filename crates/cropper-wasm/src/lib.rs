//! Super Image Cropper WASM - WebAssembly bindings for the cropper
//!
//! This crate exposes super-cropper-core to JavaScript/TypeScript, taking
//! crop geometry straight from a Cropper.js instance.
//!
//! # Module Structure
//!
//! - `cropper` - The `SuperImageCropper` class and the Cropper.js adapter
//! - `output` - Conversion of results into strings, `Blob`s and object URLs
//! - `logger` - Console logging for the core's `log` output
//!
//! # Usage
//!
//! ```typescript
//! import init, { SuperImageCropper } from '@super-image-cropper/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const cropper = new SuperImageCropper();
//! const dataUri = cropper.crop({
//!   src: 'data:image/gif;base64,...',
//!   cropperJsOpts: { x: 10, y: 10, width: 50, height: 50 },
//!   outputType: 'base64',
//! });
//! ```

use log::LevelFilter;
use wasm_bindgen::prelude::*;

mod cropper;
mod logger;
mod output;

// Re-export public types
pub use cropper::{JsCropper, JsSuperImageCropper};
pub use logger::set_log_level;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(LevelFilter::Info);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
