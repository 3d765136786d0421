//! The `SuperImageCropper` class exposed to JavaScript.
//!
//! # Example
//!
//! ```typescript
//! import init, { SuperImageCropper } from '@super-image-cropper/wasm';
//!
//! await init();
//! const cropper = new SuperImageCropper();
//!
//! // Bytes are fetched by the page and registered under the widget's URL
//! const bytes = new Uint8Array(await (await fetch(url)).arrayBuffer());
//! cropper.addSource(url, bytes);
//!
//! const blobUrl = cropper.crop({ outputType: 'blobURL' }, cropperJsInstance);
//! ```

use serde::de::DeserializeOwned;
use super_cropper_core::{
    CropBox, CropOptions, CropperOptions, GeometryProvider, ImageDescriptor, MemoryLoader,
    SuperImageCropper,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::output::{core_output_type, to_js_value};

#[wasm_bindgen]
extern "C" {
    /// A Cropper.js instance.
    pub type JsCropper;

    #[wasm_bindgen(method, js_name = getData)]
    fn get_data(this: &JsCropper) -> JsValue;

    #[wasm_bindgen(method, js_name = getImageData)]
    fn get_image_data(this: &JsCropper) -> JsValue;

    #[wasm_bindgen(method, js_name = getCropBoxData)]
    fn get_crop_box_data(this: &JsCropper) -> JsValue;

    #[wasm_bindgen(method, getter)]
    fn url(this: &JsCropper) -> Option<String>;
}

/// Reads live geometry from a Cropper.js instance.
struct CropperAdapter<'a> {
    inner: &'a JsCropper,
}

impl CropperAdapter<'_> {
    fn read<T: DeserializeOwned + Default>(value: JsValue, what: &str) -> T {
        if value.is_undefined() || value.is_null() {
            return T::default();
        }
        serde_wasm_bindgen::from_value(value).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable cropper {}: {}", what, e);
            T::default()
        })
    }
}

impl GeometryProvider for CropperAdapter<'_> {
    fn get_data(&self) -> CropOptions {
        Self::read(self.inner.get_data(), "data")
    }

    fn get_image_data(&self) -> ImageDescriptor {
        Self::read(self.inner.get_image_data(), "image data")
    }

    fn get_crop_box_data(&self) -> CropBox {
        Self::read(self.inner.get_crop_box_data(), "crop box data")
    }

    fn url(&self) -> String {
        self.inner.url().unwrap_or_default()
    }
}

/// Crops still images and animated GIFs in the browser.
///
/// Sources are looked up by their `src` string among the bytes registered
/// with `addSource`; `data:` URIs work without registration.
#[wasm_bindgen(js_name = SuperImageCropper)]
pub struct JsSuperImageCropper {
    inner: SuperImageCropper,
    sources: MemoryLoader,
}

impl Default for JsSuperImageCropper {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = SuperImageCropper)]
impl JsSuperImageCropper {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsSuperImageCropper {
        let sources = MemoryLoader::new();
        JsSuperImageCropper {
            inner: SuperImageCropper::with_loader(sources.clone()),
            sources,
        }
    }

    /// Register image bytes under `src`, replacing any previous bytes.
    #[wasm_bindgen(js_name = addSource)]
    pub fn add_source(&self, src: &str, bytes: Vec<u8>) {
        self.sources.insert(src, bytes);
    }

    /// Forget the bytes registered under `src`.
    #[wasm_bindgen(js_name = removeSource)]
    pub fn remove_source(&self, src: &str) -> bool {
        self.sources.remove(src)
    }

    /// Crop a source.
    ///
    /// # Arguments
    ///
    /// * `options` - `{ src?, crossOrigin?, cropperJsOpts?, gifJsOptions?,
    ///   outputType?, quality? }`
    /// * `cropper` - A Cropper.js instance, or `undefined`
    ///
    /// # Returns
    ///
    /// A data URI string, a `Blob`, or an object URL, per `outputType`.
    ///
    /// # Errors
    ///
    /// Returns an error message if the options are malformed or the crop
    /// fails.
    pub fn crop(&mut self, options: JsValue, cropper: JsValue) -> Result<JsValue, JsValue> {
        let mut options: CropperOptions = if options.is_undefined() || options.is_null() {
            CropperOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsValue::from_str(&format!("Invalid cropper options: {}", e)))?
        };

        let requested = options.output_type;
        options.output_type = core_output_type(requested);

        let adapter = if cropper.is_undefined() || cropper.is_null() {
            None
        } else {
            Some(CropperAdapter {
                inner: cropper.unchecked_ref::<JsCropper>(),
            })
        };

        let output = self
            .inner
            .crop(adapter.as_ref().map(|a| a as &dyn GeometryProvider), options)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        to_js_value(output, requested)
    }
}
