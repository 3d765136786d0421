//! Conversion of crop results into JavaScript values.
//!
//! In the browser a blob URL must come from `URL.createObjectURL`, so the
//! bindings always ask the core for raw bytes and build the `Blob` (and its
//! URL) on the JavaScript side.

use super_cropper_core::{Blob, CropOutput, OutputType};
use wasm_bindgen::prelude::*;
use web_sys::{BlobPropertyBag, Url};

/// The representation to request from the core for a caller's output type.
pub(crate) fn core_output_type(requested: OutputType) -> OutputType {
    match requested {
        OutputType::Base64 => OutputType::Base64,
        OutputType::Blob | OutputType::BlobUrl => OutputType::Blob,
    }
}

/// Turn a core result into the value the caller asked for.
///
/// # Errors
///
/// Returns the JavaScript exception if the `Blob` or object URL cannot be
/// created.
pub(crate) fn to_js_value(output: CropOutput, requested: OutputType) -> Result<JsValue, JsValue> {
    match output {
        CropOutput::Base64(uri) => Ok(JsValue::from_str(&uri)),
        CropOutput::BlobUrl(url) => Ok(JsValue::from_str(&url)),
        CropOutput::Blob(blob) => {
            let js_blob = to_js_blob(&blob)?;
            if requested == OutputType::BlobUrl {
                Url::create_object_url_with_blob(&js_blob).map(JsValue::from)
            } else {
                Ok(js_blob.into())
            }
        }
    }
}

fn to_js_blob(blob: &Blob) -> Result<web_sys::Blob, JsValue> {
    let bytes = js_sys::Uint8Array::from(blob.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let properties = BlobPropertyBag::new();
    properties.set_type(&blob.mime);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &properties)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn gif_blob() -> Blob {
        Blob::new(b"GIF89a".to_vec(), "image/gif")
    }

    #[wasm_bindgen_test]
    fn test_base64_passes_through() {
        let value = to_js_value(
            CropOutput::Base64("data:image/gif;base64,R0lG".to_string()),
            OutputType::Base64,
        )
        .unwrap();
        assert_eq!(value.as_string().unwrap(), "data:image/gif;base64,R0lG");
    }

    #[wasm_bindgen_test]
    fn test_blob_has_type_and_size() {
        let value = to_js_value(CropOutput::Blob(gif_blob()), OutputType::Blob).unwrap();
        let blob: web_sys::Blob = value.dyn_into().unwrap();
        assert_eq!(blob.type_(), "image/gif");
        assert_eq!(blob.size(), 6.0);
    }

    #[wasm_bindgen_test]
    fn test_blob_url_is_object_url() {
        let value = to_js_value(CropOutput::Blob(gif_blob()), OutputType::BlobUrl).unwrap();
        let url = value.as_string().unwrap();
        assert!(url.starts_with("blob:"));
        Url::revoke_object_url(&url).unwrap();
    }
}
