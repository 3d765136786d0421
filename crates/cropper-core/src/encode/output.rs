//! Delivery of an encoded result as a data URI, a blob, or a blob URL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::Blob;
use crate::options::OutputType;

/// Scheme and authority of URLs issued by [`BlobRegistry`].
pub const BLOB_URL_PREFIX: &str = "blob:super-image-cropper/";

/// The final result of a crop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropOutput {
    /// `data:<mime>;base64,<payload>`
    Base64(String),
    Blob(Blob),
    /// A URL registered in the cropper's [`BlobRegistry`].
    BlobUrl(String),
}

impl CropOutput {
    /// Wrap `blob` in the representation `output_type` asks for.
    pub fn from_blob(blob: Blob, output_type: OutputType, registry: &BlobRegistry) -> Self {
        match output_type {
            OutputType::Base64 => CropOutput::Base64(to_data_uri(&blob)),
            OutputType::Blob => CropOutput::Blob(blob),
            OutputType::BlobUrl => CropOutput::BlobUrl(registry.register(blob)),
        }
    }

    pub fn as_data_uri(&self) -> Option<&str> {
        match self {
            CropOutput::Base64(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            CropOutput::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_blob_url(&self) -> Option<&str> {
        match self {
            CropOutput::BlobUrl(url) => Some(url),
            _ => None,
        }
    }
}

/// Encode a blob as a base64 data URI.
pub fn to_data_uri(blob: &Blob) -> String {
    format!("data:{};base64,{}", blob.mime, STANDARD.encode(&blob.bytes))
}

/// Holds blobs behind opaque URLs until they are revoked.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    blobs: Arc<Mutex<HashMap<String, Blob>>>,
    next_id: Arc<AtomicU64>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `blob` and return a fresh URL for it.
    pub fn register(&self, blob: Blob) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("{}{}", BLOB_URL_PREFIX, id);
        self.lock().insert(url.clone(), blob);
        url
    }

    /// Look up the blob behind `url`.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.lock().get(url).cloned()
    }

    /// Drop the blob behind `url`. Returns whether it was registered.
    pub fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    /// Number of live URLs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Blob>> {
        // A poisoned map is still consistent: every operation is a single call
        self.blobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
