//! Source loading and type sniffing.
//!
//! A crop source is named by a string: a filesystem path, a `file://` URL,
//! or a `data:` URI. Fetching is behind the [`SourceLoader`] trait so hosts
//! can plug in their own transport. The MIME type always comes from the
//! bytes, never from the name.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use thiserror::Error;

/// Errors that can occur while loading a source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No source exists under this name
    #[error("Source not found: {0}")]
    NotFound(String),

    /// The source exists but could not be read
    #[error("Failed to read {src}: {message}")]
    Io { src: String, message: String },

    /// Network sources need a host-provided loader
    #[error("Remote sources are not supported by this loader: {0}")]
    RemoteUnsupported(String),

    /// A `data:` URI that is not `data:<mime>;base64,<payload>`
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// The bytes do not look like any supported image format
    #[error("Unknown image format")]
    UnknownFormat,
}

/// What to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRequest {
    pub src: String,
    /// CORS mode, for loaders that fetch over the network.
    pub cross_origin: Option<String>,
}

impl SourceRequest {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            cross_origin: None,
        }
    }
}

/// Fetches the raw bytes of a source.
pub trait SourceLoader: Send {
    /// Load the bytes named by `request`.
    fn load(&self, request: &SourceRequest) -> Result<Vec<u8>, LoadError>;
}

/// Loads from the local filesystem. Also accepts `data:` URIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, request: &SourceRequest) -> Result<Vec<u8>, LoadError> {
        let src = request.src.as_str();
        if is_data_uri(src) {
            return decode_data_uri(src).map(|(_, bytes)| bytes);
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            return Err(LoadError::RemoteUnsupported(src.to_string()));
        }

        let path = PathBuf::from(src.strip_prefix("file://").unwrap_or(src));
        std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound(src.to_string()),
            _ => LoadError::Io {
                src: src.to_string(),
                message: e.to_string(),
            },
        })
    }
}

/// Serves sources from memory, keyed by src string. Also accepts `data:` URIs.
///
/// Clones share the same storage, so a host can keep a handle and insert
/// bytes after the loader has been handed to a cropper.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: Arc<Mutex<HashMap<String, Arc<Vec<u8>>>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `src`, replacing any previous entry.
    pub fn insert(&self, src: impl Into<String>, bytes: Vec<u8>) {
        self.lock().insert(src.into(), Arc::new(bytes));
    }

    /// Forget `src`. Returns whether it was registered.
    pub fn remove(&self, src: &str) -> bool {
        self.lock().remove(src).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Vec<u8>>>> {
        self.sources.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, request: &SourceRequest) -> Result<Vec<u8>, LoadError> {
        if let Some(bytes) = self.lock().get(&request.src) {
            return Ok(bytes.as_ref().clone());
        }
        if is_data_uri(&request.src) {
            return decode_data_uri(&request.src).map(|(_, bytes)| bytes);
        }
        Err(LoadError::NotFound(request.src.clone()))
    }
}

/// True for strings that start with the `data:` scheme.
pub fn is_data_uri(src: &str) -> bool {
    src.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:"))
}

/// Split a base64 `data:` URI into its declared MIME type and payload.
///
/// # Errors
///
/// Returns `LoadError::InvalidDataUri` when the URI is not base64-encoded
/// or its payload does not decode.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), LoadError> {
    let invalid = || LoadError::InvalidDataUri(truncate_for_message(uri));

    if !is_data_uri(uri) {
        return Err(invalid());
    }
    let (header, payload) = uri[5..].split_once(',').ok_or_else(invalid)?;
    let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|_| invalid())?;
    debug!("Decoded data URI ({}, {} bytes)", mime, bytes.len());
    Ok((mime.to_string(), bytes))
}

fn truncate_for_message(uri: &str) -> String {
    uri.chars().take(48).collect()
}

/// Sniff the MIME type of image bytes from their magic numbers.
///
/// # Errors
///
/// Returns `LoadError::UnknownFormat` when the bytes match no known format.
pub fn sniff_mime(bytes: &[u8]) -> Result<&'static str, LoadError> {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .map_err(|_| LoadError::UnknownFormat)
}
