//! Top-level error type for a crop operation.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::load::LoadError;

/// The request does not carry enough information to crop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No cropping widget and no explicit crop geometry
    #[error("If no cropper instance is given, crop options must be specified")]
    MissingCropOptions,

    /// No cropping widget and no source
    #[error("If no cropper instance is given, src must be specified")]
    MissingSource,
}

/// Any failure of [`SuperImageCropper::crop`](crate::SuperImageCropper::crop).
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to load source: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to decode source: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] EncodeError),
}
