//! The crop pipeline: validate, normalize, load, decode, crop, encode.
//!
//! [`SuperImageCropper::crop`] branches on the sniffed source type. GIF
//! sources take the animated path (every frame decoded, cropped with one
//! shared geometry and re-encoded with the original delays). Everything else
//! takes the static path (decoded once, cropped, and re-encoded in its own
//! format).

use log::{debug, info};

use crate::cropper::FrameCropper;
use crate::decode::{decode_still, decompress_frames, ParsedFrameInfo, RgbaBuffer};
use crate::encode::{encode_still, BlobRegistry, CropOutput, SyntheticGif, GIF_MIME};
use crate::error::{ConfigError, CropError};
use crate::geometry::{normalize, CropGeometry, GeometryProvider, ImageDescriptor};
use crate::load::{sniff_mime, FsLoader, SourceLoader, SourceRequest};
use crate::options::{CropperOptions, GifOptions, OutputType};

/// A decoded source, before cropping.
enum Source {
    Animated(ParsedFrameInfo),
    Still { image: RgbaBuffer, mime: &'static str },
}

impl Source {
    fn natural_size(&self) -> (u32, u32) {
        match self {
            Source::Animated(info) => (info.width, info.height),
            Source::Still { image, .. } => (image.width, image.height),
        }
    }
}

/// Crops still images and animated GIFs.
///
/// One instance runs one crop at a time; `crop` takes `&mut self`. The frame
/// cropper is created on first use and re-bound on every call.
pub struct SuperImageCropper {
    loader: Box<dyn SourceLoader>,
    frame_cropper: Option<FrameCropper>,
    blobs: BlobRegistry,
}

impl Default for SuperImageCropper {
    fn default() -> Self {
        Self::new()
    }
}

impl SuperImageCropper {
    /// A cropper that loads sources from the filesystem.
    pub fn new() -> Self {
        Self::with_loader(FsLoader)
    }

    /// A cropper that loads sources through `loader`.
    pub fn with_loader(loader: impl SourceLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            frame_cropper: None,
            blobs: BlobRegistry::new(),
        }
    }

    /// Registry backing the URLs returned for [`OutputType::BlobUrl`].
    pub fn blob_registry(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// Crop the source described by `options`.
    ///
    /// When `cropper` is given it is authoritative: its URL names the source,
    /// its live geometry overrides defaults, and any `src`/`cropper_js_opts`
    /// in `options` are ignored.
    ///
    /// # Errors
    ///
    /// - `CropError::Config` when neither a cropper nor both `src` and
    ///   `cropper_js_opts` are given (checked before any loading)
    /// - `CropError::Load` when the source cannot be read or sniffed
    /// - `CropError::Decode` when the source bytes are malformed
    /// - `CropError::Encode` when the cropped raster would be too large, or
    ///   the result cannot be encoded
    pub fn crop(
        &mut self,
        cropper: Option<&dyn GeometryProvider>,
        mut options: CropperOptions,
    ) -> Result<CropOutput, CropError> {
        validate(cropper.is_some(), &options)?;
        if cropper.is_some() {
            options.src = None;
            options.cropper_js_opts = None;
        }

        let src = match (&options.src, cropper) {
            (Some(src), _) => src.clone(),
            (None, Some(provider)) => provider.url(),
            (None, None) => return Err(ConfigError::MissingSource.into()),
        };
        let request = SourceRequest {
            src,
            cross_origin: options.cross_origin.clone(),
        };

        let bytes = self.loader.load(&request)?;
        let mime = sniff_mime(&bytes)?;
        debug!("Loaded {} ({} bytes, {})", request.src, bytes.len(), mime);

        let source = if mime == GIF_MIME {
            Source::Animated(decompress_frames(&bytes)?)
        } else {
            Source::Still {
                image: decode_still(&bytes)?,
                mime,
            }
        };

        let geometry = resolve_geometry(cropper, &options, &source);
        debug!("Normalized geometry: {:?}", geometry);

        let frame_cropper = self
            .frame_cropper
            .get_or_insert_with(|| FrameCropper::new(&geometry));
        frame_cropper.init(&geometry);

        let output = match source {
            Source::Animated(info) => {
                let frames = frame_cropper.crop_gif(&info)?;
                self.save_gif(frames, &info.delays, options.gif_js_options, options.output_type)?
            }
            Source::Still { image, mime } => {
                let cropped = frame_cropper.crop_static_image(&image)?;
                let blob = encode_still(&cropped, mime, options.quality())?;
                info!(
                    "Cropped still image to {}x{} ({}, {} bytes)",
                    cropped.width,
                    cropped.height,
                    blob.mime,
                    blob.len()
                );
                CropOutput::from_blob(blob, options.output_type, &self.blobs)
            }
        };

        Ok(output)
    }

    /// Encode cropped frames as an animated GIF and deliver it as `output_type`.
    ///
    /// # Errors
    ///
    /// Returns `CropError::Encode` when `frames` is empty or inconsistent.
    pub fn save_gif(
        &self,
        frames: Vec<RgbaBuffer>,
        delays: &[u32],
        gif_options: Option<GifOptions>,
        output_type: OutputType,
    ) -> Result<CropOutput, CropError> {
        let frame_count = frames.len();
        let gif = SyntheticGif::new(frames, delays, gif_options.unwrap_or_default());
        let blob = gif.bootstrap()?;
        info!(
            "Cropped animation to {} frames, {} ms ({} bytes)",
            frame_count,
            gif.delays().iter().map(|&d| u64::from(d)).sum::<u64>(),
            blob.len()
        );
        Ok(CropOutput::from_blob(blob, output_type, &self.blobs))
    }
}

fn validate(has_cropper: bool, options: &CropperOptions) -> Result<(), ConfigError> {
    if has_cropper {
        return Ok(());
    }
    if options.cropper_js_opts.is_none() {
        return Err(ConfigError::MissingCropOptions);
    }
    if options.src.as_deref().map_or(true, str::is_empty) {
        return Err(ConfigError::MissingSource);
    }
    Ok(())
}

fn resolve_geometry(
    cropper: Option<&dyn GeometryProvider>,
    options: &CropperOptions,
    source: &Source,
) -> CropGeometry {
    let (natural_width, natural_height) = source.natural_size();
    let image = match cropper {
        Some(provider) => {
            debug!("Widget crop box: {:?}", provider.get_crop_box_data());
            provider.get_image_data()
        }
        None => ImageDescriptor::from_natural(natural_width, natural_height),
    };

    let live = cropper.map(|p| p.get_data());
    normalize(options.cropper_js_opts.as_ref(), live.as_ref(), &image)
}
