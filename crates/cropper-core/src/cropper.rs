//! Applies one crop geometry to still images and to every frame of an animation.
//!
//! A [`FrameCropper`] is bound to a [`CropGeometry`] with [`FrameCropper::init`].
//! Binding resolves the background color and the pixel window once, so every
//! frame of one animation goes through exactly the same transform. The
//! transform plan itself depends on the source size and is cached per size.
//!
//! Every raster is size-checked before it is allocated: the intermediate
//! surface and the animation window are limited to [`MAX_BUFFER_PIXELS`], and
//! animation frames to the GIF side limit of 65535.

use log::debug;

use crate::decode::{ParsedFrameInfo, RgbaBuffer, MAX_BUFFER_PIXELS};
use crate::encode::EncodeError;
use crate::geometry::{CropGeometry, PixelWindow};
use crate::transform::{extract_window, extract_window_clamped, parse_background, TransformPlan};

/// Largest side of an animation frame.
const MAX_GIF_SIDE: u32 = u16::MAX as u32;

/// Crops frames according to a bound geometry.
#[derive(Debug, Clone)]
pub struct FrameCropper {
    geometry: CropGeometry,
    window: PixelWindow,
    background: [u8; 4],
    plan: Option<TransformPlan>,
}

impl FrameCropper {
    /// Create a cropper bound to `geometry`.
    pub fn new(geometry: &CropGeometry) -> Self {
        Self {
            window: geometry.window(),
            background: parse_background(geometry.background.as_deref()),
            geometry: geometry.clone(),
            plan: None,
        }
    }

    /// Re-bind to new geometry, discarding all state from the previous one.
    pub fn init(&mut self, geometry: &CropGeometry) {
        *self = Self::new(geometry);
    }

    /// The geometry currently bound.
    pub fn geometry(&self) -> &CropGeometry {
        &self.geometry
    }

    /// The crop window in intermediate-surface pixels.
    pub fn window(&self) -> PixelWindow {
        self.window
    }

    /// Crop every frame of an animation.
    ///
    /// Each output frame is exactly the window size, and output order
    /// matches input order.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidDimensions` when the window or the
    /// transformed surface is too large to allocate or to store in a GIF.
    pub fn crop_gif(&mut self, info: &ParsedFrameInfo) -> Result<Vec<RgbaBuffer>, EncodeError> {
        check_size(self.window.width, self.window.height, MAX_GIF_SIDE)?;
        debug!(
            "Cropping {} frames to {}x{} at ({}, {})",
            info.len(),
            self.window.width,
            self.window.height,
            self.window.left,
            self.window.top
        );
        info.frames
            .iter()
            .map(|frame| {
                let surface = self.render(&frame.buffer)?;
                Ok(extract_window(&surface, &self.window, self.background))
            })
            .collect()
    }

    /// Crop a still image.
    ///
    /// The window is clamped to the transformed surface, so the result may
    /// be smaller than requested; its dimensions are carried on the buffer.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidDimensions` when the transformed surface
    /// is too large to allocate.
    pub fn crop_static_image(&mut self, image: &RgbaBuffer) -> Result<RgbaBuffer, EncodeError> {
        let surface = self.render(image)?;
        let cropped = extract_window_clamped(&surface, &self.window);
        debug!(
            "Cropped still image {}x{} -> {}x{}",
            image.width, image.height, cropped.width, cropped.height
        );
        Ok(cropped)
    }

    fn render(&mut self, image: &RgbaBuffer) -> Result<RgbaBuffer, EncodeError> {
        let geometry = &self.geometry;
        let plan = match self.plan.take() {
            Some(plan) if plan.source_size() == (image.width, image.height) => plan,
            _ => TransformPlan::new(
                image.width,
                image.height,
                geometry.rotate,
                geometry.scale_x,
                geometry.scale_y,
            ),
        };
        let (width, height) = plan.surface_size();
        check_size(width, height, u32::MAX)?;

        let surface = plan.render(image, self.background);
        self.plan = Some(plan);
        Ok(surface)
    }
}

/// Reject rasters with a side above `max_side` or more than
/// `MAX_BUFFER_PIXELS` pixels.
fn check_size(width: u32, height: u32, max_side: u32) -> Result<(), EncodeError> {
    let fits = (width as usize)
        .checked_mul(height as usize)
        .is_some_and(|pixels| pixels <= MAX_BUFFER_PIXELS);
    if fits && width <= max_side && height <= max_side {
        Ok(())
    } else {
        Err(EncodeError::InvalidDimensions { width, height })
    }
}
