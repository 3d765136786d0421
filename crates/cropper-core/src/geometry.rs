//! Crop geometry: the caller/UI-facing crop description and its normalization.
//!
//! A crop request can carry geometry from three places, merged in increasing
//! priority:
//!
//! 1. Built-in defaults (`width = height = 100`, unit scale, no offset or rotation)
//! 2. Caller-supplied [`CropOptions`]
//! 3. The live state of an interactive cropping widget ([`GeometryProvider`])
//!
//! After merging, `left`/`top` are derived from `x`/`y`, a zero width/height
//! falls back to the image's natural size, and `rotate` is folded into
//! `[0, 360)`.
//!
//! # Coordinate System
//!
//! - All values are in natural (source) pixel units
//! - `x`/`y` locate the crop window inside the rotated, scaled source bounds
//! - Rotation is in degrees, positive = clockwise (screen coordinates)
//! - Negative scale mirrors the source about its center

use serde::{Deserialize, Serialize};

/// Partial crop geometry. Every field is optional so sources can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropOptions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub rotate: Option<f64>,
    pub background: Option<String>,
}

impl CropOptions {
    /// The built-in defaults every crop starts from.
    pub fn defaults() -> Self {
        Self {
            width: Some(100.0),
            height: Some(100.0),
            scale_x: Some(1.0),
            scale_y: Some(1.0),
            x: Some(0.0),
            y: Some(0.0),
            left: Some(0.0),
            top: Some(0.0),
            rotate: Some(0.0),
            background: None,
        }
    }

    /// Overwrite every field that `other` specifies.
    pub fn merge(&mut self, other: &CropOptions) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        take(&mut self.width, &other.width);
        take(&mut self.height, &other.height);
        take(&mut self.scale_x, &other.scale_x);
        take(&mut self.scale_y, &other.scale_y);
        take(&mut self.x, &other.x);
        take(&mut self.y, &other.y);
        take(&mut self.left, &other.left);
        take(&mut self.top, &other.top);
        take(&mut self.rotate, &other.rotate);
        take(&mut self.background, &other.background);
    }
}

/// Dimensions of a loaded raster source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageDescriptor {
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
    /// Intrinsic pixel width.
    pub natural_width: f64,
    /// Intrinsic pixel height.
    pub natural_height: f64,
}

impl ImageDescriptor {
    /// Descriptor for a raster shown at its natural size.
    pub fn from_natural(width: u32, height: u32) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
            natural_width: f64::from(width),
            natural_height: f64::from(height),
        }
    }
}

/// The crop window rectangle as the UI draws it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Live geometry source, typically an interactive cropping widget.
///
/// When a provider is supplied it is authoritative: its data overrides any
/// caller options, and its `url` names the source image.
pub trait GeometryProvider {
    /// Current crop transform (x, y, width, height, rotate, scaleX, scaleY).
    fn get_data(&self) -> CropOptions;

    /// Natural and displayed dimensions of the bound image.
    fn get_image_data(&self) -> ImageDescriptor;

    /// Crop window rectangle in display coordinates.
    fn get_crop_box_data(&self) -> CropBox;

    /// The source the widget is bound to.
    fn url(&self) -> String;
}

/// Fully resolved crop geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CropGeometry {
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub x: f64,
    pub y: f64,
    pub left: f64,
    pub top: f64,
    /// Degrees in `[0, 360)`.
    pub rotate: f64,
    pub background: Option<String>,
}

/// Integer crop window in transformed-source pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl CropGeometry {
    /// Round the window to whole pixels. Width and height are at least 1.
    ///
    /// Offsets are clamped to `±u32::MAX` so the window's far edge always
    /// fits in an `i64`.
    pub fn window(&self) -> PixelWindow {
        PixelWindow {
            left: to_offset(self.left),
            top: to_offset(self.top),
            width: to_extent(self.width),
            height: to_extent(self.height),
        }
    }
}

/// Fold any angle into `[0, 360)`.
///
/// Negative angles land on `360 + (angle mod 360)`, so `-90` becomes `270`
/// and `-370` becomes `350`.
pub fn normalize_rotate(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if folded >= 360.0 {
        0.0
    } else {
        folded
    }
}

/// Merge defaults, caller options and live UI data, then derive the final
/// geometry against the image's natural size.
pub fn normalize(
    caller: Option<&CropOptions>,
    live: Option<&CropOptions>,
    image: &ImageDescriptor,
) -> CropGeometry {
    let mut merged = CropOptions::defaults();
    if let Some(caller) = caller {
        merged.merge(caller);
    }
    if let Some(live) = live {
        merged.merge(live);
    }

    let x = finite_or_zero(merged.x.unwrap_or(0.0));
    let y = finite_or_zero(merged.y.unwrap_or(0.0));
    let width = match merged.width {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => image.natural_width,
    };
    let height = match merged.height {
        Some(h) if h.is_finite() && h > 0.0 => h,
        _ => image.natural_height,
    };

    CropGeometry {
        width,
        height,
        scale_x: finite_scale(merged.scale_x),
        scale_y: finite_scale(merged.scale_y),
        x,
        y,
        left: x,
        top: y,
        rotate: normalize_rotate(merged.rotate.unwrap_or(0.0)),
        background: merged.background,
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn finite_scale(v: Option<f64>) -> f64 {
    match v {
        Some(s) if s.is_finite() && s != 0.0 => s,
        _ => 1.0,
    }
}

fn to_offset(v: f64) -> i64 {
    let limit = f64::from(u32::MAX);
    finite_or_zero(v).round().clamp(-limit, limit) as i64
}

fn to_extent(v: f64) -> u32 {
    if !v.is_finite() {
        return 1;
    }
    v.round().clamp(1.0, f64::from(u32::MAX)) as u32
}


// ============================================================================
// Property-Based Tests
// ============================================================================
