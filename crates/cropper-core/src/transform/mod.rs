//! Geometry primitives behind the frame cropper: transform, then extract.
//!
//! A crop runs in two steps:
//! 1. Draw the source scaled and rotated about its center onto an
//!    intermediate surface sized to the transformed bounds
//! 2. Extract the crop window from that surface
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise
//! - Negative scale mirrors the source
//! - Windows are in surface pixels, origin at the top-left corner

mod background;
mod crop;
mod rotation;

pub use background::{composite_over, parse_background, TRANSPARENT};
pub use crop::{clamp_window, extract_window, extract_window_clamped};
pub use rotation::{compute_transformed_bounds, TransformPlan};
