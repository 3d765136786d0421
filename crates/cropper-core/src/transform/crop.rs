//! Crop window extraction from an intermediate surface.
//!
//! Windows are in whole surface pixels and may hang off any edge of the
//! surface. Two policies are provided:
//!
//! - [`extract_window`] keeps the requested size and fills uncovered pixels
//!   with a background color. Animation frames use this so every frame has
//!   exactly the requested dimensions.
//! - [`extract_window_clamped`] intersects the window with the surface first,
//!   the way a canvas `drawImage` of an out-of-range region behaves.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner of the surface
//! - `left`/`top` may be negative

use crate::decode::RgbaBuffer;
use crate::geometry::PixelWindow;

/// Copy the `window` region out of `surface`, keeping the window's size.
///
/// # Arguments
///
/// * `surface` - Source surface
/// * `window` - Region to extract, in surface pixels
/// * `background` - Fill for any part of the window outside the surface
///
/// # Returns
///
/// A buffer of exactly `window.width` x `window.height` pixels.
pub fn extract_window(
    surface: &RgbaBuffer,
    window: &PixelWindow,
    background: [u8; 4],
) -> RgbaBuffer {
    let mut output = RgbaBuffer::filled(window.width, window.height, background);

    let src_w = i64::from(surface.width);
    let src_h = i64::from(surface.height);

    // Overlap of the window and the surface, in surface coordinates
    let x0 = window.left.max(0);
    let y0 = window.top.max(0);
    let x1 = (window.left + i64::from(window.width)).min(src_w);
    let y1 = (window.top + i64::from(window.height)).min(src_h);
    if x0 >= x1 || y0 >= y1 {
        return output;
    }

    let row_bytes = ((x1 - x0) * 4) as usize;
    let out_stride = window.width as usize * 4;
    let src_stride = surface.width as usize * 4;

    // Copy pixel data row by row for efficiency
    for sy in y0..y1 {
        let src_start = sy as usize * src_stride + x0 as usize * 4;
        let dy = (sy - window.top) as usize;
        let dx = (x0 - window.left) as usize;
        let dst_start = dy * out_stride + dx * 4;
        output.pixels[dst_start..dst_start + row_bytes]
            .copy_from_slice(&surface.pixels[src_start..src_start + row_bytes]);
    }

    output
}

/// Intersect `window` with a `width` x `height` surface.
///
/// The result is at least 1x1 and always lies inside the surface.
pub fn clamp_window(window: &PixelWindow, width: u32, height: u32) -> PixelWindow {
    let max_x = i64::from(width.max(1));
    let max_y = i64::from(height.max(1));

    let left = window.left.clamp(0, max_x - 1);
    let top = window.top.clamp(0, max_y - 1);
    let right = (window.left + i64::from(window.width)).clamp(0, max_x);
    let bottom = (window.top + i64::from(window.height)).clamp(0, max_y);

    PixelWindow {
        left,
        top,
        width: (right - left).max(1) as u32,
        height: (bottom - top).max(1) as u32,
    }
}

/// Copy the part of `window` that lies on `surface`.
///
/// # Behavior
///
/// - Coordinates beyond the surface are clamped
/// - Minimum output dimension is 1x1 pixels
/// - A window covering the whole surface returns a copy of it
pub fn extract_window_clamped(surface: &RgbaBuffer, window: &PixelWindow) -> RgbaBuffer {
    let clamped = clamp_window(window, surface.width, surface.height);
    if clamped.left == 0
        && clamped.top == 0
        && clamped.width == surface.width
        && clamped.height == surface.height
    {
        return surface.clone();
    }
    extract_window(surface, &clamped, [0, 0, 0, 0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_buffer;

    fn window(left: i64, top: i64, width: u32, height: u32) -> PixelWindow {
        PixelWindow {
            left,
            top,
            width,
            height,
        }
    }

    const FILL: [u8; 4] = [9, 8, 7, 255];

    #[test]
    fn test_full_window_copies_surface() {
        let img = gradient_buffer(20, 10);
        assert_eq!(extract_window(&img, &window(0, 0, 20, 10), FILL), img);
        assert_eq!(extract_window_clamped(&img, &window(0, 0, 20, 10)), img);
    }

    #[test]
    fn test_interior_window() {
        let img = gradient_buffer(10, 10);
        let out = extract_window(&img, &window(2, 3, 4, 5), FILL);

        assert_eq!((out.width, out.height), (4, 5));
        // First pixel should be from position (2, 3) in the original
        assert_eq!(out.pixel(0, 0), img.pixel(2, 3));
        assert_eq!(out.pixel(3, 4), img.pixel(5, 7));
    }

    #[test]
    fn test_overhanging_window_is_filled() {
        let img = gradient_buffer(4, 4);
        let out = extract_window(&img, &window(-2, -1, 4, 3), FILL);

        assert_eq!((out.width, out.height), (4, 3));
        assert_eq!(out.pixel(0, 0), FILL);
        assert_eq!(out.pixel(1, 2), FILL);
        assert_eq!(out.pixel(2, 1), img.pixel(0, 0));
        assert_eq!(out.pixel(3, 2), img.pixel(1, 1));
    }

    #[test]
    fn test_disjoint_window_is_all_background() {
        let img = gradient_buffer(4, 4);
        let out = extract_window(&img, &window(10, 10, 3, 2), FILL);
        assert!(out.pixels.chunks_exact(4).all(|px| px == FILL));
    }

    #[test]
    fn test_clamped_window_shrinks() {
        let img = gradient_buffer(10, 10);
        let out = extract_window_clamped(&img, &window(8, 8, 5, 5));

        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.pixel(0, 0), img.pixel(8, 8));
    }

    #[test]
    fn test_clamped_negative_origin() {
        let img = gradient_buffer(10, 10);
        let out = extract_window_clamped(&img, &window(-3, -3, 5, 5));

        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.pixel(0, 0), img.pixel(0, 0));
    }

    #[test]
    fn test_clamped_minimum_dimension() {
        let img = gradient_buffer(10, 10);
        let out = extract_window_clamped(&img, &window(50, 50, 5, 5));

        assert_eq!((out.width, out.height), (1, 1));
        assert_eq!(out.pixel(0, 0), img.pixel(9, 9));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::test_helpers::gradient_buffer;
    use proptest::prelude::*;

    fn window_strategy() -> impl Strategy<Value = PixelWindow> {
        (-40i64..=40, -40i64..=40, 1u32..=60, 1u32..=60).prop_map(|(left, top, width, height)| {
            PixelWindow {
                left,
                top,
                width,
                height,
            }
        })
    }

    proptest! {
        /// Property: Filled extraction always has the requested size.
        #[test]
        fn prop_filled_matches_window(
            (width, height) in (1u32..=40, 1u32..=40),
            window in window_strategy(),
        ) {
            let img = gradient_buffer(width, height);
            let out = extract_window(&img, &window, [0, 0, 0, 0]);

            prop_assert_eq!((out.width, out.height), (window.width, window.height));
            prop_assert_eq!(out.pixels.len(), window.width as usize * window.height as usize * 4);
        }

        /// Property: Clamped extraction stays within the surface.
        #[test]
        fn prop_clamped_bounded_by_surface(
            (width, height) in (1u32..=40, 1u32..=40),
            window in window_strategy(),
        ) {
            let img = gradient_buffer(width, height);
            let out = extract_window_clamped(&img, &window);

            prop_assert!(out.width >= 1 && out.width <= width);
            prop_assert!(out.height >= 1 && out.height <= height);
        }

        /// Property: Every covered pixel comes from the matching surface position.
        #[test]
        fn prop_covered_pixels_from_surface(
            (width, height) in (1u32..=30, 1u32..=30),
            window in window_strategy(),
        ) {
            let img = gradient_buffer(width, height);
            let out = extract_window(&img, &window, [1, 2, 3, 4]);

            for y in 0..out.height {
                for x in 0..out.width {
                    let sx = window.left + i64::from(x);
                    let sy = window.top + i64::from(y);
                    let inside =
                        sx >= 0 && sy >= 0 && sx < i64::from(width) && sy < i64::from(height);
                    let expected = if inside {
                        img.pixel(sx as u32, sy as u32)
                    } else {
                        [1, 2, 3, 4]
                    };
                    prop_assert_eq!(out.pixel(x, y), expected);
                }
            }
        }
    }
}
