//! CSS-style background colors and source-over compositing.

use log::warn;

/// Fully transparent black, used when no background is set.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Parse a CSS color string into RGBA.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` with alpha in `0..=1`, and `transparent`/`none`.
/// `None`, empty and unparseable values become transparent.
pub fn parse_background(color: Option<&str>) -> [u8; 4] {
    let Some(raw) = color else {
        return TRANSPARENT;
    };
    let value = raw.trim().to_ascii_lowercase();
    if value.is_empty() || value == "transparent" || value == "none" {
        return TRANSPARENT;
    }

    let parsed = if let Some(hex) = value.strip_prefix('#') {
        parse_hex(hex)
    } else if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        parse_rgb_args(args)
    } else {
        None
    };

    parsed.unwrap_or_else(|| {
        warn!("Unrecognized background color {:?}, using transparent", raw);
        TRANSPARENT
    })
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some([nibble(0)?, nibble(1)?, nibble(2)?, 255]),
        4 => Some([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<[u8; 4]> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v: f64 = s.parse().ok()?;
        v.is_finite().then(|| v.clamp(0.0, 255.0).round() as u8)
    };

    let alpha = match parts.get(3) {
        Some(a) => {
            let v: f64 = a.parse().ok()?;
            if !v.is_finite() {
                return None;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Some([channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, alpha])
}

/// Composite `src` over `dst` (straight alpha, source-over).
pub fn composite_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    if dst[3] == 0 || src[3] == 255 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }

    let sa = f64::from(src[3]) / 255.0;
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (f64::from(src[i]) * sa + f64::from(dst[i]) * da * (1.0 - sa)) / out_a;
        out[i] = c.clamp(0.0, 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}
