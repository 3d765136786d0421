//! Caller configuration for a crop request.
//!
//! Field names are camelCase on the wire, so the same option objects a
//! JavaScript caller builds deserialize directly.

use serde::{Deserialize, Serialize};

use crate::geometry::CropOptions;

/// Default still-image quality (percent).
pub const DEFAULT_QUALITY: u8 = 100;

/// How the crop result is handed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputType {
    /// A `data:<mime>;base64,...` string.
    #[serde(rename = "base64")]
    Base64,
    /// Raw bytes plus MIME type.
    #[serde(rename = "blob")]
    Blob,
    /// A URL that resolves to the blob.
    #[default]
    #[serde(rename = "blobURL")]
    BlobUrl,
}

/// Options for one `crop` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropperOptions {
    /// Path, `file://` URL or `data:` URI of the source image.
    pub src: Option<String>,
    /// CORS mode forwarded to the loader.
    pub cross_origin: Option<String>,
    /// Explicit crop geometry, used when no cropping widget is bound.
    pub cropper_js_opts: Option<CropOptions>,
    /// Encoder settings for animated output.
    pub gif_js_options: Option<GifOptions>,
    pub output_type: OutputType,
    /// Still-image quality, 0 to 100. Defaults to 100.
    pub quality: Option<f64>,
}

impl CropperOptions {
    /// Quality clamped to `0..=100`.
    pub fn quality(&self) -> u8 {
        match self.quality {
            Some(q) if q.is_finite() => q.clamp(0.0, 100.0).round() as u8,
            _ => DEFAULT_QUALITY,
        }
    }
}

/// Animated GIF encoder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GifOptions {
    /// 0 loops forever, -1 plays once, n loops n times.
    pub repeat: i32,
    /// NeuQuant sampling factor; 1 is best, 30 is fastest.
    pub quality: i32,
    /// Parallel quantization workers.
    pub workers: usize,
    pub background: Option<String>,
    /// Expected frame width; must match the cropped frames when set.
    pub width: Option<u32>,
    /// Expected frame height; must match the cropped frames when set.
    pub height: Option<u32>,
    /// `#rrggbb` or `0xrrggbb` color to key as transparent.
    pub transparent: Option<String>,
    pub dither: bool,
    /// Log every encoded frame.
    pub debug: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            repeat: 0,
            quality: 10,
            workers: 2,
            background: None,
            width: None,
            height: None,
            transparent: None,
            dither: false,
            debug: false,
        }
    }
}

impl GifOptions {
    /// NeuQuant sampling factor clamped to `1..=30`.
    pub fn sample_factor(&self) -> i32 {
        self.quality.clamp(1, 30)
    }

    /// Worker count, at least 1.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    /// Loop behaviour for the container, or `None` to omit the loop extension.
    pub fn repeat_mode(&self) -> Option<gif::Repeat> {
        match self.repeat {
            0 => Some(gif::Repeat::Infinite),
            n if n < 0 => None,
            n => Some(gif::Repeat::Finite(n.min(i32::from(u16::MAX)) as u16)),
        }
    }

    /// Parse the transparent color key.
    pub fn transparent_key(&self) -> Option<[u8; 3]> {
        let raw = self.transparent.as_deref()?.trim();
        let hex = raw
            .strip_prefix('#')
            .or_else(|| raw.strip_prefix("0x"))
            .or_else(|| raw.strip_prefix("0X"))?;
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some([(value >> 16) as u8, (value >> 8) as u8, value as u8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cropper_options_defaults() {
        let opts: CropperOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.output_type, OutputType::BlobUrl);
        assert_eq!(opts.quality(), 100);
        assert!(opts.src.is_none());
        assert!(opts.cropper_js_opts.is_none());
    }

    #[test]
    fn test_cropper_options_camel_case() {
        let opts: CropperOptions = serde_json::from_str(
            r#"{
                "src": "a.gif",
                "crossOrigin": "anonymous",
                "cropperJsOpts": {"x": 10, "scaleX": -1},
                "gifJsOptions": {"repeat": -1, "workers": 4},
                "outputType": "base64",
                "quality": 80
            }"#,
        )
        .unwrap();

        assert_eq!(opts.src.as_deref(), Some("a.gif"));
        assert_eq!(opts.cross_origin.as_deref(), Some("anonymous"));
        assert_eq!(opts.output_type, OutputType::Base64);
        assert_eq!(opts.quality(), 80);

        let crop = opts.cropper_js_opts.unwrap();
        assert_eq!(crop.x, Some(10.0));
        assert_eq!(crop.scale_x, Some(-1.0));

        let gif = opts.gif_js_options.unwrap();
        assert_eq!(gif.repeat, -1);
        assert_eq!(gif.workers, 4);
        assert_eq!(gif.quality, 10);
    }

    #[test]
    fn test_output_type_names() {
        let parse = |s: &str| serde_json::from_str::<OutputType>(s).unwrap();
        assert_eq!(parse(r#""base64""#), OutputType::Base64);
        assert_eq!(parse(r#""blob""#), OutputType::Blob);
        assert_eq!(parse(r#""blobURL""#), OutputType::BlobUrl);
        assert!(serde_json::from_str::<OutputType>(r#""url""#).is_err());
    }

    #[test]
    fn test_quality_clamped() {
        let mut opts = CropperOptions::default();
        opts.quality = Some(250.0);
        assert_eq!(opts.quality(), 100);
        opts.quality = Some(-3.0);
        assert_eq!(opts.quality(), 0);
        opts.quality = Some(f64::NAN);
        assert_eq!(opts.quality(), 100);
    }

    #[test]
    fn test_repeat_mode() {
        let mut opts = GifOptions::default();
        assert_eq!(opts.repeat_mode(), Some(gif::Repeat::Infinite));
        opts.repeat = -1;
        assert_eq!(opts.repeat_mode(), None);
        opts.repeat = 3;
        assert_eq!(opts.repeat_mode(), Some(gif::Repeat::Finite(3)));
    }

    #[test]
    fn test_sample_factor_and_workers() {
        let mut opts = GifOptions::default();
        assert_eq!(opts.sample_factor(), 10);
        opts.quality = 0;
        opts.workers = 0;
        assert_eq!(opts.sample_factor(), 1);
        assert_eq!(opts.worker_count(), 1);
        opts.quality = 99;
        assert_eq!(opts.sample_factor(), 30);
    }

    #[test]
    fn test_transparent_key() {
        let mut opts = GifOptions::default();
        assert_eq!(opts.transparent_key(), None);
        opts.transparent = Some("#00ff00".to_string());
        assert_eq!(opts.transparent_key(), Some([0, 255, 0]));
        opts.transparent = Some("0x123456".to_string());
        assert_eq!(opts.transparent_key(), Some([0x12, 0x34, 0x56]));
        opts.transparent = Some("green".to_string());
        assert_eq!(opts.transparent_key(), None);
    }
}
