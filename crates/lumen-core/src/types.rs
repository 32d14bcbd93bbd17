//! Core data types for the Lumen batch photo pipeline.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output raster format for encoded results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Jpeg,
    Png,
    WebP,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
            ExportFormat::WebP => "webp",
        }
    }

    /// MIME type for download headers.
    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
            ExportFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            "webp" => Ok(ExportFormat::WebP),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// The flat record of slider values applied uniformly to a pixel buffer.
///
/// `Default` is the identity transform: every stage becomes a no-op and the
/// buffer passes through byte-for-byte unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentSet {
    /// Brightness offset, centered at 0
    pub brightness: f32,

    /// Contrast offset, centered at 0
    pub contrast: f32,

    /// Red channel multiplier, 1.0 = unchanged
    pub red_scale: f32,

    /// Green channel multiplier, 1.0 = unchanged
    pub green_scale: f32,

    /// Blue channel multiplier, 1.0 = unchanged
    pub blue_scale: f32,

    /// Sharpen amount, 0 = no-op
    pub sharpen: f32,

    /// Hue, 100 = no shift; each unit is 3.6 degrees
    pub hue: f32,

    /// Saturation percentage, 100 = unchanged
    pub saturation: f32,

    /// Lightness percentage, 100 = unchanged
    pub lightness: f32,
}

impl Default for AdjustmentSet {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            red_scale: 1.0,
            green_scale: 1.0,
            blue_scale: 1.0,
            sharpen: 0.0,
            hue: 100.0,
            saturation: 100.0,
            lightness: 100.0,
        }
    }
}

impl AdjustmentSet {
    /// True when every slider is at its identity value.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// One encoded render of an image (preview thumbnail or full resolution).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedOutput {
    /// Encoded image bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Format the bytes were encoded in
    pub format: ExportFormat,

    /// Rendered width in pixels
    pub width: u32,

    /// Rendered height in pixels
    pub height: u32,

    /// True when the requested format was overridden to PNG to keep the
    /// alpha channel intact. Guidance for the caller, not an error.
    pub forced_png: bool,
}

impl EncodedOutput {
    /// Return a data URL suitable for embedding in a host UI.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.media_type(),
            BASE64.encode(&self.bytes)
        )
    }
}

/// Display-only record of the size preset last applied to an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPreset {
    pub name: String,
    pub width: u32,
    pub height: Option<u32>,
    pub quality: u8,
}

/// Watermark kind. Text watermarks are rasterized by the host; the core only
/// composites pre-rendered overlay buffers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkKind {
    None,
    Text,
    Logo,
}

/// Corner placement for the watermark overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPlacement {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

/// Optional final compositing stage, applied after the pixel adjustments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkSettings {
    pub enabled: bool,
    pub kind: WatermarkKind,
    /// Overlay opacity in [0, 1]
    pub opacity: f32,
    pub placement: WatermarkPlacement,
    /// Overlay width as a fraction of the target image width, in (0, 1]
    pub scale: f32,
    /// Encoded overlay image (the host pre-renders text watermarks too)
    #[serde(skip)]
    pub overlay: Option<Vec<u8>>,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: WatermarkKind::None,
            opacity: 0.5,
            placement: WatermarkPlacement::BottomRight,
            scale: 0.2,
            overlay: None,
        }
    }
}

/// One user-supplied photo as it flows through the pipeline.
///
/// The id and original dimensions are assigned once at load time and never
/// change; everything else is replaced in place as adjustments, presets, or
/// background state change.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Stable identifier, derived from the original bytes at load time
    pub id: String,

    /// Original file name as uploaded
    pub file_name: String,

    /// MIME type of the current working source
    pub media_type: String,

    /// Current working pixel source. Substituted wholesale when background
    /// matting succeeds; otherwise the original upload bytes.
    pub bytes: Vec<u8>,

    /// Format the current working source is encoded in
    pub source_format: ExportFormat,

    /// Width of the original decoded image, immutable
    pub width: u32,

    /// Height of the original decoded image, immutable
    pub height: u32,

    /// Thumbnail-resolution encoded preview
    pub preview: Option<EncodedOutput>,

    /// Full-resolution encoded output, regenerated lazily on commit
    pub full: Option<EncodedOutput>,

    /// When true, every transform stage skips alpha == 0 pixels and export
    /// forces PNG. Set after background matting substitutes the source.
    pub alpha_preserving: bool,

    /// Human- or AI-assigned descriptive name used for the exported file
    pub display_name: Option<String>,

    /// Metadata about the preset last applied, for display only
    pub applied_preset: Option<AppliedPreset>,
}

impl SourceImage {
    /// Create an image record from already-decoded facts. The id is the
    /// blake3 hash of the original bytes, truncated to 16 hex chars.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
        source_format: ExportFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let id = blake3::hash(&bytes).to_hex()[..16].to_string();
        Self {
            id,
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
            source_format,
            width,
            height,
            preview: None,
            full: None,
            alpha_preserving: false,
            display_name: None,
            applied_preset: None,
        }
    }

    /// The base name used when exporting: the descriptive name when present,
    /// otherwise the original file's stem.
    pub fn export_stem(&self) -> &str {
        if let Some(name) = self.display_name.as_deref() {
            if !name.is_empty() {
                return name;
            }
        }
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }
}
