//! Size/quality presets and named style presets.
//!
//! Size presets control the commit-path target dimensions and encode
//! quality. Style presets are pure data: selecting one replaces the caller's
//! current `AdjustmentSet` wholesale.

use serde::{Deserialize, Serialize};

use crate::types::AdjustmentSet;

/// A named export size/quality configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    /// Target width in pixels, always set
    pub width: u32,
    /// Target height; None preserves the aspect ratio
    pub height: Option<u32>,
    /// Encode quality, 0-100
    pub quality: u8,
    pub description: String,
}

fn builtin(id: &str, name: &str, width: u32, quality: u8, description: &str) -> Preset {
    Preset {
        id: id.to_string(),
        name: name.to_string(),
        width,
        height: None,
        quality,
        description: description.to_string(),
    }
}

/// Catalog of size presets. All built-in entries are immutable; `custom` is
/// the single mutable entry and replaces itself by id.
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetCatalog {
    pub fn new() -> Self {
        Self {
            presets: vec![
                builtin(
                    "web-optimized",
                    "Web Optimized",
                    1080,
                    75,
                    "Small files for product listings and social posts",
                ),
                builtin(
                    "standard",
                    "Standard",
                    1280,
                    85,
                    "Balanced size and quality for storefront galleries",
                ),
                builtin(
                    "high-quality",
                    "High Quality",
                    1600,
                    90,
                    "Crisp detail for zoomable product pages",
                ),
                builtin(
                    "print-ready",
                    "Print Ready",
                    1920,
                    95,
                    "High resolution for catalogs and print material",
                ),
                builtin(
                    "maximum",
                    "Maximum",
                    2160,
                    100,
                    "Largest output, no quality compromise",
                ),
                builtin(
                    "custom",
                    "Custom",
                    1080,
                    85,
                    "User-defined dimensions and quality",
                ),
            ],
        }
    }

    /// Look up a preset by id.
    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// All presets, custom entry included.
    pub fn all(&self) -> &[Preset] {
        &self.presets
    }

    /// Overwrite the `custom` preset with user-supplied values. Inputs are
    /// clamped at this boundary so nothing downstream sees a zero dimension
    /// or an out-of-range quality.
    pub fn set_custom(&mut self, width: u32, height: Option<u32>, quality: u8) -> &Preset {
        let width = width.max(1);
        let height = height.map(|h| h.max(1));
        let quality = quality.min(100);

        let idx = self
            .presets
            .iter()
            .position(|p| p.id == "custom")
            .expect("catalog always contains a custom entry");
        let entry = &mut self.presets[idx];
        entry.width = width;
        entry.height = height;
        entry.quality = quality;
        &self.presets[idx]
    }
}

/// Hand-tuned style presets, keyed by id. Values reproduce the original
/// tuning exactly; there is no algorithm here beyond table lookup.
pub fn style_preset(id: &str) -> Option<AdjustmentSet> {
    let base = AdjustmentSet::default();
    let adj = match id {
        "vivid" => AdjustmentSet {
            saturation: 120.0,
            lightness: 110.0,
            contrast: 10.0,
            ..base
        },
        "sharp" => AdjustmentSet {
            sharpen: 1.5,
            brightness: 10.0,
            contrast: 15.0,
            ..base
        },
        "classic" => AdjustmentSet {
            red_scale: 1.1,
            green_scale: 1.0,
            blue_scale: 0.9,
            saturation: 90.0,
            lightness: 105.0,
            ..base
        },
        "clean" => AdjustmentSet {
            contrast: 5.0,
            brightness: 10.0,
            sharpen: 1.0,
            saturation: 95.0,
            lightness: 105.0,
            ..base
        },
        "white-bg" => AdjustmentSet {
            brightness: 25.0,
            contrast: 15.0,
            sharpen: 1.2,
            saturation: 90.0,
            lightness: 115.0,
            ..base
        },
        "dramatic" => AdjustmentSet {
            contrast: 25.0,
            brightness: 5.0,
            sharpen: 1.8,
            saturation: 110.0,
            lightness: 95.0,
            ..base
        },
        "jewelry" => AdjustmentSet {
            contrast: 15.0,
            brightness: 10.0,
            sharpen: 2.0,
            red_scale: 1.05,
            green_scale: 1.02,
            blue_scale: 1.1,
            saturation: 85.0,
            lightness: 108.0,
            ..base
        },
        "soft-product" => AdjustmentSet {
            contrast: 5.0,
            brightness: 15.0,
            sharpen: 0.6,
            saturation: 105.0,
            lightness: 110.0,
            red_scale: 1.02,
            green_scale: 1.02,
            blue_scale: 1.0,
            ..base
        },
        "textile" => AdjustmentSet {
            contrast: 12.0,
            brightness: 8.0,
            sharpen: 1.3,
            saturation: 110.0,
            lightness: 103.0,
            red_scale: 1.02,
            green_scale: 1.0,
            blue_scale: 0.98,
            ..base
        },
        "food" => AdjustmentSet {
            contrast: 18.0,
            brightness: 5.0,
            sharpen: 1.6,
            saturation: 115.0,
            lightness: 105.0,
            red_scale: 1.05,
            green_scale: 1.03,
            blue_scale: 0.97,
            ..base
        },
        "furniture" => AdjustmentSet {
            contrast: 10.0,
            brightness: 8.0,
            sharpen: 1.4,
            saturation: 95.0,
            lightness: 102.0,
            red_scale: 1.03,
            green_scale: 1.0,
            blue_scale: 0.95,
            ..base
        },
        "transparent" => AdjustmentSet {
            contrast: 20.0,
            brightness: 12.0,
            sharpen: 1.1,
            saturation: 85.0,
            lightness: 112.0,
            red_scale: 0.98,
            green_scale: 1.0,
            blue_scale: 1.04,
            ..base
        },
        _ => return None,
    };
    Some(adj)
}

/// Style preset ids, in display order.
pub const STYLE_PRESET_IDS: &[&str] = &[
    "vivid",
    "sharp",
    "classic",
    "clean",
    "white-bg",
    "dramatic",
    "jewelry",
    "soft-product",
    "textile",
    "food",
    "furniture",
    "transparent",
];
