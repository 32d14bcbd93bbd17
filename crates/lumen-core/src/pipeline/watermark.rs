//! Watermark compositing onto an adjusted pixel buffer.
//!
//! The overlay arrives as an encoded image (the host rasterizes text
//! watermarks itself). Compositing scales it relative to the base width,
//! positions it at the requested corner with a small margin, and alpha-blends
//! at the configured opacity. A watermark that cannot be decoded is skipped
//! with a warning rather than failing the image.

use image::RgbaImage;

use crate::types::{WatermarkKind, WatermarkPlacement, WatermarkSettings};

/// Margin from the image edge, as a fraction of the base width.
const EDGE_MARGIN: f32 = 0.02;

/// Blend the watermark overlay onto `base` in place. A no-op when the
/// watermark is disabled, kind is `None`, or no overlay buffer is present.
pub fn composite(base: &mut RgbaImage, settings: &WatermarkSettings) {
    if !settings.enabled || settings.kind == WatermarkKind::None {
        return;
    }
    let Some(overlay_bytes) = settings.overlay.as_deref() else {
        return;
    };
    let overlay = match image::load_from_memory(overlay_bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            tracing::warn!("Skipping undecodable watermark overlay: {e}");
            return;
        }
    };

    let (bw, bh) = base.dimensions();
    let scale = settings.scale.clamp(0.01, 1.0);
    let target_w = ((bw as f32 * scale).round() as u32).max(1);
    let target_h = ((target_w as f32 * overlay.height() as f32 / overlay.width() as f32)
        .round() as u32)
        .max(1);
    let scaled = image::imageops::resize(
        &overlay,
        target_w,
        target_h,
        image::imageops::FilterType::Triangle,
    );

    let (ox, oy) = origin(settings.placement, bw, bh, target_w, target_h);
    let opacity = settings.opacity.clamp(0.0, 1.0);

    for (sx, sy, pixel) in scaled.enumerate_pixels() {
        let x = ox + sx;
        let y = oy + sy;
        if x >= bw || y >= bh {
            continue;
        }
        let alpha = (pixel.0[3] as f32 / 255.0) * opacity;
        if alpha <= 0.0 {
            continue;
        }
        let dst = base.get_pixel_mut(x, y);
        for c in 0..3 {
            let blended = pixel.0[c] as f32 * alpha + dst.0[c] as f32 * (1.0 - alpha);
            dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn origin(
    placement: WatermarkPlacement,
    bw: u32,
    bh: u32,
    ow: u32,
    oh: u32,
) -> (u32, u32) {
    let margin = (bw as f32 * EDGE_MARGIN).round() as u32;
    let right = bw.saturating_sub(ow + margin);
    let bottom = bh.saturating_sub(oh + margin);
    match placement {
        WatermarkPlacement::TopLeft => (margin, margin),
        WatermarkPlacement::TopRight => (right, margin),
        WatermarkPlacement::BottomLeft => (margin, bottom),
        WatermarkPlacement::BottomRight => (right, bottom),
        WatermarkPlacement::Center => (
            (bw.saturating_sub(ow)) / 2,
            (bh.saturating_sub(oh)) / 2,
        ),
    }
}
