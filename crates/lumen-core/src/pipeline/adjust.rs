//! Pure pixel transforms over an RGBA8 buffer.
//!
//! Stages run in a fixed order — brightness/contrast, HSL, RGB channel
//! scaling, sharpen — and each stage is a no-op fast path when its parameters
//! equal the identity value. Out-of-range slider values are clamped, never
//! rejected: pixel math here does not fail.

use crate::types::AdjustmentSet;

/// Apply the full adjustment chain to an RGBA8 buffer in place.
///
/// When `skip_transparent` is true, fully transparent pixels (alpha == 0)
/// are left completely unchanged by every stage, including as sharpen
/// outputs. They may still be read as neighbor contributions.
pub fn apply_adjustments(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    adj: &AdjustmentSet,
    skip_transparent: bool,
) {
    apply_brightness_contrast(pixels, adj.brightness, adj.contrast, skip_transparent);
    apply_hsl(pixels, adj.hue, adj.saturation, adj.lightness, skip_transparent);
    apply_rgb_scale(
        pixels,
        adj.red_scale,
        adj.green_scale,
        adj.blue_scale,
        skip_transparent,
    );
    apply_sharpen(pixels, width, height, adj.sharpen, skip_transparent);
}

/// Brightness offset followed by the contrast curve
/// `v' = f * (v - 128) + 128` with `f = 259(c+255) / (255(259-c))`.
///
/// The brightness result is clamped to [0, 255] before contrast is applied,
/// matching write-through-clamped-buffer semantics.
fn apply_brightness_contrast(
    pixels: &mut [u8],
    brightness: f32,
    contrast: f32,
    skip_transparent: bool,
) {
    if brightness == 0.0 && contrast == 0.0 {
        return;
    }

    let brightness = brightness.clamp(-255.0, 255.0);
    let contrast = contrast.clamp(-255.0, 255.0);
    let factor = (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast));

    for px in pixels.chunks_exact_mut(4) {
        if skip_transparent && px[3] == 0 {
            continue;
        }
        for c in &mut px[..3] {
            let v = (*c as f32 + brightness).clamp(0.0, 255.0);
            *c = (factor * (v - 128.0) + 128.0).clamp(0.0, 255.0).round() as u8;
        }
    }
}

/// HSL adjustment: hue shifted by `(hue - 100) * 3.6` degrees, saturation and
/// lightness multiplied by `x / 100` and capped at 1.
fn apply_hsl(pixels: &mut [u8], hue: f32, saturation: f32, lightness: f32, skip_transparent: bool) {
    if hue == 100.0 && saturation == 100.0 && lightness == 100.0 {
        return;
    }

    let hue_shift = (hue - 100.0) * 3.6;
    let sat_factor = (saturation / 100.0).max(0.0);
    let light_factor = (lightness / 100.0).max(0.0);

    for px in pixels.chunks_exact_mut(4) {
        if skip_transparent && px[3] == 0 {
            continue;
        }

        let r = px[0] as f32 / 255.0;
        let g = px[1] as f32 / 255.0;
        let b = px[2] as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        let (mut h, mut s) = if max == min {
            (0.0, 0.0) // achromatic
        } else {
            let d = max - min;
            let s = if l > 0.5 {
                d / (2.0 - max - min)
            } else {
                d / (max + min)
            };
            let h = if max == r {
                (g - b) / d + if g < b { 6.0 } else { 0.0 }
            } else if max == g {
                (b - r) / d + 2.0
            } else {
                (r - g) / d + 4.0
            };
            (h / 6.0, s)
        };

        h = ((h * 360.0 + hue_shift) % 360.0) / 360.0;
        if h < 0.0 {
            h += 1.0;
        }
        s = (s * sat_factor).min(1.0);
        let l = (l * light_factor).min(1.0);

        let (r1, g1, b1) = if s == 0.0 {
            (l, l, l) // achromatic
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        px[0] = (r1 * 255.0).round().clamp(0.0, 255.0) as u8;
        px[1] = (g1 * 255.0).round().clamp(0.0, 255.0) as u8;
        px[2] = (b1 * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Piecewise-linear interpolation between the HSL anchor values over six
/// hue sectors.
fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Per-channel multiplicative scaling, independently clamped.
fn apply_rgb_scale(
    pixels: &mut [u8],
    red_scale: f32,
    green_scale: f32,
    blue_scale: f32,
    skip_transparent: bool,
) {
    if red_scale == 1.0 && green_scale == 1.0 && blue_scale == 1.0 {
        return;
    }

    let scales = [
        red_scale.max(0.0),
        green_scale.max(0.0),
        blue_scale.max(0.0),
    ];

    for px in pixels.chunks_exact_mut(4) {
        if skip_transparent && px[3] == 0 {
            continue;
        }
        for (c, scale) in px[..3].iter_mut().zip(scales) {
            *c = (*c as f32 * scale).clamp(0.0, 255.0).round() as u8;
        }
    }
}

/// Unsharp-style 3x3 convolution: center weight `1 + 4s`, orthogonal
/// neighbors `-s`, diagonals 0, with `s = min(amount * 2, 4)`.
///
/// Only the interior is convolved; border pixels are deliberately left
/// untouched rather than padded — a common off-by-one trap, so the bounds
/// here are exactly `1..height-1` x `1..width-1`. The kernel reads from a
/// snapshot of the pre-sharpen buffer so the result does not depend on
/// raster-scan direction.
fn apply_sharpen(pixels: &mut [u8], width: u32, height: u32, amount: f32, skip_transparent: bool) {
    if amount <= 0.0 {
        return;
    }
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 || pixels.len() < w * h * 4 {
        return;
    }

    let snapshot = pixels.to_vec();
    let strength = (amount * 2.0).min(4.0);
    let center_weight = 1.0 + 4.0 * strength;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = (y * w + x) * 4;
            if skip_transparent && pixels[i + 3] == 0 {
                continue;
            }
            for c in 0..3 {
                let center = snapshot[i + c] as f32;
                let up = snapshot[i + c - w * 4] as f32;
                let down = snapshot[i + c + w * 4] as f32;
                let left = snapshot[i + c - 4] as f32;
                let right = snapshot[i + c + 4] as f32;

                let sum = center_weight * center - strength * (up + down + left + right);
                pixels[i + c] = sum.clamp(0.0, 255.0).round() as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 10;
    const H: u32 = 10;

    /// 10x10 buffer filled with (100, 150, 200, 255), every 10th pixel
    /// transparent.
    fn test_buffer() -> Vec<u8> {
        let mut data = Vec::with_capacity((W * H * 4) as usize);
        for i in 0..(W * H) as usize {
            data.extend_from_slice(&[100, 150, 200, if i % 10 == 0 { 0 } else { 255 }]);
        }
        data
    }

    #[test]
    fn test_identity_leaves_buffer_unchanged() {
        let mut data = test_buffer();
        let original = data.clone();
        apply_adjustments(&mut data, W, H, &AdjustmentSet::default(), false);
        assert_eq!(data, original);
    }

    #[test]
    fn test_brightness_offsets_opaque_pixels() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            brightness: 50.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, true);

        // Opaque pixels shift by +50, clamped
        for i in 1..10 {
            let idx = i * 4;
            assert_eq!(data[idx], 150);
            assert_eq!(data[idx + 1], 200);
            assert_eq!(data[idx + 2], 250);
        }
        // Transparent pixel 0 untouched
        assert_eq!(&data[0..4], &[100, 150, 200, 0]);
    }

    #[test]
    fn test_brightness_clamps_at_255() {
        let mut data = vec![250, 250, 250, 255];
        let adj = AdjustmentSet {
            brightness: 50.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, 1, 1, &adj, false);
        assert_eq!(&data[..3], &[255, 255, 255]);
    }

    #[test]
    fn test_contrast_changes_values() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            contrast: 50.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);

        let idx = 4; // second pixel
        assert_ne!(data[idx], 100);
        assert_ne!(data[idx + 1], 150);
        assert_ne!(data[idx + 2], 200);
    }

    #[test]
    fn test_contrast_output_in_range_for_extreme_inputs() {
        for contrast in [-400.0, -100.0, 100.0, 400.0] {
            let mut data = test_buffer();
            let adj = AdjustmentSet {
                brightness: 300.0,
                contrast,
                ..Default::default()
            };
            apply_adjustments(&mut data, W, H, &adj, false);
            // u8 storage already bounds values; verify the buffer is intact
            assert_eq!(data.len(), (W * H * 4) as usize);
        }
    }

    #[test]
    fn test_hsl_lightness_brightens() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            lightness: 150.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);

        for i in 1..10 {
            let idx = i * 4;
            let sum = data[idx] as u32 + data[idx + 1] as u32 + data[idx + 2] as u32;
            assert!(sum > 100 + 150 + 200, "expected brighter pixel, got {sum}");
        }
    }

    #[test]
    fn test_hsl_hue_shift_changes_values() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            hue: 150.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);

        let changed = (1..10).any(|i| {
            let idx = i * 4;
            data[idx] != 100 || data[idx + 1] != 150 || data[idx + 2] != 200
        });
        assert!(changed);
    }

    #[test]
    fn test_hsl_skips_transparent() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            hue: 150.0,
            saturation: 150.0,
            lightness: 150.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, true);
        assert_eq!(&data[0..3], &[100, 150, 200]);
    }

    #[test]
    fn test_hsl_achromatic_pixel() {
        // Gray pixels have no hue; shifting hue must not invent one
        let mut data = vec![128, 128, 128, 255];
        let adj = AdjustmentSet {
            hue: 150.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, 1, 1, &adj, false);
        assert_eq!(&data[..3], &[128, 128, 128]);
    }

    #[test]
    fn test_rgb_scale_per_channel() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            red_scale: 1.5,
            green_scale: 0.5,
            blue_scale: 2.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);

        for i in 1..10 {
            let idx = i * 4;
            assert_eq!(data[idx], 150); // 100 * 1.5
            assert_eq!(data[idx + 1], 75); // 150 * 0.5
            assert_eq!(data[idx + 2], 255); // 200 * 2.0 clamped
        }
    }

    #[test]
    fn test_rgb_scale_skips_transparent() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            red_scale: 1.5,
            green_scale: 0.5,
            blue_scale: 2.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, true);
        assert_eq!(&data[0..3], &[100, 150, 200]);
    }

    #[test]
    fn test_sharpen_zero_amount_is_noop() {
        let mut data = test_buffer();
        let original = data.clone();
        let adj = AdjustmentSet {
            sharpen: 0.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);
        assert_eq!(data, original);
    }

    #[test]
    fn test_sharpen_changes_checkerboard() {
        // Checkerboard has strong local contrast; sharpening must change it
        let mut data = Vec::with_capacity((W * H * 4) as usize);
        for y in 0..H {
            for x in 0..W {
                let v = if (x + y) % 2 == 0 { 50 } else { 200 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let original = data.clone();
        let adj = AdjustmentSet {
            sharpen: 2.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);
        assert_ne!(data, original);
    }

    #[test]
    fn test_sharpen_leaves_border_unconvolved() {
        let mut data = Vec::with_capacity((W * H * 4) as usize);
        for y in 0..H {
            for x in 0..W {
                let v = if (x + y) % 2 == 0 { 50 } else { 200 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let original = data.clone();
        let adj = AdjustmentSet {
            sharpen: 2.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, false);

        // Every pixel on the outer ring is untouched
        for y in 0..H as usize {
            for x in 0..W as usize {
                if y == 0 || y == H as usize - 1 || x == 0 || x == W as usize - 1 {
                    let i = (y * W as usize + x) * 4;
                    assert_eq!(&data[i..i + 4], &original[i..i + 4], "border ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn test_sharpen_skips_transparent_outputs() {
        // Transparent pixel in the interior: it must not be written as a
        // kernel output, though neighbors may read it.
        let mut data = vec![100u8, 150, 200, 255].repeat((W * H) as usize);
        let mid = ((5 * W + 5) * 4) as usize;
        data[mid + 3] = 0;
        let adj = AdjustmentSet {
            sharpen: 1.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &adj, true);
        assert_eq!(&data[mid..mid + 3], &[100, 150, 200]);
    }

    #[test]
    fn test_sharpen_strength_capped() {
        // amount 10 caps at strength 4; the uniform field stays uniform
        // either way (kernel sums to 1), so check a gradient instead
        let mut data = Vec::new();
        for y in 0..H {
            for x in 0..W {
                let v = ((x + y) * 10).min(255) as u8;
                data.push(v);
                data.push(v);
                data.push(v);
                data.push(255);
            }
        }
        let mut capped = data.clone();
        let high = AdjustmentSet {
            sharpen: 10.0,
            ..Default::default()
        };
        let at_cap = AdjustmentSet {
            sharpen: 2.0, // strength = min(2*2, 4) = 4, same as amount 10
            ..Default::default()
        };
        apply_adjustments(&mut data, W, H, &high, false);
        apply_adjustments(&mut capped, W, H, &at_cap, false);
        assert_eq!(data, capped);
    }

    #[test]
    fn test_tiny_image_sharpen_is_noop() {
        // 2x2 has no interior
        let mut data = vec![10, 20, 30, 255].repeat(4);
        let original = data.clone();
        let adj = AdjustmentSet {
            sharpen: 3.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, 2, 2, &adj, false);
        assert_eq!(data, original);
    }

    #[test]
    fn test_stage_order_brightness_before_hsl() {
        // Brightness +255 saturates channels to white before HSL runs;
        // a saturation boost on white must leave it white.
        let mut data = vec![100, 150, 200, 255];
        let adj = AdjustmentSet {
            brightness: 255.0,
            saturation: 150.0,
            ..Default::default()
        };
        apply_adjustments(&mut data, 1, 1, &adj, false);
        assert_eq!(&data[..3], &[255, 255, 255]);
    }

    #[test]
    fn test_alpha_channel_never_modified() {
        let mut data = test_buffer();
        let adj = AdjustmentSet {
            brightness: 80.0,
            contrast: 40.0,
            hue: 130.0,
            saturation: 140.0,
            lightness: 120.0,
            red_scale: 1.3,
            green_scale: 0.8,
            blue_scale: 1.1,
            sharpen: 1.5,
            ..Default::default()
        };
        let alphas: Vec<u8> = data.chunks_exact(4).map(|p| p[3]).collect();
        apply_adjustments(&mut data, W, H, &adj, false);
        let after: Vec<u8> = data.chunks_exact(4).map(|p| p[3]).collect();
        assert_eq!(alphas, after);
    }
}
