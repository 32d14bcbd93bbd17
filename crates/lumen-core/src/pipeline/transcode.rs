//! Per-image decode → resize → adjust → encode.
//!
//! Decoding runs on a blocking task under a timeout; pixel work is pure
//! synchronous CPU over an in-memory buffer. Source bytes are never mutated —
//! every call returns a fresh encoded buffer.

use std::time::Duration;

use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::io::Cursor;
use tokio::time::timeout;

use crate::config::{LimitsConfig, PreviewConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{
    AdjustmentSet, AppliedPreset, EncodedOutput, ExportFormat, SourceImage, WatermarkSettings,
};

use super::adjust::apply_adjustments;
use super::presets::Preset;
use super::watermark;

/// Transcodes one image at preview or full resolution.
pub struct ImageTranscoder {
    limits: LimitsConfig,
    preview: PreviewConfig,
}

impl ImageTranscoder {
    pub fn new(limits: LimitsConfig, preview: PreviewConfig) -> Self {
        Self { limits, preview }
    }

    /// Load an uploaded file: decode once, assign the id, and render an
    /// initial unmodified thumbnail.
    pub async fn load(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> PipelineResult<SourceImage> {
        let size_mb = bytes.len() as u64 / 1_000_000;
        if size_mb > self.limits.max_file_size_mb {
            return Err(PipelineError::FileTooLarge {
                file_name: file_name.to_string(),
                size_mb,
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let (decoded, format) = self.decode(file_name, bytes.clone()).await?;
        let (width, height) = decoded.dimensions();
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                file_name: file_name.to_string(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }

        let source_format = export_format_for(format);
        let mut image =
            SourceImage::new(file_name, media_type, bytes, source_format, width, height);
        let preview =
            self.render_preview(&image, &decoded, &AdjustmentSet::default(), None)?;
        image.preview = Some(preview);

        tracing::debug!(
            "Loaded {:?} as {} ({}x{})",
            file_name,
            image.id,
            width,
            height
        );
        Ok(image)
    }

    /// Render the thumbnail-resolution preview for one image.
    ///
    /// The preview always operates at the configured small cap, independent
    /// of any preset, and encodes in the originally-uploaded format (PNG
    /// when the image is alpha-preserving).
    pub async fn preview(
        &self,
        image: &SourceImage,
        adjustments: &AdjustmentSet,
        watermark: Option<&WatermarkSettings>,
    ) -> PipelineResult<EncodedOutput> {
        let (decoded, _) = self.decode(&image.id, image.bytes.clone()).await?;
        self.render_preview(image, &decoded, adjustments, watermark)
    }

    /// Render the full-resolution output for one image at the preset's
    /// target dimensions, encoded in the requested format at the preset's
    /// quality. Alpha-preserving images are forced to PNG.
    pub async fn commit(
        &self,
        image: &SourceImage,
        adjustments: &AdjustmentSet,
        preset: Option<&Preset>,
        format: ExportFormat,
        watermark: Option<&WatermarkSettings>,
    ) -> PipelineResult<EncodedOutput> {
        let (decoded, _) = self.decode(&image.id, image.bytes.clone()).await?;

        let resized = match preset {
            Some(preset) => {
                let target_w = preset.width.max(1);
                // Preserve aspect ratio when the preset leaves height open
                let target_h = preset.height.unwrap_or_else(|| {
                    let (ow, oh) = decoded.dimensions();
                    ((target_w as f64 * oh as f64 / ow as f64).round() as u32).max(1)
                });
                decoded.resize_exact(target_w, target_h, image::imageops::FilterType::Lanczos3)
            }
            None => decoded,
        };

        let mut rgba = resized.to_rgba8();
        let (w, h) = rgba.dimensions();
        apply_adjustments(
            &mut rgba,
            w,
            h,
            adjustments,
            image.alpha_preserving,
        );
        if let Some(settings) = watermark {
            watermark::composite(&mut rgba, settings);
        }

        let (format, forced_png) = output_format(format, image.alpha_preserving);
        let quality = preset.map(|p| p.quality).unwrap_or(85);
        self.encode(&image.id, rgba, format, quality, forced_png)
    }

    fn render_preview(
        &self,
        image: &SourceImage,
        decoded: &DynamicImage,
        adjustments: &AdjustmentSet,
        watermark: Option<&WatermarkSettings>,
    ) -> PipelineResult<EncodedOutput> {
        // thumbnail() scales to fit the box in both directions, so images
        // already under the cap must bypass it to avoid upscaling
        let (dw, dh) = decoded.dimensions();
        let mut rgba = if dw.max(dh) > self.preview.max_edge {
            decoded
                .thumbnail(self.preview.max_edge, self.preview.max_edge)
                .to_rgba8()
        } else {
            decoded.to_rgba8()
        };
        let (w, h) = rgba.dimensions();
        apply_adjustments(
            &mut rgba,
            w,
            h,
            adjustments,
            image.alpha_preserving,
        );
        if let Some(settings) = watermark {
            watermark::composite(&mut rgba, settings);
        }

        let (format, forced_png) = output_format(image.source_format, image.alpha_preserving);
        self.encode(&image.id, rgba, format, 85, forced_png)
    }

    async fn decode(
        &self,
        image_id: &str,
        bytes: Vec<u8>,
    ) -> PipelineResult<(DynamicImage, ImageFormat)> {
        let id = image_id.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || decode_sync(bytes, &id)),
        )
        .await;

        match result {
            Ok(Ok(decoded)) => decoded,
            Ok(Err(e)) => Err(PipelineError::Decode {
                image_id: image_id.to_string(),
                message: format!("Task join error: {e}"),
            }),
            Err(_) => Err(PipelineError::Timeout {
                image_id: image_id.to_string(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    fn encode(
        &self,
        image_id: &str,
        rgba: RgbaImage,
        format: ExportFormat,
        quality: u8,
        forced_png: bool,
    ) -> PipelineResult<EncodedOutput> {
        let (width, height) = rgba.dimensions();
        let mut buffer = Cursor::new(Vec::new());

        let encode_err = |e: image::ImageError| PipelineError::Encode {
            image_id: image_id.to_string(),
            format: format.extension().to_string(),
            message: e.to_string(),
        };

        match format {
            ExportFormat::Jpeg => {
                // JPEG has no alpha channel; flatten first
                let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
                let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                    &mut buffer,
                    quality.min(100),
                );
                encoder.encode_image(&rgb).map_err(encode_err)?;
            }
            ExportFormat::Png => {
                DynamicImage::ImageRgba8(rgba)
                    .write_to(&mut buffer, ImageFormat::Png)
                    .map_err(encode_err)?;
            }
            ExportFormat::WebP => {
                // The image crate's WebP encoder is lossless; quality applies
                // to JPEG only
                DynamicImage::ImageRgba8(rgba)
                    .write_to(&mut buffer, ImageFormat::WebP)
                    .map_err(encode_err)?;
            }
        }

        Ok(EncodedOutput {
            bytes: buffer.into_inner(),
            format,
            width,
            height,
            forced_png,
        })
    }
}

/// Synchronous decode from bytes (runs in spawn_blocking).
fn decode_sync(bytes: Vec<u8>, image_id: &str) -> PipelineResult<(DynamicImage, ImageFormat)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            image_id: image_id.to_string(),
            message: format!("Cannot detect image format: {e}"),
        })?;
    let format = reader.format().ok_or_else(|| PipelineError::Decode {
        image_id: image_id.to_string(),
        message: "Unknown image format".to_string(),
    })?;
    let image = reader.decode().map_err(|e| PipelineError::Decode {
        image_id: image_id.to_string(),
        message: e.to_string(),
    })?;
    Ok((image, format))
}

/// Map a detected input format to the closest export format. Formats we
/// cannot re-encode (gif, bmp, tiff, ...) fall back to PNG for previews.
fn export_format_for(format: ImageFormat) -> ExportFormat {
    match format {
        ImageFormat::Jpeg => ExportFormat::Jpeg,
        ImageFormat::WebP => ExportFormat::WebP,
        _ => ExportFormat::Png,
    }
}

/// Resolve the actual output format: alpha-preserving images force PNG so a
/// lossy encode cannot destroy the matte.
fn output_format(requested: ExportFormat, alpha_preserving: bool) -> (ExportFormat, bool) {
    if alpha_preserving && requested != ExportFormat::Png {
        (ExportFormat::Png, true)
    } else {
        (requested, false)
    }
}

impl From<&Preset> for AppliedPreset {
    fn from(preset: &Preset) -> Self {
        Self {
            name: preset.name.clone(),
            width: preset.width,
            height: preset.height,
            quality: preset.quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::presets::PresetCatalog;

    fn transcoder() -> ImageTranscoder {
        ImageTranscoder::new(LimitsConfig::default(), PreviewConfig::default())
    }

    /// Encode a solid-color RGBA test image to PNG bytes.
    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba(color));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_load_assigns_id_and_initial_preview() {
        let bytes = png_bytes(64, 48, [120, 130, 140, 255]);
        let image = transcoder()
            .load("shoe.png", "image/png", bytes)
            .await
            .unwrap();

        assert_eq!(image.id.len(), 16);
        assert_eq!((image.width, image.height), (64, 48));
        assert_eq!(image.source_format, ExportFormat::Png);
        assert!(!image.alpha_preserving);

        let preview = image.preview.as_ref().unwrap();
        assert_eq!(preview.format, ExportFormat::Png);
        assert!(!preview.bytes.is_empty());
        // 64x48 is already under the cap — no upscaling
        assert_eq!((preview.width, preview.height), (64, 48));
    }

    #[tokio::test]
    async fn test_load_rejects_undecodable_bytes() {
        let err = transcoder()
            .load("broken.png", "image/png", vec![0, 1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_preview_caps_large_images() {
        let bytes = png_bytes(2000, 1000, [50, 60, 70, 255]);
        let image = transcoder()
            .load("banner.png", "image/png", bytes)
            .await
            .unwrap();

        let out = transcoder()
            .preview(&image, &AdjustmentSet::default(), None)
            .await
            .unwrap();
        assert_eq!(out.width, 512);
        assert_eq!(out.height, 256);
    }

    #[tokio::test]
    async fn test_preview_never_upscales_small_images() {
        let bytes = png_bytes(64, 48, [50, 60, 70, 255]);
        let image = transcoder()
            .load("tiny.png", "image/png", bytes)
            .await
            .unwrap();

        let out = transcoder()
            .preview(&image, &AdjustmentSet::default(), None)
            .await
            .unwrap();
        assert_eq!((out.width, out.height), (64, 48));
    }

    #[tokio::test]
    async fn test_commit_honors_preset_dimensions() {
        let bytes = png_bytes(400, 200, [50, 60, 70, 255]);
        let image = transcoder()
            .load("wide.png", "image/png", bytes)
            .await
            .unwrap();

        let catalog = PresetCatalog::new();
        let preset = catalog.get("web-optimized").unwrap();
        let out = transcoder()
            .commit(
                &image,
                &AdjustmentSet::default(),
                Some(preset),
                ExportFormat::Jpeg,
                None,
            )
            .await
            .unwrap();

        // Aspect preserved: 1080 x (1080 * 200/400) = 1080 x 540
        assert_eq!(out.width, 1080);
        assert_eq!(out.height, 540);
        assert_eq!(out.format, ExportFormat::Jpeg);
        assert!(!out.forced_png);
        // JPEG magic
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_commit_fixed_height_preset() {
        let bytes = png_bytes(400, 200, [50, 60, 70, 255]);
        let image = transcoder()
            .load("wide.png", "image/png", bytes)
            .await
            .unwrap();

        let mut catalog = PresetCatalog::new();
        catalog.set_custom(300, Some(300), 80);
        let preset = catalog.get("custom").unwrap();
        let out = transcoder()
            .commit(
                &image,
                &AdjustmentSet::default(),
                Some(preset),
                ExportFormat::Png,
                None,
            )
            .await
            .unwrap();
        assert_eq!((out.width, out.height), (300, 300));
    }

    #[tokio::test]
    async fn test_alpha_preserving_forces_png() {
        let bytes = png_bytes(32, 32, [10, 20, 30, 0]);
        let mut image = transcoder()
            .load("matted.png", "image/png", bytes)
            .await
            .unwrap();
        image.alpha_preserving = true;

        let out = transcoder()
            .commit(
                &image,
                &AdjustmentSet::default(),
                None,
                ExportFormat::Jpeg,
                None,
            )
            .await
            .unwrap();
        assert_eq!(out.format, ExportFormat::Png);
        assert!(out.forced_png);
        // PNG magic
        assert_eq!(&out.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_commit_applies_adjustments_and_skips_transparent() {
        // Half the image is transparent; brightness must only move the
        // opaque half
        let mut img = RgbaImage::from_pixel(8, 8, image::Rgba([100, 100, 100, 255]));
        for y in 0..8 {
            for x in 0..4 {
                img.put_pixel(x, y, image::Rgba([100, 100, 100, 0]));
            }
        }
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();

        let mut image = transcoder()
            .load("half.png", "image/png", buffer.into_inner())
            .await
            .unwrap();
        image.alpha_preserving = true;

        let adj = AdjustmentSet {
            brightness: 50.0,
            ..Default::default()
        };
        let out = transcoder()
            .commit(&image, &adj, None, ExportFormat::Png, None)
            .await
            .unwrap();

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [100, 100, 100, 0]);
        assert_eq!(decoded.get_pixel(7, 7).0, [150, 150, 150, 255]);
    }

    #[tokio::test]
    async fn test_source_bytes_never_mutated() {
        let bytes = png_bytes(16, 16, [1, 2, 3, 255]);
        let image = transcoder()
            .load("still.png", "image/png", bytes.clone())
            .await
            .unwrap();

        let adj = AdjustmentSet {
            brightness: 99.0,
            ..Default::default()
        };
        let _ = transcoder().preview(&image, &adj, None).await.unwrap();
        let _ = transcoder()
            .commit(&image, &adj, None, ExportFormat::Png, None)
            .await
            .unwrap();
        assert_eq!(image.bytes, bytes);
    }

    #[test]
    fn test_export_format_mapping() {
        assert_eq!(export_format_for(ImageFormat::Jpeg), ExportFormat::Jpeg);
        assert_eq!(export_format_for(ImageFormat::WebP), ExportFormat::WebP);
        assert_eq!(export_format_for(ImageFormat::Gif), ExportFormat::Png);
    }

    #[test]
    fn test_output_format_forcing() {
        assert_eq!(
            output_format(ExportFormat::Jpeg, true),
            (ExportFormat::Png, true)
        );
        assert_eq!(
            output_format(ExportFormat::Png, true),
            (ExportFormat::Png, false)
        );
        assert_eq!(
            output_format(ExportFormat::WebP, false),
            (ExportFormat::WebP, false)
        );
    }
}
