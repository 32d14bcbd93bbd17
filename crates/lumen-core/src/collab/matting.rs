//! Background-matting collaborator.
//!
//! The matting service receives the original image and returns a PNG with the
//! background removed. On success the image's working bytes are substituted
//! and the image becomes alpha-preserving; on failure the image is left
//! exactly as it was.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{MattingConfig, RetryConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::types::{ExportFormat, SourceImage};

use super::retry::with_retry;

/// Interface for background-removal services.
#[async_trait]
pub trait BackgroundMatting: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Remove the background, returning PNG bytes with a real alpha channel.
    async fn matte(&self, image: &SourceImage) -> PipelineResult<Vec<u8>>;
}

/// HTTP matting provider: posts the raw image body, expects PNG bytes back.
pub struct HttpMattingProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMattingProvider {
    pub fn new(config: &MattingConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: config.endpoint.clone(),
        }
    }
}

#[async_trait]
impl BackgroundMatting for HttpMattingProvider {
    fn name(&self) -> &str {
        "http-matting"
    }

    async fn matte(&self, image: &SourceImage) -> PipelineResult<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, image.media_type.clone())
            .body(image.bytes.clone())
            .send()
            .await
            .map_err(|e| PipelineError::Matting {
                image_id: image.id.clone(),
                message: e.to_string(),
                status_code: e.status().map(|s| s.as_u16()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Matting {
                image_id: image.id.clone(),
                message: format!("HTTP {}: {}", status.as_u16(), body),
                status_code: Some(status.as_u16()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Matting {
                image_id: image.id.clone(),
                message: format!("Failed to read matting response: {e}"),
                status_code: None,
            })?;
        Ok(bytes.to_vec())
    }
}

/// Run matting for one image and substitute its working source on success.
///
/// The id, original file name, and original dimensions stay fixed; the
/// working bytes become the matted PNG and the image is marked
/// alpha-preserving, which forces PNG on export and makes every transform
/// stage skip fully transparent pixels. Stale renders are dropped so the
/// next pass regenerates from the matted source.
pub async fn apply_matting(
    provider: &dyn BackgroundMatting,
    image: &mut SourceImage,
    retry: &RetryConfig,
) -> PipelineResult<()> {
    let matted = with_retry(retry, || provider.matte(image)).await?;

    image.bytes = matted;
    image.media_type = "image/png".to_string();
    image.source_format = ExportFormat::Png;
    image.alpha_preserving = true;
    image.preview = None;
    image.full = None;

    tracing::info!("Background removed for {} via {}", image.id, provider.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMatting(Vec<u8>);

    #[async_trait]
    impl BackgroundMatting for FixedMatting {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn matte(&self, _image: &SourceImage) -> PipelineResult<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingMatting;

    #[async_trait]
    impl BackgroundMatting for FailingMatting {
        fn name(&self) -> &str {
            "failing"
        }

        async fn matte(&self, image: &SourceImage) -> PipelineResult<Vec<u8>> {
            Err(PipelineError::Matting {
                image_id: image.id.clone(),
                message: "HTTP 400: no subject detected".to_string(),
                status_code: Some(400),
            })
        }
    }

    fn sample_image() -> SourceImage {
        let mut image = SourceImage::new(
            "lamp.jpg",
            "image/jpeg",
            vec![1, 2, 3, 4],
            ExportFormat::Jpeg,
            640,
            480,
        );
        image.full = Some(crate::types::EncodedOutput {
            bytes: vec![9],
            format: ExportFormat::Jpeg,
            width: 640,
            height: 480,
            forced_png: false,
        });
        image
    }

    #[tokio::test]
    async fn test_success_substitutes_source_and_marks_alpha() {
        let mut image = sample_image();
        let original_id = image.id.clone();

        apply_matting(
            &FixedMatting(vec![0x89, b'P', b'N', b'G']),
            &mut image,
            &RetryConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(image.id, original_id);
        assert_eq!(image.file_name, "lamp.jpg");
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.source_format, ExportFormat::Png);
        assert!(image.alpha_preserving);
        // Stale renders dropped
        assert!(image.preview.is_none());
        assert!(image.full.is_none());
    }

    #[tokio::test]
    async fn test_failure_leaves_image_untouched() {
        let mut image = sample_image();
        let before_bytes = image.bytes.clone();

        let err = apply_matting(&FailingMatting, &mut image, &RetryConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Matting { .. }));
        assert_eq!(image.bytes, before_bytes);
        assert!(!image.alpha_preserving);
        assert_eq!(image.source_format, ExportFormat::Jpeg);
        assert!(image.full.is_some());
    }
}
