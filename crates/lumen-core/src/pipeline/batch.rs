//! Batch coordination across the image collection.
//!
//! One adjustment set and one preset apply uniformly to every targeted image.
//! Images render concurrently but results land back in collection order, and
//! a failure on one image never aborts the rest: it is recorded against that
//! image's id and the batch moves on.

use futures_util::stream::{self, StreamExt};

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::{AdjustmentSet, EncodedOutput, ExportFormat, SourceImage, WatermarkSettings};

use super::presets::Preset;
use super::transcode::ImageTranscoder;

/// Images rendered in flight at once.
const DEFAULT_CONCURRENCY: usize = 4;

/// Everything a batch pass needs besides the images themselves.
#[derive(Debug, Clone)]
pub struct BatchContext {
    /// Slider values applied to every targeted image
    pub adjustments: AdjustmentSet,

    /// Size preset for the commit path; previews ignore it
    pub preset: Option<Preset>,

    /// Id of the currently selected image
    pub selected_id: Option<String>,

    /// When true every image is targeted; otherwise only the selected one
    pub apply_to_all: bool,

    /// Requested output format (may be overridden to PNG per image)
    pub format: ExportFormat,

    /// Optional watermark composited after adjustments
    pub watermark: Option<WatermarkSettings>,
}

impl BatchContext {
    /// Whether this pass targets the given image.
    pub fn targets(&self, image: &SourceImage) -> bool {
        self.apply_to_all || self.selected_id.as_deref() == Some(&image.id)
    }
}

/// One per-image failure, reported without aborting the batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub image_id: String,
    pub error: PipelineError,
}

/// Result of a batch pass: ids that rendered, in collection order, plus the
/// failures that were isolated along the way.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub processed: Vec<String>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs preview and commit passes over the whole collection.
pub struct BatchCoordinator {
    transcoder: ImageTranscoder,
    concurrency: usize,
}

impl BatchCoordinator {
    pub fn new(config: &Config) -> Self {
        Self {
            transcoder: ImageTranscoder::new(config.limits.clone(), config.preview.clone()),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn transcoder(&self) -> &ImageTranscoder {
        &self.transcoder
    }

    /// Regenerate thumbnail previews for every targeted image.
    pub async fn run_preview(
        &self,
        images: &mut [SourceImage],
        ctx: &BatchContext,
    ) -> BatchOutcome {
        let results = self
            .render(images, ctx, |image| {
                self.transcoder
                    .preview(image, &ctx.adjustments, ctx.watermark.as_ref())
            })
            .await;

        let mut outcome = BatchOutcome::default();
        for (idx, result) in results {
            let image = &mut images[idx];
            match result {
                Ok(output) => {
                    image.preview = Some(output);
                    outcome.processed.push(image.id.clone());
                }
                Err(error) => outcome.failures.push(BatchFailure {
                    image_id: image.id.clone(),
                    error,
                }),
            }
        }
        outcome
    }

    /// Render full-resolution outputs for every targeted image at the
    /// context's preset and format.
    pub async fn run_commit(
        &self,
        images: &mut [SourceImage],
        ctx: &BatchContext,
    ) -> BatchOutcome {
        let results = self
            .render(images, ctx, |image| {
                self.transcoder.commit(
                    image,
                    &ctx.adjustments,
                    ctx.preset.as_ref(),
                    ctx.format,
                    ctx.watermark.as_ref(),
                )
            })
            .await;

        let mut outcome = BatchOutcome::default();
        for (idx, result) in results {
            let image = &mut images[idx];
            match result {
                Ok(output) => {
                    if output.forced_png {
                        tracing::debug!("Forced PNG output for alpha-preserving {}", image.id);
                    }
                    image.full = Some(output);
                    image.applied_preset = ctx.preset.as_ref().map(Into::into);
                    outcome.processed.push(image.id.clone());
                }
                Err(error) => {
                    tracing::warn!("Image {} failed: {}", image.id, error);
                    outcome.failures.push(BatchFailure {
                        image_id: image.id.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Render targeted images with bounded concurrency, yielding results in
    /// collection order.
    async fn render<'a, F, Fut>(
        &self,
        images: &'a [SourceImage],
        ctx: &BatchContext,
        render_one: F,
    ) -> Vec<(usize, Result<EncodedOutput, PipelineError>)>
    where
        F: Fn(&'a SourceImage) -> Fut,
        Fut: std::future::Future<Output = Result<EncodedOutput, PipelineError>>,
    {
        let targeted: Vec<usize> = images
            .iter()
            .enumerate()
            .filter(|(_, img)| ctx.targets(img))
            .map(|(idx, _)| idx)
            .collect();

        stream::iter(targeted)
            .map(|idx| {
                let fut = render_one(&images[idx]);
                async move { (idx, fut.await) }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
