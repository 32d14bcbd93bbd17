//! Descriptive-naming collaborator.
//!
//! Suggests human-readable export names ("oak-dining-chair") for a batch of
//! images. Naming never blocks the pipeline: any failure falls back to
//! positional names so every image always leaves with a usable export stem.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::config::{NamingConfig, RetryConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::types::SourceImage;

use super::resolve_env_var;
use super::retry::with_retry;

/// Interface for descriptive-naming services.
#[async_trait]
pub trait NamingProvider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Suggest one name per input image, in input order.
    async fn suggest(&self, images: &[SourceImage]) -> PipelineResult<Vec<String>>;
}

#[derive(Serialize)]
struct NamingRequest {
    locale: String,
    images: Vec<NamingImage>,
}

#[derive(Serialize)]
struct NamingImage {
    id: String,
    media_type: String,
    /// Base64-encoded thumbnail when one exists, otherwise the source bytes
    data: String,
}

#[derive(Deserialize)]
struct NamingResponse {
    names: Vec<String>,
}

/// HTTP naming provider speaking a small JSON protocol.
pub struct HttpNamingProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    locale: String,
}

impl HttpNamingProvider {
    pub fn new(config: &NamingConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: resolve_env_var(&config.api_key),
            locale: config.locale.clone(),
        }
    }
}

#[async_trait]
impl NamingProvider for HttpNamingProvider {
    fn name(&self) -> &str {
        "http-naming"
    }

    async fn suggest(&self, images: &[SourceImage]) -> PipelineResult<Vec<String>> {
        let request = NamingRequest {
            locale: self.locale.clone(),
            images: images
                .iter()
                .map(|image| {
                    // Thumbnails keep the payload small; naming does not
                    // need full resolution
                    let (data, media_type) = match &image.preview {
                        Some(preview) => (
                            BASE64.encode(&preview.bytes),
                            preview.format.media_type().to_string(),
                        ),
                        None => (BASE64.encode(&image.bytes), image.media_type.clone()),
                    };
                    NamingImage {
                        id: image.id.clone(),
                        media_type,
                        data,
                    }
                })
                .collect(),
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| PipelineError::Naming {
            message: e.to_string(),
            status_code: e.status().map(|s| s.as_u16()),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Naming {
                message: format!("HTTP {}: {}", status.as_u16(), body),
                status_code: Some(status.as_u16()),
            });
        }

        let parsed: NamingResponse =
            response.json().await.map_err(|e| PipelineError::Naming {
                message: format!("Invalid naming response: {e}"),
                status_code: None,
            })?;
        Ok(parsed.names)
    }
}

/// Assign display names to every unnamed image, in order.
///
/// Images that already carry a display name keep it. For the rest, the
/// provider's suggestions apply where available and valid; any image the
/// provider could not name (or every image, when the whole call fails) gets
/// the positional fallback `product-{n}` with a 1-based index.
pub async fn assign_names(
    provider: Option<&dyn NamingProvider>,
    images: &mut [SourceImage],
    retry: &RetryConfig,
) {
    let suggestions = match provider {
        Some(provider) => match with_retry(retry, || provider.suggest(images)).await {
            Ok(names) => names,
            Err(error) => {
                tracing::warn!("Naming failed, using positional fallback: {error}");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let mut seen: Vec<String> = Vec::new();
    for (index, image) in images.iter_mut().enumerate() {
        // Names the user already chose stay; they still count for collisions
        if let Some(existing) = image.display_name.as_deref().filter(|n| !n.is_empty()) {
            seen.push(existing.to_string());
            continue;
        }
        let suggested = suggestions.get(index).map(|s| slugify(s)).filter(|s| !s.is_empty());
        let mut name = suggested.unwrap_or_else(|| format!("product-{}", index + 1));

        // Distinct images must not collide on export
        if seen.contains(&name) {
            let mut suffix = 2;
            while seen.contains(&format!("{name}-{suffix}")) {
                suffix += 1;
            }
            name = format!("{name}-{suffix}");
        }
        seen.push(name.clone());
        image.display_name = Some(name);
    }
}

/// Reduce a suggested name to a safe file stem: lowercase alphanumerics and
/// single hyphens, nothing else.
fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
