//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// Preview rendering settings.
///
/// Previews always render at a fixed small cap, independent of the selected
/// preset, purely for speed; only the commit path honors preset dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Longest edge of the preview thumbnail in pixels (never upscaled)
    pub max_edge: u32,

    /// Delay before a debounced preview pass starts, in milliseconds
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_edge: 512,
            debounce_ms: 150,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Collaborator call timeout in milliseconds
    pub collaborator_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            collaborator_timeout_ms: 60000,
        }
    }
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default output format ("jpg", "png", or "webp")
    pub format: String,

    /// Supported input extensions for discovery
    pub supported_formats: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "jpg".to_string(),
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Retry policy for transient collaborator failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Max retry attempts for transient failures
    pub attempts: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// Collaborator endpoint configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Background-matting service
    pub matting: Option<MattingConfig>,

    /// Descriptive-naming service
    pub naming: Option<NamingConfig>,
}

/// Background-matting service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MattingConfig {
    /// Service endpoint
    pub endpoint: String,
}

impl Default for MattingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7860/remove-background".to_string(),
        }
    }
}

/// Descriptive-naming service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Service endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Locale passed to the naming service
    pub locale: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7861/suggest-names".to_string(),
            api_key: "${LUMEN_NAMING_API_KEY}".to_string(),
            locale: "en".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
