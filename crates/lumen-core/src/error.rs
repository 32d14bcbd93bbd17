//! Error types for the Lumen batch photo pipeline.
//!
//! Per-image failures carry the image id so the coordinator can report them
//! as a side channel without aborting the rest of the batch.

use thiserror::Error;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, keyed by image id where one exists.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image decoding failed
    #[error("Decode error for image {image_id}: {message}")]
    Decode { image_id: String, message: String },

    /// Re-encoding to the requested output format failed
    #[error("Encode error for image {image_id} ({format}): {message}")]
    Encode {
        image_id: String,
        format: String,
        message: String,
    },

    /// Background matting collaborator failed
    #[error("Matting error for image {image_id}: {message}")]
    Matting {
        image_id: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Descriptive-naming collaborator failed
    #[error("Naming error: {message}")]
    Naming {
        message: String,
        status_code: Option<u16>,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for image {image_id} after {timeout_ms}ms")]
    Timeout {
        image_id: String,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {file_name} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        file_name: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {file_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        file_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {file_name}: {format}")]
    UnsupportedFormat { file_name: String, format: String },

    /// Archive packaging failed
    #[error("Archive error: {0}")]
    Archive(String),
}

impl PipelineError {
    /// The id of the image this error belongs to, when it is per-image.
    pub fn image_id(&self) -> Option<&str> {
        match self {
            PipelineError::Decode { image_id, .. }
            | PipelineError::Encode { image_id, .. }
            | PipelineError::Matting { image_id, .. }
            | PipelineError::Timeout { image_id, .. } => Some(image_id),
            _ => None,
        }
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
