//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.preview.max_edge == 0 {
            return Err(ConfigError::ValidationError(
                "preview.max_edge must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.collaborator_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.collaborator_timeout_ms must be > 0".into(),
            ));
        }
        if self.export.format.parse::<crate::types::ExportFormat>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "export.format must be jpg, png, or webp (got {:?})",
                self.export.format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_preview_edge() {
        let mut config = Config::default();
        config.preview.max_edge = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_edge"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_unknown_export_format() {
        let mut config = Config::default();
        config.export.format = "avif".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("export.format"));
    }
}
