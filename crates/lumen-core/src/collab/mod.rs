//! Optional external collaborators: background matting and descriptive
//! naming.
//!
//! Both are best-effort. The pipeline is fully functional with neither
//! configured, and a collaborator failure degrades to the unassisted path
//! instead of failing the batch.

pub mod matting;
pub mod naming;
pub mod retry;

pub use matting::{apply_matting, BackgroundMatting, HttpMattingProvider};
pub use naming::{assign_names, HttpNamingProvider, NamingProvider};

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }
}
