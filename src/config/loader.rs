//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProfilerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProfilerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProfilerConfig, ConfigError> {
    let config: ProfilerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ProfilerConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = parse_config(
            r#"
            [profiling]
            captured_body_length = 256

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(config.profiling.enabled);
        assert_eq!(config.profiling.captured_body_length, 256);
        assert!(config.profiling.capture_curl_command);
        assert_eq!(config.observability.log_level, "debug");
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[profiling]\nenabled = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config("[observability]\nlog_level = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "plugin_profiler_config_{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[profiling]\nenabled = false\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(!config.profiling.enabled);

        std::fs::remove_file(&path).unwrap_or_default();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
