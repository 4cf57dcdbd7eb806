//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProfilerConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::ProfilerConfig;

/// Upper bound for `captured_body_length`.
pub const MAX_CAPTURED_BODY_LENGTH: usize = 1024 * 1024;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A semantic problem in an otherwise well-formed configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("profiling.captured_body_length {size} exceeds maximum {max}")]
    BodyLengthTooLarge { size: usize, max: usize },
}

pub fn validate_config(config: &ProfilerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.profiling.captured_body_length > MAX_CAPTURED_BODY_LENGTH {
        errors.push(ValidationError::BodyLengthTooLarge {
            size: config.profiling.captured_body_length,
            max: MAX_CAPTURED_BODY_LENGTH,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
