//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Trace collection settings.
    pub profiling: ProfilingConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Trace collection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Wrap client pipelines with the profiling decorators.
    pub enabled: bool,

    /// Maximum number of body characters kept in formatted messages.
    /// `0` keeps no body at all.
    pub captured_body_length: usize,

    /// Record each request as a curl command.
    pub capture_curl_command: bool,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            captured_body_length: 0,
            capture_curl_command: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Record profiler metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
        }
    }
}
