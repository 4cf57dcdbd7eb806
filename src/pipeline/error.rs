//! Pipeline error taxonomy.

use thiserror::Error;

use crate::collector::TraceError;
use crate::message::Response;

/// Errors produced by a plugin pipeline.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The request could not be transferred (connection, DNS, timeout).
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// The transfer succeeded but the response is considered an error.
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        response: Box<Response>,
    },

    /// Any other failure raised by a plugin.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),

    /// Profiler wiring error.
    #[error(transparent)]
    Trace(#[from] TraceError),
}

impl PluginError {
    /// Short name of the error kind, used in rendered failures and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PluginError::Transfer(_) => "transfer",
            PluginError::Http { .. } => "http",
            PluginError::Other(_) => "other",
            PluginError::Trace(_) => "trace",
        }
    }

    /// Response attached to the error, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            PluginError::Http { response, .. } => Some(&**response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_error_display() {
        let err = PluginError::Transfer("connection reset".into());
        assert_eq!(err.to_string(), "Transfer error: connection reset");
        assert_eq!(err.kind(), "transfer");
        assert!(err.response().is_none());

        let response = http::Response::builder()
            .status(503)
            .body(Bytes::new())
            .unwrap();
        let err = PluginError::Http {
            message: "unavailable".into(),
            response: Box::new(response),
        };
        assert_eq!(err.to_string(), "HTTP error: unavailable");
        assert_eq!(err.response().map(|r| r.status().as_u16()), Some(503));
    }

    #[test]
    fn test_trace_error_is_transparent() {
        let err = PluginError::from(TraceError::EmptyChain);
        assert_eq!(err.to_string(), TraceError::EmptyChain.to_string());
        assert_eq!(err.kind(), "trace");
    }
}
