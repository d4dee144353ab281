//! Error types for maven-version-mcp.
//!
//! Protocol-level failures (unknown tool, malformed arguments) are not Rust
//! errors: they are [`JsonRpcError`](crate::mcp::JsonRpcError) values sent
//! back to the client. The types here cover configuration loading and the
//! search service.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors returned by a search service.
///
/// The split matters: [`SearchError::Upstream`] is reported to the client as
/// tool content with the error flag set, while [`SearchError::Unexpected`]
/// escapes the tool handler and becomes a JSON-RPC internal error.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The registry answered with an HTTP error, or the request never got an
    /// answer (connection refused, DNS failure, timeout).
    #[error("{message}")]
    Upstream {
        /// Server-provided message, or the HTTP client's own description.
        message: String,
    },

    /// Anything else: undecodable bodies, documents missing fields, etc.
    #[error("unexpected search failure: {0}")]
    Unexpected(String),
}

impl SearchError {
    /// Creates an upstream error from any displayable message.
    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// Errors raised while building the HTTP search client.
#[derive(Error, Debug)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] pub reqwest::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn upstream_error_displays_bare_message() {
        let error = SearchError::upstream("bad query");
        assert_eq!(error.to_string(), "bad query");
    }

    #[test]
    fn unexpected_error_is_prefixed() {
        let error = SearchError::Unexpected("missing field `v`".to_string());
        assert!(error.to_string().starts_with("unexpected search failure"));
    }
}
