//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;

/// Default Maven Central search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://search.maven.org/solrsearch/select";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Search service settings.
    #[serde(default)]
    pub maven: MavenConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.maven.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid maven.base_url '{url}'. Must be an http(s) URL"),
            });
        }

        if self.maven.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "maven.timeout_secs must be greater than zero".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid logging.level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Maven Central search service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MavenConfig {
    /// Full URL of the Solr select endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// `User-Agent` header sent with every search request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds. Unset means the HTTP client's defaults.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for MavenConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.maven.base_url, DEFAULT_BASE_URL);
        assert!(config.maven.timeout_secs.is_none());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "maven": {
                "base_url": "http://localhost:8080/solrsearch/select",
                "user_agent": "test-agent/1.0",
                "timeout_secs": 10
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.maven.base_url,
            "http://localhost:8080/solrsearch/select"
        );
        assert_eq!(config.maven.user_agent, "test-agent/1.0");
        assert_eq!(config.maven.timeout_secs, Some(10));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn example_config_is_valid() {
        let config: Config =
            serde_json::from_str(include_str!("../../config/example-config.json")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.maven.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn maven_config_defaults() {
        let config = MavenConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.starts_with("maven-version-mcp/"));
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_non_http_base_url() {
        let json = r#"{ "maven": { "base_url": "ftp://example.com/select" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_timeout() {
        let json = r#"{ "maven": { "timeout_secs": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_log_level() {
        let json = r#"{ "logging": { "level": "verbose" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
