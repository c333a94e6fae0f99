//! Error types for the service check

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::timestamp::TimestampError;

pub type Result<T> = std::result::Result<T, CheckError>;

/// Every variant is an operational failure and maps to an UNKNOWN verdict.
/// Unhealthy services are not errors; they surface as findings.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Invalid flag or option value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The command line could not be parsed
    #[error("Invalid arguments: {0}")]
    Args(String),

    /// A disabled-reason pattern did not compile
    #[error("Failed to compile regexp: {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// clouds.yaml could not be located or lacks the requested cloud
    #[error("Clouds file error: {0}")]
    CloudsFile(String),

    /// IO operation failed
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keystone rejected the credentials or returned no usable token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The service catalog has no endpoint for the requested service
    #[error("No {interface} endpoint for service type {service_types:?}{}", region_suffix(.region))]
    Endpoint {
        service_types: Vec<String>,
        interface: String,
        region: Option<String>,
    },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Check timed out after {0:?}")]
    Timeout(Duration),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimestampError),
}

fn region_suffix(region: &Option<String>) -> String {
    match region {
        Some(region) => format!(" in region {}", region),
        None => String::new(),
    }
}

impl From<clap::Error> for CheckError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let first = rendered
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();
        CheckError::Args(first.trim_start_matches("error: ").trim().to_string())
    }
}

impl CheckError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CheckError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_error_message() {
        let err = CheckError::Endpoint {
            service_types: vec!["compute".to_string()],
            interface: "public".to_string(),
            region: Some("RegionOne".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "No public endpoint for service type [\"compute\"] in region RegionOne"
        );

        let err = CheckError::Endpoint {
            service_types: vec!["network".to_string()],
            interface: "internal".to_string(),
            region: None,
        };
        assert_eq!(
            err.to_string(),
            "No internal endpoint for service type [\"network\"]"
        );
    }

    #[test]
    fn test_clap_error_keeps_first_line() {
        let err = clap::Error::raw(
            clap::error::ErrorKind::InvalidValue,
            "invalid value 'abc' for '--timeout <TIMEOUT>'\n\n\
             For more information, try '--help'.\n",
        );
        let err = CheckError::from(err);
        assert_eq!(
            err.to_string(),
            "Invalid arguments: invalid value 'abc' for '--timeout <TIMEOUT>'"
        );
    }

    #[test]
    fn test_pattern_error_names_pattern() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = CheckError::Pattern {
            pattern: "(unclosed".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("Failed to compile regexp: (unclosed: "));
    }
}
