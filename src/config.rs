//! Configuration management for the service check

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::errors::{CheckError, Result};
use crate::health::ReasonMatcher;
use crate::services::ServiceFamily;

pub const PLUGIN_NAME: &str = "openstack-service-check";

/// Check OpenStack service states
#[derive(Debug, Clone, Parser)]
#[command(name = PLUGIN_NAME, version)]
pub struct Config {
    /// Cloud used to access openstack API
    #[arg(short, long, env = "OS_CLOUD", default_value = "monitoring")]
    pub cloud: String,

    /// Clouds.yaml file path
    #[arg(long, env = "OS_CLIENT_CONFIG_FILE")]
    pub os_config_file: Option<PathBuf>,

    /// Service to check
    #[arg(short, long, value_enum, default_value_t = ServiceFamily::Compute)]
    pub service: ServiceFamily,

    /// Critical error from disabled reason (regexp), may be repeated
    #[arg(short = 'r', long = "critical-reason")]
    pub critical_disabled_reason: Vec<String>,

    /// Debug API calls
    #[arg(short, long)]
    pub debug: bool,

    /// Overall deadline for the check, in seconds
    #[arg(short, long, env = "CHECK_TIMEOUT_SECONDS", default_value_t = 60)]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cloud: "monitoring".to_string(),
            os_config_file: None,
            service: ServiceFamily::Compute,
            critical_disabled_reason: Vec::new(),
            debug: false,
            timeout: 60,
        }
    }
}

impl Config {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Validate the configuration and compile the disabled-reason patterns.
    pub fn validate(&self) -> Result<ReasonMatcher> {
        if self.cloud.is_empty() {
            return Err(CheckError::Config("cloud cannot be empty".to_string()));
        }

        if self.timeout == 0 {
            return Err(CheckError::Config(
                "timeout must be greater than 0".to_string(),
            ));
        }

        ReasonMatcher::compile(&self.critical_disabled_reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from([
            PLUGIN_NAME,
            "-c",
            "prod",
            "--service",
            "sharev2",
            "-r",
            "bar",
            "--critical-reason",
            "foo.*",
            "-d",
            "--timeout",
            "15",
        ])
        .unwrap();

        assert_eq!(config.cloud, "prod");
        assert_eq!(config.service, ServiceFamily::Share);
        assert_eq!(config.critical_disabled_reason, vec!["bar", "foo.*"]);
        assert!(config.debug);
        assert_eq!(config.deadline(), Duration::from_secs(15));
        assert_eq!(config.validate().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_service_is_rejected() {
        let err = Config::try_parse_from([PLUGIN_NAME, "-s", "identity"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_help_is_not_a_rejection() {
        let err = Config::try_parse_from([PLUGIN_NAME, "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_bad_pattern_fails_validation() {
        let config = Config {
            critical_disabled_reason: vec!["(".to_string()],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CheckError::Pattern { .. })
        ));
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CheckError::Config(_))));
    }
}
