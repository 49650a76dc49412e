// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use reqwest::Url;
use std::env;
use std::time::Duration;

/// Public endpoint of the comic hot-counter worker
pub const DEFAULT_BASE_URL: &str = "https://comic-hot-counter.zhouguangzheng.workers.dev";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for the counter client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the counter service
    pub base_url: String,
    /// Request timeout; `None` leaves it to the transport
    pub timeout: Option<Duration>,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            https_proxy: None,
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::read_env();
        config.validate()?;
        Ok(config)
    }

    /// Reads environment variables without validating them, so hosts can
    /// apply their own overrides before [`validate`](Self::validate).
    pub fn read_env() -> Self {
        let base_url = env::var("COMIC_STATS_URL")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = env::var("COMIC_STATS_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let https_proxy = env::var("COMIC_STATS_PROXY_HTTPS")
            .or_else(|_| env::var("HTTPS_PROXY"))
            .ok();
        let log_level = env::var("COMIC_STATS_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());

        Self {
            base_url,
            timeout,
            https_proxy,
            log_level,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;

        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Parses `base_url`, which must be an http(s) URL.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.base_url.trim()).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid(format!(
                "Unsupported base URL scheme '{scheme}', expected http or https"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BaseUrl { .. })
        ));

        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = ClientConfig {
            timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = ClientConfig {
            log_level: "verbose".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        env::remove_var("COMIC_STATS_URL");
        env::remove_var("COMIC_STATS_TIMEOUT_SECS");
        env::remove_var("COMIC_STATS_PROXY_HTTPS");
        env::remove_var("HTTPS_PROXY");
        env::remove_var("COMIC_STATS_LOG_LEVEL");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        env::set_var("COMIC_STATS_URL", " http://localhost:8787/api ");
        env::set_var("COMIC_STATS_TIMEOUT_SECS", "5");
        env::set_var("COMIC_STATS_PROXY_HTTPS", "http://proxy.local:3128");
        env::set_var("COMIC_STATS_LOG_LEVEL", "DEBUG");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:8787/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            config.https_proxy.as_deref(),
            Some("http://proxy.local:3128")
        );
        assert_eq!(config.log_level, "debug");

        env::remove_var("COMIC_STATS_URL");
        env::remove_var("COMIC_STATS_TIMEOUT_SECS");
        env::remove_var("COMIC_STATS_PROXY_HTTPS");
        env::remove_var("COMIC_STATS_LOG_LEVEL");
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_unparsable_timeout() {
        env::set_var("COMIC_STATS_TIMEOUT_SECS", "soon");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.timeout, None);
        env::remove_var("COMIC_STATS_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_read_env_does_not_validate() {
        env::set_var("COMIC_STATS_URL", "not a url");
        let config = ClientConfig::read_env();
        assert_eq!(config.base_url, "not a url");
        assert!(config.validate().is_err());
        assert!(ClientConfig::from_env().is_err());
        env::remove_var("COMIC_STATS_URL");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_log_level() {
        env::set_var("COMIC_STATS_LOG_LEVEL", "loud");
        assert!(ClientConfig::from_env().is_err());
        env::remove_var("COMIC_STATS_LOG_LEVEL");
    }
}
