// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Service configuration
//!
//! Raw [`ServiceSettings`] are loaded with the `config` crate and validated
//! once into an immutable [`ServiceConfig`] that every in-flight call shares.

use std::{path::Path, time::Duration};

use anyhow::{Result, ensure};
use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::non_empty_string::NonEmptyString;

/// Default endpoint of the visual recognition service
pub const DEFAULT_SERVICE_URL: &str = "https://gateway-a.watsonplatform.net/visual-recognition/api";

/// API version date supported by this client
pub const VERSION_DATE_2016_05_20: &str = "2016-05-20";

/// Prefix of the environment variables read by [`ServiceSettings::load`]
pub const ENV_PREFIX: &str = "VISUAL_RECOGNITION";

/// Errors raised while building a [`ServiceConfig`]
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigurationError {
    /// The mandatory API version date is absent
    #[error("version_date was not specified, use VERSION_DATE_2016_05_20")]
    MissingVersionDate,

    /// The service URL cannot be used as a base URL
    #[error("invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request timeout is out of range
    #[error("invalid timeout: {message}")]
    InvalidTimeout { message: String },

    /// Sources could not be read or deserialized
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),
}

/// A validated request timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within 1..=300
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Timeout as a duration
    pub fn value(&self) -> Duration {
        self.0
    }

    /// Timeout in whole seconds
    pub fn seconds(&self) -> u64 {
        self.0.as_secs()
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self(Duration::from_secs(30))
    }
}

/// Unvalidated service settings as read from files and the environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceSettings {
    /// Service base URL, defaults to [`DEFAULT_SERVICE_URL`]
    pub url: Option<String>,
    /// API key sent as the `api_key` query parameter
    pub api_key: Option<String>,
    /// API version date sent as the `version` query parameter
    pub version_date: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

impl ServiceSettings {
    /// Load settings from `visual_recognition.json` (if present) and
    /// `VISUAL_RECOGNITION_*` environment variables
    ///
    /// Environment variables override the file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_layers(
            File::new("visual_recognition", FileFormat::Json).required(false),
            environment(),
        )
    }

    /// Load settings from an explicit file, format inferred from its extension,
    /// with `VISUAL_RECOGNITION_*` environment variables layered on top
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_layers(File::from(path.as_ref()), environment())
    }

    fn load_layers<S>(file: S, env: Environment) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

/// Validated, read-only service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    base_url: Url,
    api_key: Option<NonEmptyString>,
    version_date: NonEmptyString,
    timeout: TimeoutSeconds,
}

impl ServiceConfig {
    /// Configuration for the default endpoint with the given version date
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingVersionDate`] if the date is blank
    pub fn new(version_date: impl Into<String>) -> Result<Self, ConfigurationError> {
        Self::from_settings(ServiceSettings {
            version_date: Some(version_date.into()),
            ..ServiceSettings::default()
        })
    }

    /// Validate raw settings
    ///
    /// # Errors
    ///
    /// Returns an error if the version date is missing or blank, the URL is
    /// not an absolute http(s) URL, or the timeout is out of range
    pub fn from_settings(settings: ServiceSettings) -> Result<Self, ConfigurationError> {
        let version_date = settings
            .version_date
            .and_then(|date| NonEmptyString::new(date).ok())
            .ok_or(ConfigurationError::MissingVersionDate)?;

        let raw_url = settings
            .url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let base_url = parse_base_url(&raw_url)?;

        let timeout = match settings.timeout_seconds {
            Some(seconds) => {
                TimeoutSeconds::new(seconds).map_err(|e| ConfigurationError::InvalidTimeout {
                    message: e.to_string(),
                })?
            }
            None => TimeoutSeconds::default(),
        };

        Ok(Self {
            base_url,
            api_key: settings.api_key.and_then(|key| NonEmptyString::new(key).ok()),
            version_date,
            timeout,
        })
    }

    /// Load and validate settings from the default file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the settings are invalid
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_settings(ServiceSettings::load()?)
    }

    /// Replace the base URL
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidUrl`] if the URL cannot be used as a base
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigurationError> {
        self.base_url = parse_base_url(url)?;
        Ok(self)
    }

    /// Set the API key; a blank key clears it
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = NonEmptyString::new(api_key).ok();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: TimeoutSeconds) -> Self {
        self.timeout = timeout;
        self
    }

    /// Service base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(NonEmptyString::as_str)
    }

    /// API version date
    pub fn version_date(&self) -> &str {
        self.version_date.as_str()
    }

    /// Request timeout
    pub fn timeout(&self) -> TimeoutSeconds {
        self.timeout
    }

    /// Query parameters added to every request
    pub fn default_query(&self) -> Vec<(&'static str, &str)> {
        let mut query = vec![("version", self.version_date())];
        if let Some(api_key) = self.api_key() {
            query.push(("api_key", api_key));
        }
        query
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_version_date_is_fatal() {
        let result = ServiceConfig::from_settings(ServiceSettings::default());
        assert!(matches!(result, Err(ConfigurationError::MissingVersionDate)));

        let blank = ServiceConfig::new("   ");
        assert!(matches!(blank, Err(ConfigurationError::MissingVersionDate)));
    }

    #[test]
    fn defaults_applied() {
        let config = ServiceConfig::new(VERSION_DATE_2016_05_20).unwrap();

        assert_eq!(config.base_url().as_str(), DEFAULT_SERVICE_URL);
        assert_eq!(config.version_date(), "2016-05-20");
        assert!(config.api_key().is_none());
        assert_eq!(config.timeout().seconds(), 30);
        assert_eq!(config.default_query(), vec![("version", "2016-05-20")]);
    }

    #[test]
    fn api_key_joins_default_query() {
        let config = ServiceConfig::new(VERSION_DATE_2016_05_20)
            .unwrap()
            .with_api_key("secret");

        assert_eq!(
            config.default_query(),
            vec![("version", "2016-05-20"), ("api_key", "secret")]
        );

        let cleared = config.with_api_key("  ");
        assert!(cleared.api_key().is_none());
    }

    #[test]
    fn invalid_urls_rejected() {
        let config = ServiceConfig::new(VERSION_DATE_2016_05_20).unwrap();

        assert!(matches!(
            config.clone().with_base_url("not a url"),
            Err(ConfigurationError::InvalidUrl { .. })
        ));
        assert!(matches!(
            config.clone().with_base_url("ftp://example.com/api"),
            Err(ConfigurationError::InvalidUrl { .. })
        ));
        assert!(config.with_base_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn timeout_validation() {
        assert!(TimeoutSeconds::new(0).is_err());
        assert!(TimeoutSeconds::new(301).is_err());
        assert!(TimeoutSeconds::new(1).is_ok());
        assert!(TimeoutSeconds::new(300).is_ok());

        let result = ServiceConfig::from_settings(ServiceSettings {
            version_date: Some(VERSION_DATE_2016_05_20.to_string()),
            timeout_seconds: Some(0),
            ..ServiceSettings::default()
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn settings_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"url": "http://localhost:9000/api", "version_date": "2016-05-20", "timeout_seconds": 12}}"#
        )
        .unwrap();

        let settings = ServiceSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.url.as_deref(), Some("http://localhost:9000/api"));
        assert_eq!(settings.timeout_seconds, Some(12));

        let config = ServiceConfig::from_settings(settings).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:9000/api");
        assert_eq!(config.timeout().seconds(), 12);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"version_date": "2015-12-02", "api_key": "file-key", "timeout_seconds": 12}}"#
        )
        .unwrap();

        let variables: config::Map<String, String> = [
            ("VISUAL_RECOGNITION_VERSION_DATE", VERSION_DATE_2016_05_20),
            ("VISUAL_RECOGNITION_API_KEY", "env-key"),
            ("OTHER_SERVICE_API_KEY", "ignored"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let settings = ServiceSettings::load_layers(
            File::from(file.path()),
            environment().source(Some(variables)),
        )
        .unwrap();

        assert_eq!(settings.version_date.as_deref(), Some(VERSION_DATE_2016_05_20));
        assert_eq!(settings.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.timeout_seconds, Some(12));
    }

    #[test]
    fn environment_alone_is_enough() {
        let variables: config::Map<String, String> = [
            ("VISUAL_RECOGNITION_VERSION_DATE", VERSION_DATE_2016_05_20),
            ("VISUAL_RECOGNITION_TIMEOUT_SECONDS", "45"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let settings = ServiceSettings::load_layers(
            File::new("does_not_exist", FileFormat::Json).required(false),
            environment().source(Some(variables)),
        )
        .unwrap();
        let config = ServiceConfig::from_settings(settings).unwrap();

        assert_eq!(config.version_date(), VERSION_DATE_2016_05_20);
        assert_eq!(config.timeout().seconds(), 45);
        assert!(config.api_key().is_none());
    }
}
