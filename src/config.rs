//! Configuration management for `MeetPoint`
//!
//! Handles loading configuration from files and environment variables and
//! validates every setting before it is used.

use crate::MeetPointError;
use crate::api::ClientCredentials;
use crate::planner::CandidatePolicy;
use crate::ranking::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CLIENT_ID_ENV: &str = "AMADEUS_CLIENT_ID";
const CLIENT_SECRET_ENV: &str = "AMADEUS_CLIENT_SECRET";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetPointConfig {
    /// Flight data service settings
    #[serde(default)]
    pub amadeus: AmadeusConfig,
    /// Candidate search settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Amadeus API settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    /// OAuth client id
    pub client_id: Option<String>,
    /// OAuth client secret
    pub client_secret: Option<String>,
    /// Base URL of the API (test or production environment)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Country airport keyword searches are restricted to
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Currency prices are quoted in
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
}

impl std::fmt::Debug for AmadeusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("country_code", &self.country_code)
            .field("currency_code", &self.currency_code)
            .finish()
    }
}

/// Candidate search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of ranked destinations to report
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// `[latitude, longitude]` degree offsets probed around the midpoint
    #[serde(default = "default_offsets")]
    pub offsets: Vec<[f64; 2]>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_country_code() -> String {
    "US".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_offsets() -> Vec<[f64; 2]> {
    vec![[0.0, 0.0], [5.0, 5.0], [-5.0, -5.0]]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            country_code: default_country_code(),
            currency_code: default_currency_code(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            offsets: default_offsets(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AmadeusConfig {
    /// Client credentials, falling back to `AMADEUS_CLIENT_ID` and
    /// `AMADEUS_CLIENT_SECRET` from the environment
    pub fn credentials(&self) -> crate::Result<ClientCredentials> {
        let client_id = self
            .client_id
            .clone()
            .or_else(|| std::env::var(CLIENT_ID_ENV).ok())
            .filter(|id| !id.is_empty());
        let client_secret = self
            .client_secret
            .clone()
            .or_else(|| std::env::var(CLIENT_SECRET_ENV).ok())
            .filter(|secret| !secret.is_empty());

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Ok(ClientCredentials::new(id, secret)),
            _ => Err(MeetPointError::config(format!(
                "Amadeus client id and secret are required. Set amadeus.client_id/client_secret or {CLIENT_ID_ENV}/{CLIENT_SECRET_ENV}."
            ))),
        }
    }
}

impl SearchConfig {
    /// Candidate policy built from the configured offsets
    #[must_use]
    pub fn candidate_policy(&self) -> CandidatePolicy {
        CandidatePolicy::new(self.offsets.iter().map(|&[lat, lon]| (lat, lon)).collect())
    }
}

impl MeetPointConfig {
    /// Load configuration from `config_path`, or the default location when
    /// `None`, then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides such as MEETPOINT_AMADEUS__CLIENT_ID
        builder = builder.add_source(
            Environment::with_prefix("MEETPOINT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: MeetPointConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("meetpoint").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.amadeus.base_url.is_empty() {
            self.amadeus.base_url = default_base_url();
        }
        if self.amadeus.timeout_seconds == 0 {
            self.amadeus.timeout_seconds = default_timeout();
        }
        if self.amadeus.country_code.is_empty() {
            self.amadeus.country_code = default_country_code();
        }
        if self.amadeus.currency_code.is_empty() {
            self.amadeus.currency_code = default_currency_code();
        }
        if self.search.top_n == 0 {
            self.search.top_n = default_top_n();
        }
        if self.search.offsets.is_empty() {
            self.search.offsets = default_offsets();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.amadeus.timeout_seconds > 300 {
            return Err(
                MeetPointError::config("Amadeus API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.search.top_n == 0 || self.search.top_n > 20 {
            return Err(
                MeetPointError::config("Number of ranked destinations must be between 1 and 20")
                    .into(),
            );
        }

        for [lat, lon] in &self.search.offsets {
            if !(-90.0..=90.0).contains(lat) || !(-180.0..=180.0).contains(lon) {
                return Err(MeetPointError::config(format!(
                    "Candidate offset [{lat}, {lon}] is out of range"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(MeetPointError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(MeetPointError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.amadeus.base_url.starts_with("http://")
            && !self.amadeus.base_url.starts_with("https://")
        {
            return Err(MeetPointError::config(
                "Amadeus base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        for (name, code, len) in [
            ("country", &self.amadeus.country_code, 2),
            ("currency", &self.amadeus.currency_code, 3),
        ] {
            if code.len() != len || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(MeetPointError::config(format!(
                    "Invalid {name} code '{code}'"
                ))
                .into());
            }
        }

        Ok(())
    }
}
