//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::poll::PollSchedule;

/// Default interval between instance listing attempts.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default overall budget for finding a job's instance.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 60;

/// Default log level when neither configuration nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Google Cloud configuration derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "GOOGLE")]
pub struct GoogleConfig {
    /// Project that owns the Dataflow job and its worker instances.
    pub project: String,
    /// OAuth access token, typically from `gcloud auth print-access-token`.
    pub access_token: String,
    /// Zone in which worker instances are listed. Defaults to
    /// `us-central1-b`.
    #[ortho_config(default = "us-central1-b".to_owned())]
    pub zone: String,
    /// Base URL of the Compute Engine v1 API.
    #[ortho_config(default = "https://compute.googleapis.com/compute/v1".to_owned())]
    pub compute_endpoint: String,
    /// Seconds between listing attempts.
    pub poll_interval_secs: Option<u64>,
    /// Seconds to wait for the instance before giving up.
    pub lookup_timeout_secs: Option<u64>,
    /// Tracing level (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl GoogleConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to [google] in flexcheck.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("flexcheck")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty and
    /// [`ConfigError::Invalid`] when the poll interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.project,
            &FieldMetadata::new("Google Cloud project", "GOOGLE_PROJECT", "project"),
        )?;
        Self::require_field(
            &self.access_token,
            &FieldMetadata::new("OAuth access token", "GOOGLE_ACCESS_TOKEN", "access_token"),
        )?;
        Self::require_field(
            &self.zone,
            &FieldMetadata::new("compute zone", "GOOGLE_ZONE", "zone"),
        )?;
        Self::require_field(
            &self.compute_endpoint,
            &FieldMetadata::new(
                "Compute API endpoint",
                "GOOGLE_COMPUTE_ENDPOINT",
                "compute_endpoint",
            ),
        )?;
        if self.poll_interval_secs == Some(0) {
            return Err(ConfigError::Invalid(String::from(
                "poll_interval_secs must be greater than zero",
            )));
        }
        Ok(())
    }

    /// Returns the poll schedule used for instance lookups.
    #[must_use]
    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule::new(
            Duration::from_secs(
                self.poll_interval_secs
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            Duration::from_secs(
                self.lookup_timeout_secs
                    .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS),
            ),
        )
    }

    /// Returns the configured log level or the default.
    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
