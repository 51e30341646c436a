// Rust guideline compliant 2026-02-06

//! Configuration management for the reporter.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options recognized by the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterOptions {
    /// Minimum milliseconds between progress lines (0 = emit every event).
    #[serde(default)]
    pub interval_ms: u64,

    /// Whether to show individual rows and results instead of counts only.
    #[serde(default)]
    pub verbose: bool,

    /// Job name used when the pipeline does not supply one.
    #[serde(default = "default_job_name")]
    pub default_job_name: String,
}

/// Default job name.
fn default_job_name() -> String {
    "Unnamed job".to_string()
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            interval_ms: 0,
            verbose: false,
            default_job_name: default_job_name(),
        }
    }
}

impl ReporterOptions {
    /// Returns options with the given progress interval.
    #[must_use]
    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Returns options with verbose rendering toggled.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether progress lines are throttled.
    pub fn is_throttled(&self) -> bool {
        self.interval_ms > 0
    }

    /// Loads options from a TOML file and environment variables.
    ///
    /// Options are resolved in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. The TOML file at `path`, if it exists
    /// 3. Environment variables with `PIPEWATCH_` prefix
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The resolved options.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - An environment override cannot be parsed
    /// - The resolved values fail validation
    pub fn load(path: &Path) -> Result<Self> {
        let mut options = Self::default();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            options = toml::from_str(&content)
                .map_err(|e| Error::InvalidConfig(format!("Invalid config file: {}", e)))?;
        }

        options.apply_env_overrides()?;
        options.validate()?;

        Ok(options)
    }

    /// Applies environment variable overrides.
    ///
    /// Supported environment variables:
    /// - `PIPEWATCH_INTERVAL_MS` - Progress interval in milliseconds
    /// - `PIPEWATCH_VERBOSE` - Verbose rendering (true/false)
    /// - `PIPEWATCH_DEFAULT_JOB_NAME` - Fallback job name
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value is invalid.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("PIPEWATCH_INTERVAL_MS") {
            self.interval_ms = val.parse().map_err(|_| {
                Error::InvalidConfig(
                    "PIPEWATCH_INTERVAL_MS must be a non-negative number".to_string(),
                )
            })?;
        }

        if let Ok(val) = std::env::var("PIPEWATCH_VERBOSE") {
            self.verbose = val.parse().map_err(|_| {
                Error::InvalidConfig("PIPEWATCH_VERBOSE must be true or false".to_string())
            })?;
        }

        if let Ok(val) = std::env::var("PIPEWATCH_DEFAULT_JOB_NAME") {
            self.default_job_name = val;
        }

        Ok(())
    }

    /// Validates the option values.
    ///
    /// # Errors
    ///
    /// Returns an error if `default_job_name` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.default_job_name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "default_job_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Serializes the options to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("Failed to serialize config: {}", e)))
    }

    /// Saves the options to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Serialization fails
    /// - The file cannot be created or written
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
