// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harness configuration.
//!
//! Configuration is layered with the `config` crate, lowest precedence first:
//!
//! 1. Built-in defaults ([`HarnessConfig::default`]), with the legacy
//!    `SERVER_URL` environment variable replacing the default URL
//! 2. An optional config file (TOML, YAML or JSON, picked by extension)
//! 3. `LATENCY_PROBE_*` environment variables, e.g. `LATENCY_PROBE_RUN_DURATION_SECS`
//!
//! Command-line overrides are applied on top by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use latency_probe_core::HarnessConfig;
//!
//! let config = HarnessConfig::load(None)?;
//! println!("probing {} every {:?}", config.server_url, config.pass_interval());
//! # Ok::<(), latency_probe_core::ConfigurationError>(())
//! ```

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "LATENCY_PROBE";

/// Unprefixed variable honoured for the target URL.
pub const LEGACY_SERVER_URL_VAR: &str = "SERVER_URL";

/// Default JSON-RPC endpoint.
pub const DEFAULT_SERVER_URL: &str = "https://api.moecki.online/";

/// Errors that can occur while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was read but is not usable
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Everything the harness needs to know for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// JSON-RPC endpoint every probe is POSTed to.
    pub server_url: String,
    /// Path of the call plan file.
    pub requests_file: PathBuf,
    /// Directory receiving `results.csv`, `statistics.csv` and `summary.md`.
    pub output_dir: PathBuf,
    /// Wall-clock budget for the whole run.
    pub run_duration_secs: u64,
    /// Pause after each completed pass.
    pub pass_interval_secs: u64,
    /// Pause after each individual call.
    pub call_delay_ms: u64,
    /// Per-request timeout; `0` waits forever.
    pub request_timeout_secs: u64,
    /// Optional cap on the number of passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_passes: Option<u32>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            requests_file: PathBuf::from("requests.json"),
            output_dir: PathBuf::from("output"),
            run_duration_secs: 24 * 60 * 60,
            pass_interval_secs: 60 * 60,
            call_delay_ms: 5_000,
            request_timeout_secs: 30,
            max_passes: None,
        }
    }
}

impl HarnessConfig {
    /// Load from defaults, an optional file and the process environment.
    ///
    /// Variables whose name or value is not valid Unicode are ignored.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::load_with_env(file, unicode_vars(std::env::vars_os()))
    }

    /// Load using an explicit set of environment variables.
    ///
    /// Values are not validated here; callers that start a run call
    /// [`HarnessConfig::validate`].
    pub fn load_with_env(file: Option<&Path>, env: config::Map<String, String>) -> Result<Self> {
        let mut defaults = Self::default();
        if let Some(url) = env.get(LEGACY_SERVER_URL_VAR) {
            defaults.server_url = url.clone();
        }

        let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Check values that deserialize fine but cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        let url = self.server_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigurationError::Invalid {
                key: "server_url",
                reason: format!("expected an http(s) URL, got {:?}", self.server_url),
            });
        }

        if self.run_duration_secs == 0 {
            return Err(ConfigurationError::Invalid {
                key: "run_duration_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.max_passes == Some(0) {
            return Err(ConfigurationError::Invalid {
                key: "max_passes",
                reason: "must be greater than zero when set".to_string(),
            });
        }

        Ok(())
    }

    /// Total run budget.
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_duration_secs)
    }

    /// Delay between passes.
    pub fn pass_interval(&self) -> Duration {
        Duration::from_secs(self.pass_interval_secs)
    }

    /// Delay between calls within a pass.
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }

    /// Request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

/// Keep the variables whose name and value are both valid Unicode.
fn unicode_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> config::Map<String, String> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
