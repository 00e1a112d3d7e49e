//! Configuration loading and validation for the `export-seal` binary.
//!
//! Values are read from `EXPORT_SEAL_*` environment variables at startup;
//! command-line flags override them.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated tool configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tag inserted into default output file names.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: `"text"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Largest input document accepted, in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

fn default_tag() -> String {
    "reipur".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}
fn default_max_input_bytes() -> u64 {
    64 * 1024 * 1024
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("EXPORT_SEAL"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if self.tag.trim().is_empty() {
            anyhow::bail!("EXPORT_SEAL_TAG must not be empty");
        }
        if self.tag.contains(['/', '\\']) {
            anyhow::bail!("EXPORT_SEAL_TAG must not contain path separators");
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            anyhow::bail!("EXPORT_SEAL_LOG_FORMAT must be `text` or `json`");
        }
        if self.max_input_bytes == 0 {
            anyhow::bail!("EXPORT_SEAL_MAX_INPUT_BYTES must be > 0");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_input_bytes: default_max_input_bytes(),
        }
    }
}
