//! Logging configuration.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::result::AppResult;

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`,
    /// or any `tracing` filter directive.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl LoggingConfig {
    /// Installs the global `tracing` subscriber for this configuration.
    ///
    /// Fails if a global subscriber is already installed.
    pub fn init(&self) -> AppResult<()> {
        let filter =
            EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new(default_level()));

        let result = if self.format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init()
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).try_init()
        };

        result.map_err(|e| AppError::configuration(format!("Failed to install subscriber: {e}")))?;

        tracing::debug!(level = %self.level, format = %self.format, "Logging initialized");
        Ok(())
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
