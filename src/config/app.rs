//! Application configuration structures.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::DEFAULT_PROBE_TIMEOUT;
use crate::scheduler::DEFAULT_PERIOD;

use super::validation::ConfigError;

fn default_period() -> Duration {
    DEFAULT_PERIOD
}

fn default_probe_timeout() -> Duration {
    DEFAULT_PROBE_TIMEOUT
}

/// Check-cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Fixed cycle period (default: 15s).
    #[serde(default = "default_period", with = "humantime_serde")]
    pub period: Duration,

    /// Per-probe timeout (default: 500ms).
    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

/// One raw endpoint record as written in YAML.
///
/// Every field except `url` is recoverable when absent; the defaulting and
/// rejection rules live in [`crate::endpoint`], not here, so a malformed
/// record never fails the whole load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Free-text identifier (default: "unknown", with a warning).
    #[serde(default)]
    pub name: Option<String>,

    /// Absolute URL to probe. A missing or unparseable URL excludes the
    /// endpoint at load time.
    #[serde(default)]
    pub url: Option<String>,

    /// HTTP verb (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Request headers. Values support `${VAR}` env expansion.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Optional JSON request payload.
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Check-cycle settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Endpoints to probe each cycle.
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate process-level settings.
    ///
    /// Per-endpoint problems are deliberately not validated here; they are
    /// recovered or rejected record-by-record when specs are built.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.period.is_zero() {
            return Err(ConfigError::Validation(
                "monitor period must be non-zero".to_string(),
            ));
        }

        if self.monitor.probe_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "monitor probe_timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
