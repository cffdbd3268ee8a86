//! Configuration module.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Monitor settings (cycle period, probe timeout)
//! - Endpoint records (name, url, method, headers, body)

mod app;
mod validation;

pub use app::{AppConfig, EndpointConfig, MonitorConfig};
pub use validation::{ConfigError, expand_env_vars};
