//! Endpoint specification and domain key derivation.
//!
//! An [`EndpointSpec`] is the validated, immutable form of a configured
//! endpoint. Raw config records go through [`build_specs`], which applies the
//! load-time defaulting and rejection rules: missing names default to
//! `"unknown"` with a warning, while endpoints whose URL cannot be parsed (or
//! carries no host) are permanently excluded with a logged error. Exclusion is
//! never fatal to the process.

use std::collections::BTreeMap;

use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::{EndpointConfig, expand_env_vars};

/// Name substituted when an endpoint record omits one.
pub const DEFAULT_NAME: &str = "unknown";

/// Verbs accepted in endpoint records. `Method` parses any RFC 9110 token,
/// extension verbs included, so a typo like `"GETT"` would otherwise be sent
/// on the wire instead of rejected at load time.
const STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
    Method::TRACE,
    Method::CONNECT,
];

/// Reasons an endpoint record is rejected at load time.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// Record has no `url` field.
    #[error("missing url")]
    MissingUrl,

    /// URL failed to parse into scheme/host/port/path.
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// URL parsed but has no host component to derive a domain key from.
    #[error("url '{0}' has no host")]
    MissingHost(String),

    /// HTTP verb is not recognized.
    #[error("invalid method '{0}'")]
    InvalidMethod(String),
}

/// Validated description of one endpoint to probe.
///
/// Built once at startup and read-only afterwards; cloned into each probe
/// task, so it needs no synchronization.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    /// Free-text identifier from config (or [`DEFAULT_NAME`]).
    pub name: String,
    /// Absolute request URL.
    pub url: Url,
    /// HTTP verb (default GET).
    pub method: Method,
    /// Request headers; values have had `${VAR}` expansion applied.
    pub headers: BTreeMap<String, String>,
    /// Optional JSON request payload.
    pub body: Option<serde_json::Value>,
    /// Aggregation key: URL host with any port stripped.
    pub domain: String,
}

impl EndpointSpec {
    /// Build a spec from a raw config record.
    ///
    /// # Errors
    /// Returns [`EndpointError`] if the URL is missing, unparseable, or
    /// host-less, or the method verb is unrecognized. Missing name and method
    /// are recovered with defaults, not errors.
    pub fn from_config(config: &EndpointConfig) -> Result<Self, EndpointError> {
        let name = match config.name.as_deref() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                tracing::warn!(
                    url = config.url.as_deref().unwrap_or(""),
                    default = DEFAULT_NAME,
                    "Endpoint missing name, using default"
                );
                DEFAULT_NAME.to_string()
            }
        };

        let raw_url = config.url.as_deref().ok_or(EndpointError::MissingUrl)?;
        let url = Url::parse(raw_url).map_err(|source| EndpointError::InvalidUrl {
            url: raw_url.to_string(),
            source,
        })?;

        // Url::host_str() returns the host without the port, which is exactly
        // the domain key contract: differing ports and paths on the same host
        // fold into one domain.
        let domain = url
            .host_str()
            .ok_or_else(|| EndpointError::MissingHost(raw_url.to_string()))?
            .to_ascii_lowercase();

        let method = match config.method.as_deref() {
            None => Method::GET,
            Some(verb) => {
                let method = verb
                    .to_ascii_uppercase()
                    .parse::<Method>()
                    .map_err(|_| EndpointError::InvalidMethod(verb.to_string()))?;
                if !STANDARD_METHODS.contains(&method) {
                    return Err(EndpointError::InvalidMethod(verb.to_string()));
                }
                method
            }
        };

        let headers = config
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), expand_env_vars(v)))
            .collect();

        Ok(Self {
            name,
            url,
            method,
            headers,
            body: config.body.clone(),
            domain,
        })
    }
}

/// Build specs for all configured endpoints, excluding invalid records.
///
/// Each rejected record is logged once here, at load time, and contributes to
/// no domain's counters. Order of valid specs follows config order.
pub fn build_specs(configs: &[EndpointConfig]) -> Vec<EndpointSpec> {
    let mut specs = Vec::with_capacity(configs.len());

    for config in configs {
        match EndpointSpec::from_config(config) {
            Ok(spec) => specs.push(spec),
            Err(e) => {
                tracing::error!(
                    endpoint_name = config.name.as_deref().unwrap_or(DEFAULT_NAME),
                    error = %e,
                    "Excluding endpoint with invalid configuration"
                );
            }
        }
    }

    specs
}
